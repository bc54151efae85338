// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::snapshot::Snapshot;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Placeholder reported for blocks without a name
pub const UNNAMED_BLOCK: &str = "no-name";

/// The two kinds of tracked debug metadata
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MetadataKind {
    Subprogram,
    Location,
}

impl Display for MetadataKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(match self {
            Self::Subprogram => "DISubprogram",
            Self::Location => "DILocation",
        })
    }
}

/// How a piece of metadata went missing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    /// The entity did not exist before the step and has no metadata after it
    #[serde(rename = "not-generate")]
    NotGenerated,
    /// The entity had metadata before the step and lost it
    #[serde(rename = "drop")]
    Dropped,
}

impl Action {
    /// Classifies an entity lacking metadata after a step by its state before
    ///
    /// `before` is `None` for entities that were not collected.
    pub fn classify(before: Option<bool>) -> Option<Self> {
        match before {
            None => Some(Self::NotGenerated),
            Some(true) => Some(Self::Dropped),
            Some(false) => None,
        }
    }

    /// Name used in export records and summaries
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotGenerated => "not-generate",
            Self::Dropped => "drop",
        }
    }

    fn verb(self) -> &'static str {
        match self {
            Self::NotGenerated => "did not generate",
            Self::Dropped => "dropped",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// One piece of debug metadata missing after a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "metadata")]
pub enum BugRecord {
    #[serde(rename = "DISubprogram")]
    Subprogram { name: String, action: Action },
    #[serde(rename = "DILocation")]
    Location {
        #[serde(rename = "fn-name")]
        function: String,
        #[serde(rename = "bb-name")]
        block: String,
        #[serde(rename = "instr")]
        opcode: String,
        action: Action,
    },
}

impl BugRecord {
    pub fn kind(&self) -> MetadataKind {
        match self {
            Self::Subprogram { .. } => MetadataKind::Subprogram,
            Self::Location { .. } => MetadataKind::Location,
        }
    }

    pub fn action(&self) -> Action {
        match self {
            Self::Subprogram { action, .. } | Self::Location { action, .. } => *action,
        }
    }

    /// Human readable diagnostic line for a bug found after `step`
    pub fn describe(&self, step: &str, file: &str) -> String {
        match self {
            Self::Subprogram { name, action } => format!(
                "  ***ERROR: {step} {} {} for the {name} from file: {file}",
                action.verb(),
                self.kind()
            ),
            Self::Location {
                function,
                block,
                opcode,
                action,
            } => format!(
                "  ***ERROR: {step} {} {} for the {opcode} in {function} (BB name: {block}) from file: {file}",
                action.verb(),
                self.kind()
            ),
        }
    }
}

/// Diffs the after-step snapshot against the before-step one
///
/// Only entities present after the step are inspected, and only those lacking
/// metadata can produce a bug. Subprogram bugs come first.
pub fn compare(before: &Snapshot, after: &Snapshot) -> Vec<BugRecord> {
    let mut bugs = compare_functions(before, after);
    bugs.extend(compare_locations(before, after));
    bugs
}

fn compare_functions(before: &Snapshot, after: &Snapshot) -> Vec<BugRecord> {
    after
        .functions()
        .filter(|(_, sp)| sp.is_none())
        .filter_map(|(name, _)| {
            let had = before.subprogram(name).map(|sp| sp.is_some());

            Action::classify(had).map(|action| BugRecord::Subprogram {
                name: name.to_string(),
                action,
            })
        })
        .collect()
}

fn compare_locations(before: &Snapshot, after: &Snapshot) -> Vec<BugRecord> {
    after
        .locations()
        .filter(|(_, entry)| !entry.has_location)
        .filter_map(|(id, entry)| {
            Action::classify(before.has_location(id)).map(|action| BugRecord::Location {
                function: entry.site.function.clone(),
                block: entry
                    .site
                    .block
                    .clone()
                    .unwrap_or_else(|| UNNAMED_BLOCK.to_string()),
                opcode: entry.site.opcode.clone(),
                action,
            })
        })
        .collect()
}
