// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::ir::{Function, OpId, SubprogramRef};
use std::collections::{btree_map::Entry, BTreeMap};

/// Where an operation lived when it was collected
///
/// Only used to describe location bugs, never compared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpSite {
    pub function: String,
    pub block: Option<String>,
    pub opcode: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEntry {
    pub has_location: bool,
    pub site: OpSite,
}

/// Debug metadata attachment of a unit at one point of a pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    functions: BTreeMap<String, Option<SubprogramRef>>,
    locations: BTreeMap<OpId, LocationEntry>,
}

impl Snapshot {
    /// Walks the eligible functions and fills a fresh snapshot
    pub fn collect<'a>(functions: impl IntoIterator<Item = &'a Function>) -> Self {
        let mut snapshot = Self::default();
        snapshot.fill(functions);
        snapshot
    }

    pub(crate) fn fill<'a>(&mut self, functions: impl IntoIterator<Item = &'a Function>) {
        for func in functions {
            if !func.is_eligible() {
                trace!("  Skipping function: {}", func.name);
                continue;
            }

            match func.subprogram {
                Some(sp) => trace!("  Collecting subprogram: {sp}"),
                None => trace!("  Collecting subprogram: none"),
            }

            if let Entry::Vacant(e) = self.functions.entry(func.name.clone()) {
                e.insert(func.subprogram);
            }

            for bb in &func.blocks {
                for op in bb.ops.iter().filter(|op| op.is_snapshotted()) {
                    trace!("  Collecting info for op: {op}");

                    self.locations.insert(
                        op.id,
                        LocationEntry {
                            has_location: op.location.is_some(),
                            site: OpSite {
                                function: func.name.clone(),
                                block: bb.name.clone(),
                                opcode: op.opcode.clone(),
                            },
                        },
                    );
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.functions.clear();
        self.locations.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.locations.is_empty()
    }

    /// `None` if `name` was not collected, otherwise its subprogram or lack thereof
    pub fn subprogram(&self, name: &str) -> Option<Option<SubprogramRef>> {
        self.functions.get(name).copied()
    }

    /// `None` if `id` was not collected
    pub fn has_location(&self, id: OpId) -> Option<bool> {
        self.locations.get(&id).map(|e| e.has_location)
    }

    pub fn functions(&self) -> impl Iterator<Item = (&str, Option<SubprogramRef>)> {
        self.functions.iter().map(|(name, sp)| (name.as_str(), *sp))
    }

    pub fn locations(&self) -> impl Iterator<Item = (OpId, &LocationEntry)> {
        self.locations.iter().map(|(id, e)| (*id, e))
    }
}

/// Before-step snapshots keyed by step name
///
/// Owned by the driver. [`crate::DebugInfoChecker::collect`] rewrites a slot,
/// [`crate::DebugInfoChecker::check`] only reads it.
#[derive(Debug, Clone, Default)]
pub struct SnapshotRegistry(BTreeMap<String, Snapshot>);

impl SnapshotRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, step: &str) -> Option<&Snapshot> {
        self.0.get(step)
    }

    /// Empties the slot of `step`, creating it if needed
    pub(crate) fn reset(&mut self, step: &str) -> &mut Snapshot {
        let slot = self.0.entry(step.to_string()).or_default();
        slot.clear();
        slot
    }

    pub fn steps(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
