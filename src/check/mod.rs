// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{
    config::CheckerConfig,
    ir::{CompilationUnit, Function},
};
use std::{
    fmt::{Debug, Display, Formatter, Result as FmtResult},
    io::{stderr, Write},
};

/// # Snapshots
/// Per-step record of debug metadata attachment
mod snapshot;

/// # Comparison
/// Classification of metadata missing after a step
mod compare;

/// # Reporting
/// Diagnostic lines and JSON export
mod report;

pub use compare::{compare, Action, BugRecord, MetadataKind, UNNAMED_BLOCK};
pub use snapshot::{LocationEntry, OpSite, Snapshot, SnapshotRegistry};

/// Stream receiving skip notices, bug lines and verdicts
///
/// Boxed for convenience. Writes to stderr by default.
pub struct Diagnostics {
    write: Box<dyn Write>,
}

impl Diagnostics {
    pub fn new(write: impl Write + 'static) -> Self {
        Self {
            write: Box::new(write),
        }
    }

    /// Writes one line, logging instead of failing if the stream is broken
    pub fn line(&mut self, msg: impl Display) {
        if let Err(e) = writeln!(self.write, "{msg}") {
            warn!("Unable to write diagnostic `{msg}`: {e}");
        }
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(stderr())
    }
}

impl Debug for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("<struct Diagnostics>")
    }
}

/// Result of checking one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The unit carries no debug info
    Skipped,
    /// The unit was checked, bugs may be empty
    Checked { bugs: Vec<BugRecord> },
}

impl Outcome {
    /// Only a checked step without bugs passes
    pub fn passed(&self) -> bool {
        matches!(self, Self::Checked { bugs } if bugs.is_empty())
    }

    pub fn bugs(&self) -> &[BugRecord] {
        match self {
            Self::Skipped => &[],
            Self::Checked { bugs } => bugs,
        }
    }
}

/// Before-step snapshot that can be verified exactly once
///
/// Obtained from [`DebugInfoChecker::checkpoint`], consumed by
/// [`DebugInfoChecker::verify`].
#[derive(Debug, Clone)]
#[must_use]
pub struct Checkpoint {
    step: String,
    before: Snapshot,
}

impl Checkpoint {
    pub fn step(&self) -> &str {
        &self.step
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.before
    }
}

/// Collects debug metadata before a step and checks it after
#[derive(Debug, Default)]
pub struct DebugInfoChecker {
    config: CheckerConfig,
    diag: Diagnostics,
}

impl DebugInfoChecker {
    pub fn new(config: CheckerConfig) -> Self {
        Self::with_diagnostics(config, Diagnostics::default())
    }

    pub fn with_diagnostics(config: CheckerConfig, diag: Diagnostics) -> Self {
        Self { config, diag }
    }

    pub fn config(&self) -> &CheckerConfig {
        &self.config
    }

    /// Records the metadata of `functions` as the before-state of `step`
    ///
    /// The registry slot of `step` is cleared first, even when `unit` carries
    /// no debug info, in which case `false` is returned.
    pub fn collect<'a>(
        &mut self,
        unit: &CompilationUnit,
        functions: impl IntoIterator<Item = &'a Function>,
        registry: &mut SnapshotRegistry,
        step: &str,
    ) -> bool {
        debug!("{}(before) {step}", self.config.banner);

        let slot = registry.reset(step);

        if !unit.has_debug_info() {
            self.skip(step);
            return false;
        }

        slot.fill(functions);
        true
    }

    /// Checks `functions` against the before-state of `step`
    ///
    /// Returns `true` if no metadata went missing. Returns `false` without
    /// touching anything if `unit` carries no debug info.
    pub fn check<'a>(
        &mut self,
        unit: &CompilationUnit,
        functions: impl IntoIterator<Item = &'a Function>,
        registry: &SnapshotRegistry,
        step: &str,
    ) -> bool {
        self.check_step(unit, functions, registry, step).passed()
    }

    /// Like [`Self::check`], returning the bugs found
    ///
    /// A step that was never collected is checked against an empty snapshot,
    /// so every missing piece of metadata is reported as not generated.
    pub fn check_step<'a>(
        &mut self,
        unit: &CompilationUnit,
        functions: impl IntoIterator<Item = &'a Function>,
        registry: &SnapshotRegistry,
        step: &str,
    ) -> Outcome {
        let Some(cu) = unit.debug_compile_unit() else {
            self.skip(step);
            return Outcome::Skipped;
        };

        let empty = Snapshot::default();
        let before = registry.get(step).unwrap_or_else(|| {
            warn!("No snapshot was collected before {step}, nothing will be reported as dropped");
            &empty
        });

        self.diff(&cu.file, functions, before, step)
    }

    /// Snapshots `functions` and hands back the token to verify after `step`
    ///
    /// Returns `None` if `unit` carries no debug info.
    pub fn checkpoint<'a>(
        &mut self,
        unit: &CompilationUnit,
        functions: impl IntoIterator<Item = &'a Function>,
        step: &str,
    ) -> Option<Checkpoint> {
        debug!("{}(before) {step}", self.config.banner);

        if !unit.has_debug_info() {
            self.skip(step);
            return None;
        }

        Some(Checkpoint {
            step: step.to_string(),
            before: Snapshot::collect(functions),
        })
    }

    pub fn verify<'a>(
        &mut self,
        unit: &CompilationUnit,
        functions: impl IntoIterator<Item = &'a Function>,
        checkpoint: Checkpoint,
    ) -> Outcome {
        let Some(cu) = unit.debug_compile_unit() else {
            self.skip(&checkpoint.step);
            return Outcome::Skipped;
        };

        self.diff(&cu.file, functions, &checkpoint.before, &checkpoint.step)
    }

    /// Compares `functions` against `before` and reports the bugs of `file`
    fn diff<'a>(
        &mut self,
        file: &str,
        functions: impl IntoIterator<Item = &'a Function>,
        before: &Snapshot,
        step: &str,
    ) -> Outcome {
        debug!("{}(after) {step}", self.config.banner);

        let after = Snapshot::collect(functions);
        let outcome = Outcome::Checked {
            bugs: compare(before, &after),
        };

        report::emit(&mut self.diag, self.config.export_path(), file, step, &outcome);

        outcome
    }

    fn skip(&mut self, step: &str) {
        info!("{step}: unit has no debug info");
        self.diag.line(format_args!(
            "{}(pass: {step}): Skipping module without debug info",
            self.config.banner
        ));
    }
}
