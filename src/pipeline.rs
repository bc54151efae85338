// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Pipelines
//! Runs transformation steps with the checker wrapped around each one

use crate::{
    check::{DebugInfoChecker, Outcome, SnapshotRegistry},
    ir::CompilationUnit,
};
use std::fmt::{Debug, Formatter, Result as FmtResult};

/// A transformation applied to a whole unit
pub type StepFn<'a> = Box<dyn FnMut(&mut CompilationUnit) + 'a>;

/// Verdict of one wrapped step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepVerdict {
    pub step: String,
    pub outcome: Outcome,
}

/// Ordered list of named steps
///
/// Every step is preceded by a collect and followed by a check of all the
/// functions of the unit. Steps run one at a time.
#[derive(Default)]
pub struct Pipeline<'a> {
    steps: Vec<(String, StepFn<'a>)>,
    registry: SnapshotRegistry,
}

impl<'a> Pipeline<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn step(
        mut self,
        name: impl Into<String>,
        f: impl FnMut(&mut CompilationUnit) + 'a,
    ) -> Self {
        self.steps.push((name.into(), Box::new(f)));
        self
    }

    pub fn registry(&self) -> &SnapshotRegistry {
        &self.registry
    }

    pub fn run(
        &mut self,
        unit: &mut CompilationUnit,
        checker: &mut DebugInfoChecker,
    ) -> Vec<StepVerdict> {
        let mut verdicts = Vec::with_capacity(self.steps.len());

        for (name, step) in &mut self.steps {
            checker.collect(unit, unit.functions(), &mut self.registry, name);

            trace!("Running step {name}");
            step(&mut *unit);

            let outcome = checker.check_step(unit, unit.functions(), &self.registry, name);

            verdicts.push(StepVerdict {
                step: name.clone(),
                outcome,
            });
        }

        info!(
            "{} of {} step(s) passed",
            verdicts.iter().filter(|v| v.outcome.passed()).count(),
            verdicts.len()
        );

        verdicts
    }
}

impl Debug for Pipeline<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Pipeline")
            .field(
                "steps",
                &self.steps.iter().map(|(name, _)| name).collect::<Vec<_>>(),
            )
            .field("registry", &self.registry)
            .finish()
    }
}
