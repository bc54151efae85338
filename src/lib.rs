// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Checks that a compiler pipeline step does not drop debug info metadata.
//!
//! A [`DebugInfoChecker`] takes a snapshot of which functions carry a
//! subprogram record and which operations carry a source location before a
//! step runs, then diffs it against a fresh snapshot taken after the step.

#![warn(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions
)]
#![cfg_attr(docsrs, feature(doc_auto_cfg, doc_cfg))]

#[macro_use]
extern crate log;

pub mod check;
pub mod config;
pub mod ir;
pub mod pipeline;
pub mod summary;

mod error;

pub use check::{
    compare, Action, BugRecord, Checkpoint, DebugInfoChecker, Diagnostics, MetadataKind, Outcome,
    Snapshot, SnapshotRegistry,
};
pub use config::CheckerConfig;
pub use error::{DiError, DiResult};


#[cfg(test)]
pub(crate) use test_stdio::TestStdio;
