// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// Environment variable naming the JSON export file
pub const EXPORT_ENV: &str = "DI_CHECKER_EXPORT";

/// Options recognised by [`crate::DebugInfoChecker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckerConfig {
    /// Append per-step bug records to this file instead of printing them
    pub export_path: Option<PathBuf>,
    /// Prefix of skip diagnostics and debug logs
    pub banner: String,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            export_path: None,
            banner: "CheckDIChecker: ".into(),
        }
    }
}

impl CheckerConfig {
    pub fn with_export(mut self, path: impl Into<PathBuf>) -> Self {
        self.export_path = non_empty(path.into());
        self
    }

    pub fn with_banner(mut self, banner: impl Into<String>) -> Self {
        self.banner = banner.into();
        self
    }

    /// Reads the export path from [`EXPORT_ENV`]
    ///
    /// An unset or empty variable disables exporting.
    pub fn from_env() -> Self {
        Self::from_export_var(std::env::var_os(EXPORT_ENV))
    }

    fn from_export_var(var: Option<OsString>) -> Self {
        Self {
            export_path: var.map(PathBuf::from).and_then(non_empty),
            ..Self::default()
        }
    }

    pub fn export_path(&self) -> Option<&Path> {
        self.export_path.as_deref()
    }
}

fn non_empty(path: PathBuf) -> Option<PathBuf> {
    (!path.as_os_str().is_empty()).then_some(path)
}
