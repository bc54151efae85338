// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised outside the collect/check core
///
/// Collecting and checking never fail; a missing export file or a broken
/// diagnostic stream only degrades reporting.
#[derive(Debug, Error)]
pub enum DiError {
    #[error("Unexpected I/O error, caused by: {0}")]
    Io(#[from] std::io::Error),
    #[error("Line {line} is not a valid di-checker record: {source}")]
    InvalidRecord {
        line: usize,
        source: serde_json::Error,
    },
    #[error("Output file `{}` must have the `.html` extension", .0.display())]
    NotHtml(PathBuf),
    #[error("No fresh id is left in the unit")]
    IdsExhausted,
}

/// Convenience type to work with [`DiError`]
pub type DiResult<T = ()> = Result<T, DiError>;
