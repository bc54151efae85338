// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! # Summaries
//! HTML report over a JSON export file
//!
//! The export file holds one JSON object per checked step that had bugs. The
//! summary groups bugs by source file and step, and counts them per step.

use crate::{
    check::{Action, BugRecord},
    error::{DiError, DiResult},
};
use serde::Deserialize;
use serde_json::Value;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

#[derive(Deserialize)]
struct RawRecord {
    file: String,
    pass: String,
    bugs: Vec<Value>,
}

/// Bugs of one kind, by file then step
pub type BugTable<T> = BTreeMap<String, BTreeMap<String, Vec<T>>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationBug {
    pub function: String,
    pub block: String,
    pub opcode: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubprogramBug {
    pub function: String,
    pub action: Action,
}

/// All bugs found in an export file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub locations: BugTable<LocationBug>,
    pub subprograms: BugTable<SubprogramBug>,
}

impl Summary {
    pub fn from_file(path: impl AsRef<Path>) -> DiResult<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Reads an export file, one record per line
    ///
    /// Blank lines are ignored. A `bugs` array wrapped in another array is
    /// unwrapped.
    pub fn from_reader(read: impl BufRead) -> DiResult<Self> {
        let mut summary = Self::default();

        for (idx, line) in read.lines().enumerate() {
            let line = line?;

            if line.trim().is_empty() {
                continue;
            }

            let invalid = |source: serde_json::Error| DiError::InvalidRecord {
                line: idx + 1,
                source,
            };

            let RawRecord { file, pass, bugs } = serde_json::from_str(&line).map_err(invalid)?;

            let bugs = match <[Value; 1]>::try_from(bugs) {
                Ok([Value::Array(inner)]) => inner,
                Ok([single]) => vec![single],
                Err(bugs) => bugs,
            };

            for bug in bugs {
                summary.insert(&file, &pass, serde_json::from_value(bug).map_err(invalid)?);
            }
        }

        debug!(
            "Read {} location bug(s) and {} subprogram bug(s)",
            count(&summary.locations),
            count(&summary.subprograms)
        );

        Ok(summary)
    }

    pub fn insert(&mut self, file: &str, step: &str, bug: BugRecord) {
        match bug {
            BugRecord::Location {
                function,
                block,
                opcode,
                action,
            } => slot(&mut self.locations, file, step).push(LocationBug {
                function,
                block,
                opcode,
                action,
            }),
            BugRecord::Subprogram { name, action } => {
                slot(&mut self.subprograms, file, step).push(SubprogramBug {
                    function: name,
                    action,
                });
            }
        }
    }

    /// Number of location bugs per step, over all files
    pub fn location_counts(&self) -> BTreeMap<&str, usize> {
        per_step(&self.locations)
    }

    /// Number of subprogram bugs per step, over all files
    pub fn subprogram_counts(&self) -> BTreeMap<&str, usize> {
        per_step(&self.subprograms)
    }

    pub fn is_empty(&self) -> bool {
        count(&self.locations) == 0 && count(&self.subprograms) == 0
    }

    pub fn render_html(&self, w: &mut impl Write) -> std::io::Result<()> {
        writeln!(w, "<html>")?;
        writeln!(w, "<head>")?;
        writeln!(w, "<style>")?;
        writeln!(w, "table, th, td {{")?;
        writeln!(w, "  border: 1px solid black;")?;
        writeln!(w, "}}")?;
        writeln!(w, "table.center {{")?;
        writeln!(w, "  margin-left: auto;")?;
        writeln!(w, "  margin-right: auto;")?;
        writeln!(w, "}}")?;
        writeln!(w, "</style>")?;
        writeln!(w, "</head>")?;
        writeln!(w, "<body>")?;

        let loc_rows = rows(&self.locations, |bug: &LocationBug| {
            vec![
                bug.opcode.clone(),
                bug.function.clone(),
                bug.block.clone(),
                bug.action.to_string(),
            ]
        });
        table(
            w,
            "Location Bugs found by the DI Checker",
            &["File", "Pass Name", "Instruction", "Function Name", "Basic Block Name", "Action"],
            &loc_rows,
        )?;
        writeln!(w, "<br>")?;
        table(
            w,
            "Summary of Location Bugs",
            &["Pass Name", "Number of bugs"],
            &count_rows(&self.location_counts()),
        )?;
        writeln!(w, "<br>")?;
        writeln!(w, "<br>")?;

        let sp_rows = rows(&self.subprograms, |bug: &SubprogramBug| {
            vec![bug.function.clone(), bug.action.to_string()]
        });
        table(
            w,
            "Subprogram Bugs found by the DI Checker",
            &["File", "Pass Name", "Function Name", "Action"],
            &sp_rows,
        )?;
        writeln!(w, "<br>")?;
        table(
            w,
            "Summary of Subprogram Bugs",
            &["Pass Name", "Number of bugs"],
            &count_rows(&self.subprogram_counts()),
        )?;

        writeln!(w, "</body>")?;
        writeln!(w, "</html>")
    }

    pub fn write_html_file(&self, path: impl AsRef<Path>) -> DiResult {
        let path = path.as_ref();

        if path.extension().map_or(true, |ext| ext != "html") {
            return Err(DiError::NotHtml(path.to_path_buf()));
        }

        let mut out = BufWriter::new(File::create(path)?);
        self.render_html(&mut out)?;
        out.flush()?;

        info!("{} generated", path.display());
        Ok(())
    }
}

fn slot<'a, T>(table: &'a mut BugTable<T>, file: &str, step: &str) -> &'a mut Vec<T> {
    table
        .entry(file.to_string())
        .or_default()
        .entry(step.to_string())
        .or_default()
}

fn per_step<T>(table: &BugTable<T>) -> BTreeMap<&str, usize> {
    let mut counts = BTreeMap::new();

    for (step, bugs) in table.values().flatten() {
        if !bugs.is_empty() {
            *counts.entry(step.as_str()).or_insert(0) += bugs.len();
        }
    }

    counts
}

fn count<T>(table: &BugTable<T>) -> usize {
    table.values().flat_map(BTreeMap::values).map(Vec::len).sum()
}

/// One row per bug, led by its file and step
fn rows<T>(table: &BugTable<T>, cells: impl Fn(&T) -> Vec<String>) -> Vec<Vec<String>> {
    let mut rows = Vec::new();

    for (file, steps) in table {
        for (step, bugs) in steps {
            for bug in bugs {
                let mut row = vec![file.clone(), step.clone()];
                row.extend(cells(bug));
                rows.push(row);
            }
        }
    }

    rows
}

fn count_rows(counts: &BTreeMap<&str, usize>) -> Vec<Vec<String>> {
    counts
        .iter()
        .map(|(step, n)| vec![(*step).to_string(), n.to_string()])
        .collect()
}

fn table(
    w: &mut impl Write,
    caption: &str,
    header: &[&str],
    rows: &[Vec<String>],
) -> std::io::Result<()> {
    writeln!(w, "<table>")?;
    writeln!(w, "<caption><b>{caption}</b></caption>")?;

    writeln!(w, "  <tr>")?;
    for column in header {
        writeln!(w, "    <th>{column}</th>")?;
    }
    writeln!(w, "  </tr>")?;

    for row in rows {
        writeln!(w, "  <tr>")?;
        for cell in row {
            writeln!(w, "    <td>{}</td>", escape(cell.trim()))?;
        }
        writeln!(w, "  </tr>")?;
    }

    if rows.is_empty() {
        writeln!(w, "  <tr>")?;
        writeln!(
            w,
            "    <td colspan='{}'> No bugs found </td>",
            header.len()
        )?;
        writeln!(w, "  </tr>")?;
    }

    writeln!(w, "</table>")
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());

    for c in s.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }

    out
}
