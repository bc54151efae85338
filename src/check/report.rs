// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::{compare::BugRecord, Diagnostics, Outcome};
use serde::Serialize;
use std::{fs::OpenOptions, io::Write, path::Path};

/// One line of the JSON export file
#[derive(Serialize)]
struct ExportRecord<'a> {
    file: &'a str,
    pass: &'a str,
    bugs: &'a [BugRecord],
}

/// Reports the bugs of a checked step and prints its verdict
///
/// With an export path, a non-empty bug list is appended to it as one JSON
/// line. Otherwise every bug is printed.
pub(crate) fn emit(
    diag: &mut Diagnostics,
    export: Option<&Path>,
    file: &str,
    step: &str,
    outcome: &Outcome,
) {
    let bugs = outcome.bugs();

    match export {
        Some(path) if !bugs.is_empty() => {
            let record = ExportRecord {
                file,
                pass: step,
                bugs,
            };

            if let Err(e) = append(path, &record) {
                warn!("Export of {} bug(s) after {step} failed", bugs.len());
                diag.line(format_args!("Could not open file: {e}, {}", path.display()));
            } else {
                debug!("Exported {} bug(s) to {}", bugs.len(), path.display());
            }
        }
        Some(_) => {}
        None => {
            for bug in bugs {
                diag.line(bug.describe(step, file));
            }
        }
    }

    let verdict = if outcome.passed() { "PASS" } else { "FAIL" };
    diag.line(format_args!("{step}: {verdict}"));
}

fn append(path: &Path, record: &ExportRecord<'_>) -> std::io::Result<()> {
    let mut line = serde_json::to_vec(record)?;
    line.push(b'\n');

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?
        .write_all(&line)
}

#[cfg(test)]
mod report_tests {
    use super::emit;
    use crate::{
        check::{Action, BugRecord, Diagnostics, Outcome},
        TestStdio,
    };
    use pretty_assertions::assert_eq;

    fn checked(bugs: &[BugRecord]) -> Outcome {
        Outcome::Checked {
            bugs: bugs.to_vec(),
        }
    }

    fn bugs() -> Vec<BugRecord> {
        vec![
            BugRecord::Subprogram {
                name: "f".into(),
                action: Action::NotGenerated,
            },
            BugRecord::Location {
                function: "f".into(),
                block: "no-name".into(),
                opcode: "call".into(),
                action: Action::Dropped,
            },
        ]
    }

    #[test]
    fn text_mode() {
        let out = TestStdio::new();
        let mut diag = Diagnostics::new(out.clone());

        emit(&mut diag, None, "foo.c", "licm", &checked(&bugs()));
        assert_eq!(
            out.lines(),
            vec![
                "  ***ERROR: licm did not generate DISubprogram for the f from file: foo.c",
                "  ***ERROR: licm dropped DILocation for the call in f (BB name: no-name) from file: foo.c",
                "licm: FAIL",
            ]
        );
    }

    #[test]
    fn export_mode_appends_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let out = TestStdio::new();
        let mut diag = Diagnostics::new(out.clone());

        emit(&mut diag, Some(&path), "foo.c", "licm", &checked(&bugs()));
        emit(&mut diag, Some(&path), "foo.c", "gvn", &checked(&[]));
        emit(&mut diag, Some(&path), "foo.c", "dce", &checked(&bugs()[..1]));

        let exported = std::fs::read_to_string(&path).unwrap();
        let lines = exported.lines().collect::<Vec<_>>();

        assert_eq!(lines.len(), 2);
        assert!(lines[0]
            .starts_with(r#"{"file":"foo.c","pass":"licm","bugs":[{"metadata":"DISubprogram""#));
        assert_eq!(
            lines[1],
            r#"{"file":"foo.c","pass":"dce","bugs":[{"metadata":"DISubprogram","name":"f","action":"not-generate"}]}"#
        );
        assert_eq!(out.lines(), vec!["licm: FAIL", "gvn: PASS", "dce: FAIL"]);
    }

    #[test]
    fn export_failure_keeps_verdict() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");
        let out = TestStdio::new();
        let mut diag = Diagnostics::new(out.clone());

        emit(&mut diag, Some(&path), "foo.c", "licm", &checked(&bugs()));

        let lines = out.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Could not open file: "));
        assert!(lines[0].ends_with(&path.display().to_string()));
        assert_eq!(lines[1], "licm: FAIL");
    }
}
