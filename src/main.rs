// Copyright (c) 2021 Saadi Save
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![warn(clippy::pedantic)]

use anyhow::Context;
use clap::{ArgAction, Parser, ValueEnum};
use di_checker::{
    config::EXPORT_ENV, ir::CompilationUnit, summary::Summary, CheckerConfig, DebugInfoChecker,
    SnapshotRegistry,
};
use log::{info, LevelFilter};
use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

#[derive(Parser)]
#[command(name = "Debug Info Checker")]
#[command(version)]
#[command(author = "Saadi Save <github.com/SaadiSave>")]
#[command(about = "Check that a compiler pipeline step preserves debug info metadata")]
enum Commands {
    /// Diff the debug info of a unit before and after a step
    Check {
        /// Path to the unit as it was before the step
        before: PathBuf,

        /// Path to the unit as it is after the step
        after: PathBuf,

        /// Name of the step, used in diagnostics
        #[arg(short, long, default_value = "step")]
        step: String,

        /// Append bugs to this JSON file instead of printing them
        #[arg(short, long, env = EXPORT_ENV)]
        export: Option<PathBuf>,

        /// Format of both unit files
        #[arg(value_enum)]
        #[arg(short, long, default_value_t = InFormats::Json)]
        format: InFormats,

        /// Increase logging level
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
    /// Render an HTML summary of an export file
    Report {
        /// Path to the JSON export file
        input: PathBuf,

        /// Path to the HTML output
        output: PathBuf,

        /// Increase logging level
        #[arg(short, long, action = ArgAction::Count)]
        verbose: u8,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum InFormats {
    Json,
    Ron,
    Yaml,
}

fn main() -> anyhow::Result<ExitCode> {
    match Commands::parse() {
        Commands::Check {
            before,
            after,
            step,
            export,
            format,
            verbose,
        } => check(&before, &after, &step, export, format, verbose),
        Commands::Report {
            input,
            output,
            verbose,
        } => {
            init_logger(verbose);
            Summary::from_file(&input)
                .with_context(|| format!("Cannot read {}", input.display()))?
                .write_html_file(&output)?;
            println!("The {} generated.", output.display());
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn check(
    before: &Path,
    after: &Path,
    step: &str,
    export: Option<PathBuf>,
    format: InFormats,
    verbose: u8,
) -> anyhow::Result<ExitCode> {
    init_logger(verbose);

    let before = load(before, format)?;
    let after = load(after, format)?;

    let config = match export {
        Some(path) => CheckerConfig::default().with_export(path),
        None => CheckerConfig::default(),
    };

    let mut checker = DebugInfoChecker::new(config);
    let mut registry = SnapshotRegistry::new();

    checker.collect(&before, before.functions(), &mut registry, step);

    if checker.check(&after, after.functions(), &registry, step) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

#[allow(clippy::enum_glob_use)]
fn load(path: &Path, format: InFormats) -> anyhow::Result<CompilationUnit> {
    use InFormats::*;

    let src = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read {}", path.display()))?;

    let unit = match format {
        Json => serde_json::from_str(&src)?,
        Ron => ron::from_str(&src)?,
        Yaml => serde_yaml::from_str(&src)?,
    };

    info!("Loaded {}", path.display());
    Ok(unit)
}

fn init_logger(verbose: u8) {
    env_logger::builder()
        .format_timestamp(None)
        .format_indent(None)
        .format_target(false)
        .filter_level(log_level(verbose))
        .init();
}

fn log_level(v: u8) -> LevelFilter {
    match v {
        0 => LevelFilter::Off,
        1 => LevelFilter::Warn,
        2 => LevelFilter::Info,
        3 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}
