//! # Diff Command Implementation
//!
//! This module implements the `diff` subcommand, which prints the sparse
//! patch between two JSON record files: only the fields on which the two
//! records disagree, with nested records diffed recursively and arrays
//! compared atomically.
//!
//! ## Functionality
//!
//! - **Change Detection**: `diff(base, changed)` over the two record objects
//! - **Exit Codes**: Returns 0 if the records are identical, 1 if they differ
//!
//! This command is a safe, read-only operation that does not modify any files.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value as JsonValue;

use multiedit::patch::diff;
use multiedit::record::Record;

/// Show the sparse patch between two JSON record files
#[derive(Args, Debug)]
pub struct DiffArgs {
    /// The base record file (a single JSON object).
    #[arg(value_name = "BASE")]
    pub base: PathBuf,

    /// The changed record file (a single JSON object).
    #[arg(value_name = "CHANGED")]
    pub changed: PathBuf,
}

/// Execute the `diff` command.
///
/// Returns `Ok(true)` when differences were found, so the CLI can map the
/// result to a non-zero exit code.
pub fn execute(args: DiffArgs) -> Result<bool> {
    let base = load_record(&args.base)?;
    let changed = load_record(&args.changed)?;

    let patch = diff(&base, &changed);
    if patch.is_empty() {
        println!("No differences");
        return Ok(false);
    }

    println!("{}", serde_json::to_string_pretty(&patch.to_json()?)?);
    Ok(true)
}

fn load_record(path: &PathBuf) -> Result<Record> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let value: JsonValue = serde_json::from_str(&content)
        .with_context(|| format!("invalid JSON in {}", path.display()))?;
    Record::from_json(&value).with_context(|| format!("{} is not a record object", path.display()))
}
