//! # Show Command Implementation
//!
//! This module implements the `show` subcommand, which loads a JSON records
//! file, collapses the selected records into a single baseline, and prints
//! it the way an edit form would present it: agreeing fields with their
//! value, disagreeing fields with a `<differs>` placeholder.
//!
//! ## Functionality
//!
//! - **Selection**: `--select` picks record ids; omitting it collapses the
//!   whole file.
//! - **Plain Output**: indented `field: value` lines with styled placeholders.
//! - **JSON Output**: `--json` prints the baseline as a JSON object with
//!   placeholders substituted for disagreeing fields.
//!
//! This command is a read-only operation that never modifies the file.

use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Args;
use console::style;
use serde_json::{Map, Value as JsonValue};

use multiedit::collapse::collapse;
use multiedit::defaults::DIFFERS_PLACEHOLDER;
use multiedit::record::{FieldValue, Record};
use multiedit::store::JsonFileStore;

/// Show the collapsed baseline of a record selection
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Path to the JSON records file (an array of objects with "id" fields).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Record ids to collapse; defaults to every record in the file.
    #[arg(long, value_name = "IDS", value_delimiter = ',')]
    pub select: Vec<String>,

    /// Print the baseline as JSON instead of field lines.
    #[arg(long)]
    pub json: bool,
}

/// Execute the `show` command.
pub fn execute(args: ShowArgs) -> Result<()> {
    let store = JsonFileStore::load(&args.file)?;

    let selection: Vec<String> = if args.select.is_empty() {
        store.records().keys().cloned().collect()
    } else {
        args.select.clone()
    };

    let mut selected = Vec::with_capacity(selection.len());
    for id in &selection {
        match store.records().get(id) {
            Some(record) => selected.push(record),
            None => bail!("no record with id '{}' in {}", id, args.file.display()),
        }
    }

    let baseline = collapse(selected);

    if args.json {
        let rendered = JsonValue::Object(render_json(&baseline));
        println!("{}", serde_json::to_string_pretty(&rendered)?);
    } else {
        println!(
            "{} record(s) collapsed:",
            style(selection.len()).bold()
        );
        print_fields(&baseline, 1);
    }

    Ok(())
}

/// Render a record as JSON for display, substituting the placeholder for
/// fields the selection disagrees on.
fn render_json(record: &Record) -> Map<String, JsonValue> {
    let mut map = Map::new();
    for (key, value) in record.iter() {
        let rendered = match value {
            FieldValue::Differs => JsonValue::String(DIFFERS_PLACEHOLDER.to_string()),
            FieldValue::Value(value) => value.clone(),
            FieldValue::Record(nested) => JsonValue::Object(render_json(nested)),
        };
        map.insert(key.clone(), rendered);
    }
    map
}

fn print_fields(record: &Record, depth: usize) {
    let indent = "  ".repeat(depth);
    for (key, value) in record.iter() {
        match value {
            FieldValue::Differs => {
                println!("{}{}: {}", indent, key, style(DIFFERS_PLACEHOLDER).yellow());
            }
            FieldValue::Value(value) => {
                println!("{}{}: {}", indent, key, value);
            }
            FieldValue::Record(nested) => {
                println!("{}{}:", indent, key);
                print_fields(nested, depth + 1);
            }
        }
    }
}
