//! # Edit Command Implementation
//!
//! This module implements the `edit` subcommand, which batch-edits records in
//! a JSON file through an edit session: the selected records are collapsed
//! into one baseline, the `--set` assignments are applied to it, and the
//! update planner computes the minimal per-record changes to write back.
//!
//! ## Functionality
//!
//! - **Selection**: `--select` names the record ids the edit applies to.
//! - **Assignments**: repeated `--set path=value` flags; values are parsed as
//!   JSON where possible and fall back to plain strings.
//! - **Dry Run**: `--dry-run` prints the planned per-record changes as JSON
//!   without touching the file.
//! - **Deletion**: `--delete` removes the selected records instead.
//! - **Non-interactive Mode**: `--yes` skips the confirmation prompts.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use dialoguer::{theme::ColorfulTheme, Confirm};
use serde::Serialize;
use serde_json::Value as JsonValue;

use multiedit::planner::plan_updates;
use multiedit::ports::{AlwaysConfirm, Confirmer, PlainSchema};
use multiedit::record::FieldValue;
use multiedit::session::{EditSession, SelectionOutcome, SubmitOutcome};
use multiedit::store::JsonFileStore;

/// Batch-edit (or delete) selected records in a JSON records file
#[derive(Args, Debug)]
pub struct EditArgs {
    /// Path to the JSON records file (an array of objects with "id" fields).
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Record ids to edit.
    #[arg(long, value_name = "IDS", value_delimiter = ',', required = true)]
    pub select: Vec<String>,

    /// Field assignment as PATH=VALUE (repeatable). The value is parsed as
    /// JSON when possible, otherwise taken as a string.
    #[arg(long = "set", value_name = "PATH=VALUE")]
    pub set: Vec<String>,

    /// Delete the selected records instead of editing them.
    #[arg(long, conflicts_with = "set")]
    pub delete: bool,

    /// Print the planned per-record changes without applying them.
    #[arg(long, conflicts_with = "delete")]
    pub dry_run: bool,

    /// Non-interactive mode: apply without prompting.
    #[arg(short, long)]
    pub yes: bool,
}

/// One planned change payload, as printed by `--dry-run`.
#[derive(Serialize)]
struct PlannedChange {
    id: String,
    changes: JsonValue,
}

/// A confirmer backed by an interactive terminal prompt.
struct DialogConfirmer;

impl Confirmer for DialogConfirmer {
    fn confirm(&self, prompt: &str) -> multiedit::error::Result<bool> {
        Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .map_err(|err| multiedit::error::Error::Session {
                message: format!("confirmation prompt failed: {}", err),
            })
    }
}

/// Execute the `edit` command.
pub fn execute(args: EditArgs) -> Result<()> {
    let mut store = JsonFileStore::load(&args.file)
        .with_context(|| format!("failed to load {}", args.file.display()))?;

    let confirm: Box<dyn Confirmer> = if args.yes {
        Box::new(AlwaysConfirm)
    } else {
        Box::new(DialogConfirmer)
    };
    let mut session = EditSession::new(Box::new(PlainSchema::new("records")), confirm);
    session.set_originals(store.records().clone());

    match session.set_selection(args.select.clone())? {
        SelectionOutcome::Applied => {}
        SelectionOutcome::Reverted(kept) => {
            bail!("selection change was declined; still selecting {:?}", kept)
        }
    }
    for id in &args.select {
        if !store.records().contains_key(id) {
            bail!("no record with id '{}' in {}", id, args.file.display());
        }
    }

    if args.delete {
        return delete_selection(&args, &mut session, &mut store);
    }

    if args.set.is_empty() {
        bail!("nothing to do: pass at least one --set PATH=VALUE (or --delete)");
    }

    for assignment in &args.set {
        let (path, value) = parse_assignment(assignment)?;
        session.set_field(path, value)?;
    }

    if !session.has_changes() {
        println!("No changes: every selected record already matches.");
        return Ok(());
    }

    if args.dry_run {
        let schema = PlainSchema::new("records");
        let plan = plan_updates(
            session.baseline(),
            session.edited(),
            session.selection(),
            session.originals(),
            &schema,
        )?;
        let planned: Vec<PlannedChange> = plan
            .updates
            .iter()
            .map(|update| {
                Ok(PlannedChange {
                    id: update.id.clone(),
                    changes: update.changes.to_json()?,
                })
            })
            .collect::<Result<_>>()?;
        println!("{}", serde_json::to_string_pretty(&planned)?);
        return Ok(());
    }

    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Apply changes to {} selected record(s) in {}?",
                session.selection().len(),
                args.file.display()
            ))
            .default(true)
            .interact()?;
        if !proceed {
            println!("Aborted; nothing written.");
            return Ok(());
        }
    }

    match session.submit(&mut store)? {
        SubmitOutcome::Updated { records, linked } => {
            store.save()?;
            if linked > 0 {
                println!("✅ Updated {} record(s) ({} linked update(s))", records, linked);
            } else {
                println!("✅ Updated {} record(s)", records);
            }
        }
        SubmitOutcome::NoChanges => {
            println!("No changes: every selected record already matches.");
        }
        SubmitOutcome::Created(ids) => {
            // The CLI session only ever submits from the update action.
            bail!("unexpected create result for ids {:?}", ids)
        }
    }

    Ok(())
}

fn delete_selection(
    args: &EditArgs,
    session: &mut EditSession,
    store: &mut JsonFileStore,
) -> Result<()> {
    if !args.yes {
        let proceed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(format!(
                "Delete {} record(s) from {}?",
                session.selection().len(),
                args.file.display()
            ))
            .default(false)
            .interact()?;
        if !proceed {
            println!("Aborted; nothing deleted.");
            return Ok(());
        }
    }

    let deleted = session.delete_selected(store)?;
    store.save()?;
    println!("✅ Deleted {} record(s)", deleted);
    Ok(())
}

/// Split a `PATH=VALUE` assignment and parse the value.
fn parse_assignment(assignment: &str) -> Result<(&str, FieldValue)> {
    let (path, raw) = assignment.split_once('=').ok_or_else(|| {
        anyhow::anyhow!("invalid assignment '{}': expected PATH=VALUE", assignment)
    })?;
    if path.trim().is_empty() {
        bail!("invalid assignment '{}': empty field path", assignment);
    }

    let value = match serde_json::from_str::<JsonValue>(raw) {
        Ok(parsed) => FieldValue::from_json(parsed),
        // Not valid JSON: take it as a bare string, the common case for
        // names and room labels typed without quotes.
        Err(_) => FieldValue::Value(JsonValue::String(raw.to_string())),
    };
    Ok((path, value))
}
