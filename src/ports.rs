//! Collaborator interfaces for the editing engine
//!
//! The engine never talks to a modal dialog, a network layer, or a store
//! directly; it talks to the narrow traits defined here. That keeps the state
//! machine deterministic under test: scripted confirmers replace the dialog,
//! an in-memory store replaces persistence.
//!
//! - [`Confirmer`]: the discard-confirmation capability, injected into the
//!   session controller instead of reached as an ambient modal singleton.
//! - [`RecordStore`]: the create/update/delete write interface.
//! - [`ResourceSchema`]: the per-resource descriptor supplying defaults,
//!   required fields, cross-link fields, and the local/persisted shape
//!   conversions the update planner pivots through.

use std::cell::RefCell;
use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::planner::RecordUpdate;
use crate::record::{Record, RecordId};

/// Asks the user a yes/no question before a destructive transition.
pub trait Confirmer {
    /// Present `prompt` and return the user's answer.
    fn confirm(&self, prompt: &str) -> Result<bool>;
}

/// A confirmer that answers yes to everything. Used for non-interactive runs
/// (`--yes`).
pub struct AlwaysConfirm;

impl Confirmer for AlwaysConfirm {
    fn confirm(&self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// A confirmer that replays a scripted sequence of answers.
///
/// Intended for tests: queue the answers the "user" will give, then assert on
/// the prompts afterwards. Runs out of answers loudly rather than guessing.
#[derive(Default)]
pub struct ScriptedConfirm {
    answers: RefCell<VecDeque<bool>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedConfirm {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        ScriptedConfirm {
            answers: RefCell::new(answers.into_iter().collect()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    /// The prompts presented so far, in order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl Confirmer for ScriptedConfirm {
    fn confirm(&self, prompt: &str) -> Result<bool> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.answers
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| Error::Session {
                message: format!("unexpected confirmation prompt: {}", prompt),
            })
    }
}

/// The persistence write interface.
///
/// Change payloads are already in persisted shape when they reach this trait;
/// the engine guarantees they never contain the differs marker.
pub trait RecordStore {
    /// Persist new records, returning their assigned ids in order.
    fn create(&mut self, records: Vec<Record>) -> Result<Vec<RecordId>>;

    /// Apply a batch of sparse per-record changes.
    fn update(&mut self, batch: &[RecordUpdate]) -> Result<()>;

    /// Apply the secondary batch of cross-link changes, addressed to records
    /// owned by a different collection.
    fn update_linked(&mut self, batch: &[RecordUpdate]) -> Result<()>;

    /// Delete records by id.
    fn delete(&mut self, ids: &[RecordId]) -> Result<()>;
}

/// Per-resource descriptor consumed by the session and the update planner.
///
/// The default implementations describe a resource whose local and persisted
/// shapes coincide and which has no required or cross-link fields; a real
/// resource overrides what it needs. `to_local` and `to_persisted` must be
/// mutual inverses for the planner to be correct; that contract is checked by
/// round-trip tests, not at runtime.
pub trait ResourceSchema {
    /// Human-readable resource name, used in prompts and errors.
    fn resource_name(&self) -> &str;

    /// The fresh record an add form starts from. Never contains the differs
    /// marker.
    fn default_record(&self) -> Record {
        Record::new()
    }

    /// Fields that must be present (and not differing) before a create.
    fn required_fields(&self) -> &[&str] {
        &[]
    }

    /// Fields that address a record owned by a different collection; the
    /// planner extracts these into the secondary batch.
    fn cross_link_fields(&self) -> &[&str] {
        &[]
    }

    /// Convert a fetched record into the shape the edit form works in
    /// (e.g. start/end timestamps into date + time + duration).
    fn to_local(&self, record: &Record) -> Result<Record> {
        Ok(record.clone())
    }

    /// Convert an edit-form record back into persisted shape. Must invert
    /// [`ResourceSchema::to_local`].
    fn to_persisted(&self, record: &Record) -> Result<Record> {
        Ok(record.clone())
    }

    /// Cross-convert a record of another type into this resource's shape,
    /// used by the import action. Resources that cannot be imported into
    /// keep the default.
    fn convert_import(&self, _source: &Record) -> Result<Record> {
        Err(Error::NotImplemented {
            feature: format!("import into {}", self.resource_name()),
        })
    }
}

/// A schema with identity conversions and no constraints, for resources
/// edited exactly as stored. This is what the CLI uses for plain JSON
/// record files.
pub struct PlainSchema {
    name: String,
}

impl PlainSchema {
    pub fn new(name: impl Into<String>) -> Self {
        PlainSchema { name: name.into() }
    }
}

impl ResourceSchema for PlainSchema {
    fn resource_name(&self) -> &str {
        &self.name
    }
}
