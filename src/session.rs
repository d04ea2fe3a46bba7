//! The edit-session state machine
//!
//! An [`EditSession`] owns everything one edit view needs: the current
//! selection, the fetched originals, the collapsed baseline, the record the
//! user is mutating, and the current action. It coordinates the transitions
//! between viewing, updating a selection, adding a fresh record, and
//! importing a record from another resource type, including the
//! discard-confirmation semantics around unsaved changes.
//!
//! The session is single-threaded and cooperative: all mutation happens
//! synchronously inside its methods, driven by discrete user events. The two
//! suspension points are the injected [`Confirmer`] and the [`RecordStore`]
//! collaborators; a busy flag provides mutual exclusion while a submit is in
//! flight, and overlapping confirmation-gated transitions are refused rather
//! than interleaved. Field-change re-entrancy cannot arise: every mutation
//! takes `&mut self`, so the borrow checker rules out a handler synchronously
//! re-entering the session.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::collapse::collapse;
use crate::error::{Error, Result};
use crate::patch::merge;
use crate::planner::{plan_updates, validate_required};
use crate::ports::{Confirmer, RecordStore, ResourceSchema};
use crate::record::{FieldValue, Record, RecordId};

/// What the session is currently doing. `View` is both initial and terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditAction {
    /// Idle read display of the current selection.
    View,
    /// Creating new record(s); the selection is cleared.
    Add,
    /// Editing the current selection.
    Update,
    /// Variant of add that starts from a record cross-converted from another
    /// resource type.
    Import,
}

/// Result of an external selection change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// The session adopted the new selection and re-baselined.
    Applied,
    /// The user declined to discard unsaved changes. The payload is the
    /// selection the session kept; the caller must force the external
    /// selection back to these ids.
    Reverted(Vec<RecordId>),
}

/// Result of a submit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// A create succeeded; these are the ids the store assigned.
    Created(Vec<RecordId>),
    /// An update succeeded.
    Updated { records: usize, linked: usize },
    /// There was nothing to write.
    NoChanges,
}

/// The per-view state machine coordinating selection, baseline, edited
/// record, and action.
pub struct EditSession {
    schema: Box<dyn ResourceSchema>,
    confirm: Box<dyn Confirmer>,
    action: EditAction,
    selection: Vec<RecordId>,
    originals: BTreeMap<RecordId, Record>,
    baseline: Record,
    edited: Record,
    busy: bool,
    confirming: bool,
}

impl EditSession {
    /// Create an idle session with an empty selection.
    pub fn new(schema: Box<dyn ResourceSchema>, confirm: Box<dyn Confirmer>) -> Self {
        EditSession {
            schema,
            confirm,
            action: EditAction::View,
            selection: Vec::new(),
            originals: BTreeMap::new(),
            baseline: Record::new(),
            edited: Record::new(),
            busy: false,
            confirming: false,
        }
    }

    pub fn action(&self) -> EditAction {
        self.action
    }

    pub fn selection(&self) -> &[RecordId] {
        &self.selection
    }

    pub fn baseline(&self) -> &Record {
        &self.baseline
    }

    pub fn edited(&self) -> &Record {
        &self.edited
    }

    pub fn originals(&self) -> &BTreeMap<RecordId, Record> {
        &self.originals
    }

    /// Whether a submit is in flight. While busy, edits and further submits
    /// are refused; this is mutual exclusion, not cancellation.
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Whether the edited record has unsaved changes relative to the
    /// baseline. Structural comparison: a field edited and then restored to
    /// its original value counts as unchanged again.
    pub fn has_changes(&self) -> bool {
        self.edited != self.baseline
    }

    /// Replace the fetched originals (the data layer re-fetched or received
    /// an update push) and re-baseline the current selection.
    ///
    /// Add/import forms are not derived from originals, so their baseline and
    /// edits survive a refresh.
    pub fn set_originals(&mut self, originals: BTreeMap<RecordId, Record>) {
        self.originals = originals;
        if matches!(self.action, EditAction::View | EditAction::Update) {
            self.rebaseline();
        }
    }

    /// Handle an external selection change (the user clicked other rows).
    ///
    /// If the session is mid-update with unsaved changes, the confirmer is
    /// asked first; declining keeps the current selection and edits intact
    /// and tells the caller which ids to force the external selection back
    /// to.
    pub fn set_selection(&mut self, ids: Vec<RecordId>) -> Result<SelectionOutcome> {
        self.ensure_not_busy("change the selection")?;

        if self.action == EditAction::Update && self.has_changes() {
            let discard = self.guarded_confirm("You have unsaved changes. Discard them?")?;
            if !discard {
                debug!("selection change declined; keeping {:?}", self.selection);
                return Ok(SelectionOutcome::Reverted(self.selection.clone()));
            }
        }

        self.selection = ids;
        self.action = if self.selection.is_empty() {
            EditAction::View
        } else {
            EditAction::Update
        };
        self.rebaseline();
        Ok(SelectionOutcome::Applied)
    }

    /// Switch to the add form. Returns `Ok(false)` when the user declined to
    /// discard unsaved changes, leaving the session untouched.
    pub fn begin_add(&mut self) -> Result<bool> {
        self.ensure_not_busy("start an add")?;

        if self.action == EditAction::Update && self.has_changes() {
            let discard = self.guarded_confirm("You have unsaved changes. Discard them?")?;
            if !discard {
                return Ok(false);
            }
        }

        self.selection.clear();
        self.action = EditAction::Add;
        self.baseline = self.schema.default_record();
        self.edited = self.baseline.clone();
        debug!("entered add form for {}", self.schema.resource_name());
        Ok(true)
    }

    /// Switch to the import form, pre-filling the edit record from the first
    /// selected record via the schema's cross-conversion.
    pub fn begin_import(&mut self) -> Result<()> {
        self.ensure_not_busy("start an import")?;

        let source = self
            .selection
            .first()
            .and_then(|id| self.originals.get(id))
            .ok_or_else(|| Error::Session {
                message: "import requires a selected source record".to_string(),
            })?;
        let converted = self.schema.convert_import(source)?;

        self.selection.clear();
        self.action = EditAction::Import;
        self.baseline = self.schema.default_record();
        self.edited = converted;
        debug!("entered import form for {}", self.schema.resource_name());
        Ok(())
    }

    /// Change one field of the edited record by dotted path.
    pub fn set_field(&mut self, path: &str, value: FieldValue) -> Result<()> {
        self.ensure_not_busy("edit a field")?;
        if self.action == EditAction::View {
            return Err(Error::Session {
                message: "fields are read-only while viewing".to_string(),
            });
        }
        self.edited.set_path(path, value)
    }

    /// Submit the current form through the store collaborator.
    ///
    /// On failure the session keeps its pre-submit state and the busy flag is
    /// cleared; the caller may retry or cancel.
    pub fn submit(&mut self, store: &mut dyn RecordStore) -> Result<SubmitOutcome> {
        self.ensure_not_busy("submit")?;

        match self.action {
            EditAction::View => Err(Error::Session {
                message: "nothing to submit while viewing".to_string(),
            }),
            EditAction::Add | EditAction::Import => self.submit_create(store),
            EditAction::Update => self.submit_update(store),
        }
    }

    /// Abandon the current form without confirmation: return to editing the
    /// current selection (or viewing, if the selection is empty) with
    /// baseline and edited recomputed from the fetched originals.
    pub fn cancel(&mut self) -> Result<()> {
        self.ensure_not_busy("cancel")?;

        self.action = if self.selection.is_empty() {
            EditAction::View
        } else {
            EditAction::Update
        };
        self.rebaseline();
        Ok(())
    }

    /// Delete the selected records and return to the empty view state.
    pub fn delete_selected(&mut self, store: &mut dyn RecordStore) -> Result<usize> {
        self.ensure_not_busy("delete")?;
        if self.selection.is_empty() {
            return Err(Error::Session {
                message: "no records selected for deletion".to_string(),
            });
        }

        self.busy = true;
        let result = store.delete(&self.selection);
        self.busy = false;
        result?;

        let deleted = self.selection.len();
        for id in &self.selection {
            self.originals.remove(id);
        }
        self.selection.clear();
        self.action = EditAction::View;
        self.rebaseline();
        Ok(deleted)
    }

    fn submit_create(&mut self, store: &mut dyn RecordStore) -> Result<SubmitOutcome> {
        // Validation runs before anything mutates; a failure leaves the form
        // exactly as the user sees it.
        validate_required(&self.edited, self.schema.as_ref())?;

        self.busy = true;
        let result = store.create(vec![self.edited.clone()]);
        self.busy = false;
        let ids = result?;

        for id in &ids {
            self.originals.insert(id.clone(), self.edited.clone());
        }
        self.selection = ids.clone();
        self.action = EditAction::Update;
        self.baseline = self.edited.clone();
        debug!("created {:?} in {}", ids, self.schema.resource_name());
        Ok(SubmitOutcome::Created(ids))
    }

    fn submit_update(&mut self, store: &mut dyn RecordStore) -> Result<SubmitOutcome> {
        if !self.has_changes() {
            return Ok(SubmitOutcome::NoChanges);
        }

        let plan = plan_updates(
            &self.baseline,
            &self.edited,
            &self.selection,
            &self.originals,
            self.schema.as_ref(),
        )?;
        if plan.is_empty() {
            // Every selected record already matches the edit.
            self.baseline = self.edited.clone();
            return Ok(SubmitOutcome::NoChanges);
        }

        self.busy = true;
        let result = store.update(&plan.updates).and_then(|()| {
            if plan.linked.is_empty() {
                Ok(())
            } else {
                store.update_linked(&plan.linked)
            }
        });
        self.busy = false;
        if let Err(err) = result {
            warn!("update submit failed, session state preserved: {}", err);
            return Err(err);
        }

        // Mirror the accepted changes into the local originals so the next
        // baseline is consistent without a refetch.
        for update in &plan.updates {
            if let Some(original) = self.originals.get(&update.id) {
                let applied = merge(original, &update.changes);
                self.originals.insert(update.id.clone(), applied);
            }
        }
        self.baseline = self.edited.clone();

        Ok(SubmitOutcome::Updated {
            records: plan.updates.len(),
            linked: plan.linked.len(),
        })
    }

    fn rebaseline(&mut self) {
        self.baseline = collapse(
            self.selection
                .iter()
                .filter_map(|id| self.originals.get(id)),
        );
        self.edited = self.baseline.clone();
    }

    fn ensure_not_busy(&self, operation: &str) -> Result<()> {
        if self.busy {
            return Err(Error::Busy {
                operation: operation.to_string(),
            });
        }
        Ok(())
    }

    /// Run a confirmation, refusing overlap with one already in flight.
    fn guarded_confirm(&mut self, prompt: &str) -> Result<bool> {
        if self.confirming {
            return Err(Error::Busy {
                operation: "confirm a transition".to_string(),
            });
        }
        self.confirming = true;
        let answer = self.confirm.confirm(prompt);
        self.confirming = false;
        answer
    }
}
