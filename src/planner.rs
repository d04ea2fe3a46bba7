//! Update planning: from one edited form back to minimal per-record changes
//!
//! After the user edits the collapsed baseline, the planner reconstructs what
//! must actually be written for each selected record. The driving patch is
//! `diff(baseline, edited)` — exactly the fields the user touched. Each
//! record is pivoted through its local (edit-form) shape, receives the patch
//! there, is converted back to persisted shape, and then diffed against its
//! own original. Records whose reconstructed persisted value equals the
//! original are omitted entirely, so untouched idiosyncrasies are preserved
//! and already-matching records receive no write at all.
//!
//! Fields that address a record owned by a different collection (cross-links,
//! e.g. associating a meeting with a conferencing account) are extracted into
//! a secondary batch before emission.

use std::collections::BTreeMap;

use log::debug;

use crate::error::{Error, Result};
use crate::patch::{diff, merge};
use crate::ports::ResourceSchema;
use crate::record::{Record, RecordId};

/// A sparse change payload for one record.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordUpdate {
    pub id: RecordId,
    pub changes: Record,
}

/// The full outcome of planning: the primary per-record batch plus the
/// secondary cross-link batch.
#[derive(Debug, Default)]
pub struct UpdatePlan {
    /// Changes addressed to the edited collection itself.
    pub updates: Vec<RecordUpdate>,
    /// Changes extracted for records owned by a different collection.
    pub linked: Vec<RecordUpdate>,
}

impl UpdatePlan {
    pub fn is_empty(&self) -> bool {
        self.updates.is_empty() && self.linked.is_empty()
    }
}

/// Plan the minimal set of per-record updates for a submit.
///
/// # Errors
///
/// Returns `Error::Plan` if a selected id has no fetched original, or if a
/// computed change payload still contains the differs marker (which must
/// never reach a write interface).
pub fn plan_updates(
    baseline: &Record,
    edited: &Record,
    selection: &[RecordId],
    originals: &BTreeMap<RecordId, Record>,
    schema: &dyn ResourceSchema,
) -> Result<UpdatePlan> {
    let patch = diff(baseline, edited);
    let mut plan = UpdatePlan::default();

    if patch.is_empty() {
        return Ok(plan);
    }

    for id in selection {
        let original = originals.get(id).ok_or_else(|| Error::Plan {
            message: format!("no fetched record for selected id '{}'", id),
        })?;

        let local = schema.to_local(original)?;
        let candidate = merge(&local, &patch);
        let persisted = schema.to_persisted(&candidate)?;
        let mut changes = diff(original, &persisted);

        if changes.is_empty() {
            continue;
        }

        let mut linked = Record::new();
        for field in schema.cross_link_fields() {
            if let Some(value) = changes.remove(field) {
                linked.insert(field.to_string(), value);
            }
        }

        if changes.contains_differs() || linked.contains_differs() {
            return Err(Error::Plan {
                message: format!("computed changes for '{}' contain the differs marker", id),
            });
        }

        if !linked.is_empty() {
            plan.linked.push(RecordUpdate {
                id: id.clone(),
                changes: linked,
            });
        }
        if !changes.is_empty() {
            plan.updates.push(RecordUpdate {
                id: id.clone(),
                changes,
            });
        }
    }

    debug!(
        "planned {} update(s) and {} linked update(s) for {} selected {} record(s)",
        plan.updates.len(),
        plan.linked.len(),
        selection.len(),
        schema.resource_name()
    );

    Ok(plan)
}

/// Check that every required field of `schema` is present in `record` and is
/// a concrete value (not null, not the differs marker).
///
/// Runs before a create submit; on failure nothing has been sent anywhere.
pub fn validate_required(record: &Record, schema: &dyn ResourceSchema) -> Result<()> {
    use crate::record::FieldValue;

    for field in schema.required_fields() {
        let missing = match record.get_path(field) {
            None => true,
            Some(FieldValue::Differs) => true,
            Some(FieldValue::Value(value)) => value.is_null(),
            Some(FieldValue::Record(_)) => false,
        };
        if missing {
            return Err(Error::Validation {
                field: (*field).to_string(),
            });
        }
    }
    Ok(())
}
