//! Diff and merge primitives over nested records
//!
//! This module provides the two pure functions the whole engine is built on:
//!
//! - [`diff`] computes a sparse patch containing only the fields on which two
//!   records disagree, recursing into nested sub-records.
//! - [`merge`] applies a sparse patch onto a full record, merging nested
//!   patch records into nested base records rather than replacing them.
//!
//! Arrays are compared and copied atomically, never per-element; the record
//! shapes this engine works with (meetings, sessions, conferencing accounts)
//! do not need element-wise array reconciliation. The differs marker
//! participates in equality like any other value.
//!
//! ## Laws
//!
//! For all records `x`: `diff(x, x)` is empty.
//!
//! For compatible pairs (every key of `base` appears in `changed`, at every
//! nesting level): `merge(base, diff(base, changed)) == changed`. There is no
//! deletion marker; a key present in `base` but absent from `changed` is
//! ignored by `diff` and passes through `merge` unchanged.

use crate::record::{FieldValue, Record};

/// Compute the sparse patch that takes `base` to `changed`.
///
/// Only keys whose values differ are included. Nested records are diffed
/// recursively and included only when their nested patch is non-empty;
/// scalars and arrays are included wholesale.
pub fn diff(base: &Record, changed: &Record) -> Record {
    let mut patch = Record::new();

    for (key, changed_value) in changed.iter() {
        match (base.get(key), changed_value) {
            (Some(FieldValue::Record(base_nested)), FieldValue::Record(changed_nested)) => {
                let nested = diff(base_nested, changed_nested);
                if !nested.is_empty() {
                    patch.insert(key.clone(), FieldValue::Record(nested));
                }
            }
            (Some(base_value), _) => {
                if base_value != changed_value {
                    patch.insert(key.clone(), changed_value.clone());
                }
            }
            (None, _) => {
                patch.insert(key.clone(), changed_value.clone());
            }
        }
    }

    patch
}

/// Apply a sparse `patch` onto `base`, returning a new record.
///
/// Keys absent from the patch pass through unchanged. Where both sides hold a
/// nested record, the patch's nested record merges into the base's nested
/// record; in every other case the patch value replaces the base value
/// wholesale.
pub fn merge(base: &Record, patch: &Record) -> Record {
    let mut merged = base.clone();

    for (key, patch_value) in patch.iter() {
        let next = match (base.get(key), patch_value) {
            (Some(FieldValue::Record(base_nested)), FieldValue::Record(patch_nested)) => {
                FieldValue::Record(merge(base_nested, patch_nested))
            }
            (_, value) => value.clone(),
        };
        merged.insert(key.clone(), next);
    }

    merged
}
