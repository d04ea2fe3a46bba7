//! # Multiedit Library
//!
//! This library implements a multi-selection diff/merge editing engine: the
//! machinery that lets one edit form represent one *or many* selected domain
//! records at once, marks the fields the selection disagrees on, and computes
//! the minimal per-record updates when the user submits. It is used by the
//! `multiedit` command-line tool but is written to be embedded in any admin
//! UI that batch-edits records.
//!
//! ## Quick Example
//!
//! ```
//! use multiedit::collapse::collapse;
//! use multiedit::patch::{diff, merge};
//! use multiedit::record::{FieldValue, Record};
//! use serde_json::json;
//!
//! let a = Record::from_json(&json!({"name": "standup", "room": "r1"})).unwrap();
//! let b = Record::from_json(&json!({"name": "retro", "room": "r1"})).unwrap();
//!
//! // Fold the selection into one editable baseline.
//! let baseline = collapse([&a, &b]);
//! assert_eq!(baseline.get("room"), Some(&FieldValue::from("r1")));
//! assert!(baseline.get("name").unwrap().is_differs());
//!
//! // The user renames both meetings at once.
//! let mut edited = baseline.clone();
//! edited.insert("name", FieldValue::from("planning"));
//!
//! // The sparse patch holds exactly what was touched.
//! let patch = diff(&baseline, &edited);
//! assert_eq!(patch.len(), 1);
//! assert_eq!(merge(&a, &patch).get("name"), Some(&FieldValue::from("planning")));
//! ```
//!
//! ## Core Concepts
//!
//! The library is built around a few key concepts:
//!
//! - **Records (`record`)**: nested field maps with a dedicated
//!   `FieldValue::Differs` variant marking fields the selection disagrees on.
//! - **Patch primitives (`patch`)**: pure `diff` and `merge` functions over
//!   nested records, with arrays treated atomically.
//! - **Collapse (`collapse`)**: folds a whole selection into one baseline,
//!   tagging disagreements per leaf field, independent of fold order.
//! - **Edit sessions (`session`)**: the view/add/update/import state machine
//!   owning selection, baseline, and edited record, with
//!   discard-confirmation semantics.
//! - **Update planning (`planner`)**: reconstructs minimal per-record change
//!   payloads from the user's edits, pivoting each record through its
//!   local/persisted shape conversions.
//! - **Ports (`ports`)**: the narrow collaborator traits (confirmation,
//!   store, resource schema) the engine is tested and embedded through.
//!
//! ## Execution Flow
//!
//! A data layer supplies fetched originals and the table UI supplies a
//! selection; the session collapses the selection into a baseline; the user
//! mutates the edited record through field-change handlers; on submit the
//! planner turns the edits back into per-record batches for the store; the
//! session then re-baselines. Edits that restore the baseline value simply
//! compare equal again, so an untouched form never submits anything.

pub mod collapse;
pub mod defaults;
pub mod error;
pub mod patch;
pub mod planner;
pub mod ports;
pub mod record;
pub mod session;
pub mod store;

#[cfg(test)]
mod engine_proptest;
