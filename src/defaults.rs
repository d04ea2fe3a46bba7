//! Default values for multiedit.
//!
//! This module provides centralized default values used across the engine
//! and commands, ensuring consistency and avoiding duplication.

/// The record field that carries the stable identifier.
pub const ID_FIELD: &str = "id";

/// Placeholder rendered for fields the selected records disagree on.
///
/// Display-only: the differs marker itself never serializes, so this string
/// can never be mistaken for a stored value.
pub const DIFFERS_PLACEHOLDER: &str = "<differs>";
