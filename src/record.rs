//! Record values for the diff/merge editing engine
//!
//! A [`Record`] is a single domain item (a meeting, a session, a breakout...)
//! represented as an ordered map from field name to [`FieldValue`]. Field
//! values are scalars or arrays (held as atomic JSON values), nested records,
//! or the [`FieldValue::Differs`] marker.
//!
//! ## The differs marker
//!
//! When several records are collapsed into one editable baseline, fields on
//! which the selection disagrees are tagged [`FieldValue::Differs`]. The
//! marker is a dedicated enum variant rather than a magic value, so it can
//! never collide with a legitimate field value (`0`, `""`, `null`, `false`)
//! and every consumer is forced by the type system to handle it. It is a
//! display-only state: [`Record::to_json`] refuses to serialize it, which
//! keeps it out of every write interface.
//!
//! ## Field paths
//!
//! Nested fields are addressed with dotted path expressions such as
//! `webex.url` or `conference["dial.in"]`. Arrays are atomic values and are
//! never indexed into.

use std::collections::BTreeMap;

use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, Result};

/// A stable record identifier.
pub type RecordId = String;

/// A single field of a [`Record`].
///
/// `Value` holds scalars and arrays as raw JSON; it never holds a JSON
/// object, because objects become nested `Record`s on ingestion. Arrays are
/// compared atomically, not per-element.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    /// The selected records disagree on this field.
    Differs,
    /// A scalar or array value, compared as a whole.
    Value(JsonValue),
    /// A nested sub-record (e.g. a meeting's embedded conferencing record).
    Record(Record),
}

impl FieldValue {
    /// Returns `true` iff this is the differs marker.
    pub fn is_differs(&self) -> bool {
        matches!(self, FieldValue::Differs)
    }

    /// Build a field value from raw JSON, turning objects into nested records.
    pub fn from_json(value: JsonValue) -> FieldValue {
        match value {
            JsonValue::Object(map) => FieldValue::Record(Record::from_object(map)),
            other => FieldValue::Value(other),
        }
    }

    /// Convert back to raw JSON.
    ///
    /// # Errors
    ///
    /// Returns `Error::Record` if the value is (or contains) the differs
    /// marker, which must never reach a write interface.
    pub fn to_json(&self) -> Result<JsonValue> {
        match self {
            FieldValue::Differs => Err(Error::Record {
                message: "the differs marker cannot be serialized".to_string(),
            }),
            FieldValue::Value(value) => Ok(value.clone()),
            FieldValue::Record(record) => record.to_json(),
        }
    }
}

impl From<JsonValue> for FieldValue {
    fn from(value: JsonValue) -> Self {
        FieldValue::from_json(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Value(JsonValue::String(value.to_string()))
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Value(JsonValue::Number(value.into()))
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Value(JsonValue::Bool(value))
    }
}

/// An ordered field map representing one domain record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, FieldValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Returns `true` if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of top-level fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Look up a top-level field.
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Mutable lookup of a top-level field.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut FieldValue> {
        self.fields.get_mut(key)
    }

    /// Returns `true` if the record has a top-level field with this name.
    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Insert or replace a top-level field.
    pub fn insert(&mut self, key: impl Into<String>, value: FieldValue) {
        self.fields.insert(key.into(), value);
    }

    /// Remove a top-level field, returning its value if present.
    pub fn remove(&mut self, key: &str) -> Option<FieldValue> {
        self.fields.remove(key)
    }

    /// Iterate over fields in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.fields.iter()
    }

    /// Iterate over field names in key order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.fields.keys()
    }

    /// Returns `true` if any field, at any depth, is the differs marker.
    pub fn contains_differs(&self) -> bool {
        self.fields.values().any(|value| match value {
            FieldValue::Differs => true,
            FieldValue::Record(nested) => nested.contains_differs(),
            FieldValue::Value(_) => false,
        })
    }

    /// Build a record from a JSON value, which must be an object.
    ///
    /// Nested objects become nested records; everything else (scalars and
    /// arrays) is stored atomically.
    ///
    /// # Errors
    ///
    /// Returns `Error::Record` if the value is not a JSON object.
    pub fn from_json(value: &JsonValue) -> Result<Record> {
        match value {
            JsonValue::Object(map) => Ok(Record::from_object(map.clone())),
            other => Err(Error::Record {
                message: format!("expected a JSON object, got {}", json_type_name(other)),
            }),
        }
    }

    fn from_object(map: Map<String, JsonValue>) -> Record {
        let mut record = Record::new();
        for (key, value) in map {
            record.insert(key, FieldValue::from_json(value));
        }
        record
    }

    /// Convert the record back to a JSON object.
    ///
    /// # Errors
    ///
    /// Returns `Error::Record` if any field still carries the differs
    /// marker; a collapsed baseline with live disagreements is not
    /// serializable by design.
    pub fn to_json(&self) -> Result<JsonValue> {
        let mut map = Map::new();
        for (key, value) in &self.fields {
            map.insert(key.clone(), value.to_json()?);
        }
        Ok(JsonValue::Object(map))
    }

    /// Look up a field by dotted path (e.g. `webex.url`).
    pub fn get_path(&self, path: &str) -> Option<&FieldValue> {
        let segments = parse_path(path);
        let mut current = self;
        let (last, parents) = segments.split_last()?;
        for segment in parents {
            match current.get(segment) {
                Some(FieldValue::Record(nested)) => current = nested,
                _ => return None,
            }
        }
        current.get(last)
    }

    /// Set a field by dotted path, creating intermediate nested records as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Record` if the path is empty or an intermediate
    /// segment holds a scalar or the differs marker (nested navigation is
    /// only defined through sub-records).
    pub fn set_path(&mut self, path: &str, value: FieldValue) -> Result<()> {
        let segments = parse_path(path);
        let (last, parents) = segments.split_last().ok_or_else(|| Error::Record {
            message: format!("empty field path '{}'", path),
        })?;

        let mut current = self;
        for segment in parents {
            if !matches!(current.get(segment), Some(FieldValue::Record(_))) {
                if current.contains_key(segment) {
                    return Err(Error::Record {
                        message: format!(
                            "cannot navigate into '{}': field is not a sub-record",
                            segment
                        ),
                    });
                }
                current.insert(segment.clone(), FieldValue::Record(Record::new()));
            }
            current = match current.get_mut(segment) {
                Some(FieldValue::Record(nested)) => nested,
                _ => unreachable!("segment was just ensured to be a sub-record"),
            };
        }

        current.insert(last.clone(), value);
        Ok(())
    }
}

impl FromIterator<(String, FieldValue)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Record {
            fields: iter.into_iter().collect(),
        }
    }
}

impl From<BTreeMap<String, FieldValue>> for Record {
    fn from(fields: BTreeMap<String, FieldValue>) -> Self {
        Record { fields }
    }
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

/// Parse a field path string into segments.
///
/// Supports:
/// - Dot notation: `foo.bar.baz`
/// - Bracket notation: `foo["bar"]` or `foo['bar']`
/// - Escaped characters: `foo\.bar` (literal dot)
/// - Mixed: `conference.config["special.key"]`
///
/// Arrays are atomic in this engine, so there is no index syntax; bracket
/// segments are always treated as keys.
///
/// # Examples
///
/// ```
/// use multiedit::record::parse_path;
///
/// let segments = parse_path("webex.config.url");
/// assert_eq!(segments.len(), 3);
/// ```
pub fn parse_path(path: &str) -> Vec<String> {
    if path.trim().is_empty() {
        return Vec::new();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();
    let mut escaped = false;

    while let Some(ch) = chars.next() {
        if escaped {
            current.push(ch);
            escaped = false;
            continue;
        }

        match ch {
            '\\' => {
                escaped = true;
            }
            '.' => {
                if !current.is_empty() {
                    segments.push(current.clone());
                    current.clear();
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(current.clone());
                    current.clear();
                }

                let first_char = chars.peek().copied();

                if first_char == Some('"') || first_char == Some('\'') {
                    let quote_char = chars.next().unwrap();
                    let mut key = String::new();
                    let mut bracket_escaped = false;

                    while let Some(ch) = chars.next() {
                        if bracket_escaped {
                            key.push(ch);
                            bracket_escaped = false;
                        } else if ch == '\\' {
                            bracket_escaped = true;
                        } else if ch == quote_char {
                            if chars.peek() == Some(&']') {
                                chars.next();
                                break;
                            }
                            key.push(ch);
                        } else {
                            key.push(ch);
                        }
                    }

                    segments.push(key);
                } else {
                    let mut bracket_content = String::new();
                    while let Some(&next_ch) = chars.peek() {
                        chars.next();
                        if next_ch == ']' {
                            break;
                        }
                        bracket_content.push(next_ch);
                    }

                    if !bracket_content.trim().is_empty() {
                        segments.push(bracket_content.trim().to_string());
                    }
                }
            }
            _ => current.push(ch),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}
