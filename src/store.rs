//! Store collaborators: in-memory and JSON-file backed
//!
//! [`MemoryStore`] is the reference [`RecordStore`] implementation: a plain
//! map of records plus a log of cross-link writes, used by tests and as the
//! substrate of the file store. [`JsonFileStore`] loads a JSON array of
//! record objects from disk, serves it through a `MemoryStore`, and writes
//! the array back out; it is what the CLI edits against.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value as JsonValue;

use crate::defaults::ID_FIELD;
use crate::error::{Error, Result};
use crate::patch::merge;
use crate::planner::RecordUpdate;
use crate::ports::RecordStore;
use crate::record::{FieldValue, Record, RecordId};

/// An in-memory record store.
#[derive(Default)]
pub struct MemoryStore {
    records: BTreeMap<RecordId, Record>,
    linked_log: Vec<RecordUpdate>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Seed the store with an existing record under a known id.
    pub fn insert(&mut self, id: impl Into<RecordId>, record: Record) {
        self.records.insert(id.into(), record);
    }

    /// All stored records, keyed by id.
    pub fn records(&self) -> &BTreeMap<RecordId, Record> {
        &self.records
    }

    /// Cross-link updates received so far, in arrival order. These address a
    /// different collection, so the memory store only logs them.
    pub fn linked_log(&self) -> &[RecordUpdate] {
        &self.linked_log
    }

    fn assign_id(&mut self, record: &Record) -> RecordId {
        // A record arriving with a concrete id field keeps it.
        if let Some(FieldValue::Value(JsonValue::String(id))) = record.get(ID_FIELD) {
            if !id.is_empty() {
                return id.clone();
            }
        }
        loop {
            self.next_id += 1;
            let id = format!("rec-{}", self.next_id);
            if !self.records.contains_key(&id) {
                return id;
            }
        }
    }
}

impl RecordStore for MemoryStore {
    fn create(&mut self, records: Vec<Record>) -> Result<Vec<RecordId>> {
        let mut ids = Vec::with_capacity(records.len());
        for mut record in records {
            let id = self.assign_id(&record);
            record.insert(ID_FIELD, FieldValue::Value(JsonValue::String(id.clone())));
            self.records.insert(id.clone(), record);
            ids.push(id);
        }
        Ok(ids)
    }

    fn update(&mut self, batch: &[RecordUpdate]) -> Result<()> {
        // Reject the whole batch up front rather than applying half of it.
        for update in batch {
            if !self.records.contains_key(&update.id) {
                return Err(Error::Store {
                    operation: "update".to_string(),
                    message: format!("no record with id '{}'", update.id),
                });
            }
        }
        for update in batch {
            let applied = merge(&self.records[&update.id], &update.changes);
            self.records.insert(update.id.clone(), applied);
        }
        Ok(())
    }

    fn update_linked(&mut self, batch: &[RecordUpdate]) -> Result<()> {
        self.linked_log.extend(batch.iter().cloned());
        Ok(())
    }

    fn delete(&mut self, ids: &[RecordId]) -> Result<()> {
        for id in ids {
            if self.records.remove(id).is_none() {
                return Err(Error::Store {
                    operation: "delete".to_string(),
                    message: format!("no record with id '{}'", id),
                });
            }
        }
        Ok(())
    }
}

/// A record store backed by a JSON file holding an array of record objects.
///
/// Each object must carry a string `"id"` field. The file is read once on
/// load; [`JsonFileStore::save`] writes the current state back with a
/// trailing newline.
pub struct JsonFileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonFileStore {
    /// Load a store from a JSON records file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a JSON array of
    /// objects, or an entry lacks a string `"id"` field.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = fs::read_to_string(&path)?;
        let value: JsonValue = serde_json::from_str(&content)?;

        let entries = value.as_array().ok_or_else(|| Error::Record {
            message: format!("{}: expected a JSON array of records", path.display()),
        })?;

        let mut inner = MemoryStore::new();
        for entry in entries {
            let record = Record::from_json(entry)?;
            let id = match record.get(ID_FIELD) {
                Some(FieldValue::Value(JsonValue::String(id))) if !id.is_empty() => id.clone(),
                _ => {
                    return Err(Error::Record {
                        message: format!(
                            "{}: every record needs a non-empty string '{}' field",
                            path.display(),
                            ID_FIELD
                        ),
                    })
                }
            };
            inner.insert(id, record);
        }

        Ok(JsonFileStore { path, inner })
    }

    /// Write the current records back to the file as a pretty-printed array.
    pub fn save(&self) -> Result<()> {
        let mut entries = Vec::with_capacity(self.inner.records.len());
        for record in self.inner.records.values() {
            entries.push(record.to_json()?);
        }
        let mut serialized = serde_json::to_string_pretty(&JsonValue::Array(entries))?;
        if !serialized.ends_with('\n') {
            serialized.push('\n');
        }
        fs::write(&self.path, serialized)?;
        Ok(())
    }

    /// The file this store was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All loaded records, keyed by id.
    pub fn records(&self) -> &BTreeMap<RecordId, Record> {
        self.inner.records()
    }

    /// Cross-link updates received so far.
    pub fn linked_log(&self) -> &[RecordUpdate] {
        self.inner.linked_log()
    }
}

impl RecordStore for JsonFileStore {
    fn create(&mut self, records: Vec<Record>) -> Result<Vec<RecordId>> {
        self.inner.create(records)
    }

    fn update(&mut self, batch: &[RecordUpdate]) -> Result<()> {
        self.inner.update(batch)
    }

    fn update_linked(&mut self, batch: &[RecordUpdate]) -> Result<()> {
        self.inner.update_linked(batch)
    }

    fn delete(&mut self, ids: &[RecordId]) -> Result<()> {
        self.inner.delete(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(&value).unwrap()
    }

    mod memory_store_tests {
        use super::*;

        #[test]
        fn test_create_assigns_distinct_ids() {
            let mut store = MemoryStore::new();
            let ids = store
                .create(vec![record(json!({"name": "a"})), record(json!({"name": "b"}))])
                .unwrap();
            assert_eq!(ids.len(), 2);
            assert_ne!(ids[0], ids[1]);
            assert_eq!(
                store.records()[&ids[0]].get(ID_FIELD),
                Some(&FieldValue::from(ids[0].as_str()))
            );
        }

        #[test]
        fn test_create_keeps_provided_id() {
            let mut store = MemoryStore::new();
            let ids = store
                .create(vec![record(json!({"id": "m-1", "name": "a"}))])
                .unwrap();
            assert_eq!(ids, vec!["m-1".to_string()]);
        }

        #[test]
        fn test_update_merges_sparse_changes() {
            let mut store = MemoryStore::new();
            store.insert("A", record(json!({"name": "x", "room": "r1"})));
            store
                .update(&[RecordUpdate {
                    id: "A".to_string(),
                    changes: record(json!({"name": "y"})),
                }])
                .unwrap();
            assert_eq!(store.records()["A"], record(json!({"name": "y", "room": "r1"})));
        }

        #[test]
        fn test_update_unknown_id_fails_whole_batch() {
            let mut store = MemoryStore::new();
            store.insert("A", record(json!({"name": "x"})));
            let result = store.update(&[
                RecordUpdate {
                    id: "GONE".to_string(),
                    changes: record(json!({"name": "y"})),
                },
                RecordUpdate {
                    id: "A".to_string(),
                    changes: record(json!({"name": "y"})),
                },
            ]);
            assert!(result.is_err());
            // Nothing was applied.
            assert_eq!(store.records()["A"], record(json!({"name": "x"})));
        }

        #[test]
        fn test_linked_updates_are_logged() {
            let mut store = MemoryStore::new();
            store
                .update_linked(&[RecordUpdate {
                    id: "acct-1".to_string(),
                    changes: record(json!({"owner": "g2"})),
                }])
                .unwrap();
            assert_eq!(store.linked_log().len(), 1);
            assert_eq!(store.linked_log()[0].id, "acct-1");
        }

        #[test]
        fn test_delete_unknown_id_is_an_error() {
            let mut store = MemoryStore::new();
            assert!(store.delete(&["GONE".to_string()]).is_err());
        }
    }

    mod json_file_store_tests {
        use super::*;
        use tempfile::TempDir;

        fn write_records(dir: &TempDir, content: &str) -> PathBuf {
            let path = dir.path().join("records.json");
            fs::write(&path, content).unwrap();
            path
        }

        #[test]
        fn test_load_and_save_round_trip() {
            let dir = TempDir::new().unwrap();
            let path = write_records(
                &dir,
                r#"[{"id": "A", "name": "x"}, {"id": "B", "name": "y"}]"#,
            );

            let mut store = JsonFileStore::load(&path).unwrap();
            assert_eq!(store.records().len(), 2);

            store
                .update(&[RecordUpdate {
                    id: "A".to_string(),
                    changes: record(json!({"name": "z"})),
                }])
                .unwrap();
            store.save().unwrap();

            let content = fs::read_to_string(&path).unwrap();
            assert!(content.ends_with('\n'));
            let reloaded = JsonFileStore::load(&path).unwrap();
            assert_eq!(reloaded.records()["A"].get("name"), Some(&FieldValue::from("z")));
        }

        #[test]
        fn test_load_rejects_non_array() {
            let dir = TempDir::new().unwrap();
            let path = write_records(&dir, r#"{"id": "A"}"#);
            assert!(JsonFileStore::load(&path).is_err());
        }

        #[test]
        fn test_load_rejects_missing_id() {
            let dir = TempDir::new().unwrap();
            let path = write_records(&dir, r#"[{"name": "x"}]"#);
            assert!(JsonFileStore::load(&path).is_err());
        }
    }
}
