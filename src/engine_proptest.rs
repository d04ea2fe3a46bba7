//! Property-based tests for the diff/merge/collapse engine.
//!
//! These tests use proptest to generate random nested records and verify
//! that the engine's algebraic laws hold for all inputs, not just the
//! hand-picked cases in the unit tests.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;
    use serde_json::Value as JsonValue;

    use crate::collapse::collapse;
    use crate::patch::{diff, merge};
    use crate::planner::plan_updates;
    use crate::ports::PlainSchema;
    use crate::record::{FieldValue, Record, RecordId};

    fn arb_scalar() -> impl Strategy<Value = JsonValue> {
        prop_oneof![
            Just(JsonValue::Null),
            any::<bool>().prop_map(JsonValue::Bool),
            any::<i32>().prop_map(|n| JsonValue::Number(i64::from(n).into())),
            "[a-z]{0,6}".prop_map(JsonValue::String),
            prop::collection::vec(
                any::<i32>().prop_map(|n| JsonValue::Number(i64::from(n).into())),
                0..4
            )
            .prop_map(JsonValue::Array),
        ]
    }

    fn arb_field_value() -> impl Strategy<Value = FieldValue> {
        arb_scalar()
            .prop_map(FieldValue::Value)
            .prop_recursive(3, 24, 4, |inner| {
                prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
                    .prop_map(|fields| FieldValue::Record(Record::from(fields)))
            })
    }

    fn arb_record() -> impl Strategy<Value = Record> {
        prop::collection::btree_map("[a-z]{1,4}", arb_field_value(), 0..5).prop_map(Record::from)
    }

    // ============================================================================
    // diff / merge law tests
    // ============================================================================

    proptest! {
        /// Law: diff(x, x) = {} for all records.
        #[test]
        fn diff_of_record_with_itself_is_empty(record in arb_record()) {
            prop_assert!(diff(&record, &record).is_empty());
        }

        /// Law: merging an empty patch changes nothing.
        #[test]
        fn merge_with_empty_patch_is_identity(record in arb_record()) {
            prop_assert_eq!(merge(&record, &Record::new()), record);
        }

        /// Law: merge(base, diff(base, changed)) = changed for compatible
        /// pairs. Compatibility is guaranteed by deriving `changed` from
        /// `base` via merge, which can only keep or extend the key set.
        #[test]
        fn merge_of_own_diff_reconstructs_changed(
            base in arb_record(),
            patch in arb_record(),
        ) {
            let changed = merge(&base, &patch);
            prop_assert_eq!(merge(&base, &diff(&base, &changed)), changed);
        }

        /// A diff never invents fields: every top-level patch key comes from
        /// `changed`.
        #[test]
        fn diff_keys_come_from_changed(base in arb_record(), changed in arb_record()) {
            let patch = diff(&base, &changed);
            for key in patch.keys() {
                prop_assert!(changed.contains_key(key));
            }
        }
    }

    // ============================================================================
    // collapse property tests
    // ============================================================================

    proptest! {
        /// Collapsing a single record yields it unchanged, nothing tagged.
        #[test]
        fn collapse_of_single_record_is_identity(record in arb_record()) {
            let collapsed = collapse([&record]);
            prop_assert_eq!(&collapsed, &record);
            prop_assert!(!collapsed.contains_differs());
        }

        /// Folding any permutation of the same selection yields the same
        /// baseline.
        #[test]
        fn collapse_is_permutation_invariant(
            (records, shuffled) in prop::collection::vec(arb_record(), 1..5)
                .prop_flat_map(|records| {
                    (Just(records.clone()), Just(records).prop_shuffle())
                })
        ) {
            prop_assert_eq!(collapse(records.iter()), collapse(shuffled.iter()));
        }

        /// The collapsed key set is the union of all folded key sets.
        #[test]
        fn collapse_key_set_is_union(records in prop::collection::vec(arb_record(), 1..5)) {
            let collapsed = collapse(records.iter());
            for record in &records {
                for key in record.keys() {
                    prop_assert!(collapsed.contains_key(key));
                }
            }
        }

        /// Collapsing a record with itself never tags anything.
        #[test]
        fn collapse_of_identical_records_tags_nothing(record in arb_record()) {
            let collapsed = collapse([&record, &record, &record]);
            prop_assert_eq!(&collapsed, &record);
            prop_assert!(!collapsed.contains_differs());
        }
    }

    // ============================================================================
    // update planner property tests
    // ============================================================================

    proptest! {
        /// For every selected record, applying the planner's emitted changes
        /// (none, for omitted records) reproduces exactly the effect of the
        /// user's patch on that record. In particular the planner never emits
        /// an entry whose application would be a no-op.
        #[test]
        fn planned_changes_reproduce_the_edit_intent(
            records in prop::collection::vec(arb_record(), 1..4),
            patch in arb_record(),
        ) {
            let originals: BTreeMap<RecordId, Record> = records
                .iter()
                .enumerate()
                .map(|(i, record)| (format!("r{}", i), record.clone()))
                .collect();
            let selection: Vec<RecordId> = originals.keys().cloned().collect();

            let baseline = collapse(originals.values());
            let edited = merge(&baseline, &patch);

            let schema = PlainSchema::new("records");
            let plan = plan_updates(&baseline, &edited, &selection, &originals, &schema).unwrap();

            let driving_patch = diff(&baseline, &edited);
            let mut emitted: BTreeMap<&str, &Record> = BTreeMap::new();
            for update in &plan.updates {
                prop_assert!(!update.changes.is_empty());
                prop_assert!(!update.changes.contains_differs());
                emitted.insert(update.id.as_str(), &update.changes);
            }

            for id in &selection {
                let original = &originals[id];
                let intended = merge(original, &driving_patch);
                match emitted.get(id.as_str()) {
                    Some(changes) => {
                        prop_assert_eq!(merge(original, changes), intended);
                    }
                    None => {
                        // Omitted records already match the intent exactly.
                        prop_assert_eq!(&intended, original);
                    }
                }
            }
        }
    }
}
