//! Collapsing a multi-record selection into one editable baseline
//!
//! When the user selects several records and opens the edit form, the form
//! must show a single record. [`collapse`] folds the whole selection into one
//! accumulator: fields on which every selected record agrees keep their
//! value, fields on which any two records disagree are tagged
//! [`FieldValue::Differs`]. Tagging is per leaf field, so two meetings that
//! agree on `webex.enabled` but not `webex.url` collapse to a nested record
//! with only `url` tagged.
//!
//! The fold is order-independent: any permutation of the same selection
//! yields the same baseline. The result's key set is the union of all folded
//! records' key sets; a field only some records carry keeps the value of the
//! records that carry it.

use crate::record::{FieldValue, Record};

/// Fold one record into a running accumulator.
///
/// Rules, per key of `record`:
/// - absent from the accumulator: deep-copied in;
/// - already tagged differs: stays differs (sticky);
/// - nested record on both sides: recurse, tagging per leaf;
/// - unequal values (deep equality, arrays atomic): tagged differs;
/// - equal values: unchanged.
pub fn collapse_into(acc: &mut Record, record: &Record) {
    for (key, value) in record.iter() {
        // Nested-on-both-sides recurses in place; everything else decides a
        // replacement value first to keep the borrow local.
        if let (Some(FieldValue::Record(acc_nested)), FieldValue::Record(nested)) =
            (acc.get_mut(key), value)
        {
            collapse_into(acc_nested, nested);
            continue;
        }

        let next = match acc.get(key) {
            None => Some(value.clone()),
            Some(FieldValue::Differs) => None,
            Some(existing) if existing == value => None,
            Some(_) => Some(FieldValue::Differs),
        };
        if let Some(next) = next {
            acc.insert(key.clone(), next);
        }
    }
}

/// Collapse a selection of records into a single baseline record.
///
/// An empty selection collapses to an empty record; a single record collapses
/// to itself with nothing tagged.
pub fn collapse<'a, I>(records: I) -> Record
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut acc = Record::new();
    for record in records {
        collapse_into(&mut acc, record);
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: serde_json::Value) -> Record {
        Record::from_json(&value).unwrap()
    }

    #[test]
    fn test_single_record_collapses_to_itself() {
        let a = record(json!({"name": "x", "webex": {"url": "u"}, "days": [1, 2]}));
        let collapsed = collapse([&a]);
        assert_eq!(collapsed, a);
        assert!(!collapsed.contains_differs());
    }

    #[test]
    fn test_agreeing_fields_keep_value() {
        let a = record(json!({"name": "x", "room": "r1"}));
        let b = record(json!({"name": "y", "room": "r1"}));
        let collapsed = collapse([&a, &b]);
        assert_eq!(collapsed.get("room"), Some(&FieldValue::from("r1")));
        assert_eq!(collapsed.get("name"), Some(&FieldValue::Differs));
    }

    #[test]
    fn test_nested_tagging_is_per_leaf() {
        let a = record(json!({"webex": {"url": "a", "enabled": true}}));
        let b = record(json!({"webex": {"url": "b", "enabled": true}}));
        let collapsed = collapse([&a, &b]);
        match collapsed.get("webex") {
            Some(FieldValue::Record(nested)) => {
                assert_eq!(nested.get("url"), Some(&FieldValue::Differs));
                assert_eq!(nested.get("enabled"), Some(&FieldValue::from(true)));
            }
            other => panic!("expected nested record, got {:?}", other),
        }
    }

    #[test]
    fn test_differs_is_sticky() {
        let a = record(json!({"name": "x"}));
        let b = record(json!({"name": "y"}));
        let c = record(json!({"name": "x"}));
        let collapsed = collapse([&a, &b, &c]);
        assert_eq!(collapsed.get("name"), Some(&FieldValue::Differs));
    }

    #[test]
    fn test_key_set_is_union() {
        let a = record(json!({"name": "x"}));
        let b = record(json!({"room": "r1"}));
        let collapsed = collapse([&a, &b]);
        assert_eq!(collapsed.get("name"), Some(&FieldValue::from("x")));
        assert_eq!(collapsed.get("room"), Some(&FieldValue::from("r1")));
    }

    #[test]
    fn test_type_mismatch_tags_differs() {
        // One record holds a sub-record, the other a scalar at the same key.
        let a = record(json!({"webex": {"url": "a"}}));
        let b = record(json!({"webex": null}));
        assert_eq!(collapse([&a, &b]).get("webex"), Some(&FieldValue::Differs));
        assert_eq!(collapse([&b, &a]).get("webex"), Some(&FieldValue::Differs));
    }

    #[test]
    fn test_arrays_compared_atomically() {
        let a = record(json!({"days": [1, 2]}));
        let b = record(json!({"days": [1, 2]}));
        let c = record(json!({"days": [2, 1]}));
        assert_eq!(collapse([&a, &b]).get("days"), Some(&FieldValue::Value(json!([1, 2]))));
        assert_eq!(collapse([&a, &c]).get("days"), Some(&FieldValue::Differs));
    }

    #[test]
    fn test_order_independence_three_records() {
        let a = record(json!({"name": "x", "room": "r1", "webex": {"url": "a", "pin": 1}}));
        let b = record(json!({"name": "y", "room": "r1", "webex": {"url": "b", "pin": 1}}));
        let c = record(json!({"name": "x", "room": "r1"}));

        let expected = collapse([&a, &b, &c]);
        assert_eq!(collapse([&a, &c, &b]), expected);
        assert_eq!(collapse([&b, &a, &c]), expected);
        assert_eq!(collapse([&b, &c, &a]), expected);
        assert_eq!(collapse([&c, &a, &b]), expected);
        assert_eq!(collapse([&c, &b, &a]), expected);
    }

    #[test]
    fn test_empty_selection_is_empty_record() {
        let collapsed = collapse(std::iter::empty::<&Record>());
        assert!(collapsed.is_empty());
    }
}
