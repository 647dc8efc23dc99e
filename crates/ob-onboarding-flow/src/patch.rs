//! Patch Applier
//!
//! `apply(fields, path, value)` returns a new document with the node at
//! `path` replaced. Every object/array on the way down is copied; every
//! other node is cloned unchanged, so the input is never aliased or mutated.
//!
//! The applier never clears dependent fields when a gate flips off. A
//! follow-up that becomes inapplicable simply stops being visible.

use ob_onboarding_types::{FieldPath, PathSegment};
use serde_json::{Map, Value};

/// Replace the node at `path` (relative to `fields`) with `value`.
///
/// Missing intermediate objects are created. An index past the end of an
/// array appends, padding with `null`.
pub fn apply(fields: &Value, path: &FieldPath, value: Value) -> Value {
    set_at(fields, path.segments(), value)
}

static NULL: Value = Value::Null;

fn set_at(node: &Value, segments: &[PathSegment], value: Value) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return value;
    };

    match head {
        PathSegment::Key(key) => {
            let existing = node.as_object();
            let child = existing.and_then(|m| m.get(key)).unwrap_or(&NULL);
            let next = set_at(child, rest, value);

            let mut map: Map<String, Value> = existing
                .into_iter()
                .flatten()
                .filter(|(k, _)| *k != key)
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            map.insert(key.clone(), next);
            Value::Object(map)
        }
        PathSegment::Index(index) => {
            let mut items = match node {
                Value::Array(existing) => existing.clone(),
                _ => Vec::new(),
            };
            if items.len() <= *index {
                items.resize(*index + 1, Value::Null);
            }
            let next = set_at(&items[*index], rest, value);
            items[*index] = next;
            Value::Array(items)
        }
    }
}

/// Apply several `(path, value)` writes in order.
pub fn apply_all(fields: &Value, writes: impl IntoIterator<Item = (FieldPath, Value)>) -> Value {
    writes
        .into_iter()
        .fold(fields.clone(), |doc, (path, value)| apply(&doc, &path, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_apply_replaces_only_addressed_subtree() {
        let fields = json!({
            "orderBasics": {
                "custodian": {"pershing": false, "other": false},
                "custodianOther": "Old Trust Co",
                "nameOfProduct": "Fund IV"
            },
            "accountRegistration": {"rrName": "Jane"}
        });

        let next = apply(
            &fields,
            &FieldPath::parse("orderBasics.custodian"),
            json!({"pershing": true, "other": false}),
        );

        assert_eq!(next["orderBasics"]["custodian"]["pershing"], true);
        assert_eq!(next["orderBasics"]["custodianOther"], "Old Trust Co");
        assert_eq!(next["orderBasics"]["nameOfProduct"], "Fund IV");
        assert_eq!(next["accountRegistration"], fields["accountRegistration"]);
        // input untouched
        assert_eq!(fields["orderBasics"]["custodian"]["pershing"], false);
    }

    #[test]
    fn test_apply_into_array_and_missing_parents() {
        let fields = json!({"gifts": [{"state": "CA"}]});
        let next = apply(&fields, &FieldPath::parse("gifts.1.state"), json!("NY"));
        assert_eq!(next, json!({"gifts": [{"state": "CA"}, {"state": "NY"}]}));

        let next = apply(&json!({}), &FieldPath::parse("a.b"), json!(1));
        assert_eq!(next, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_root_path_replaces_document() {
        assert_eq!(
            apply(&json!({"x": 1}), &FieldPath::root(), json!({"y": 2})),
            json!({"y": 2})
        );
    }

    #[test]
    fn test_apply_all_is_sequential() {
        let next = apply_all(
            &json!({"a": 1}),
            [
                (FieldPath::parse("a"), json!(2)),
                (FieldPath::parse("b"), json!(3)),
            ],
        );
        assert_eq!(next, json!({"a": 2, "b": 3}));
    }

    fn arb_value() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-z]{0,8}".prop_map(Value::String),
        ];
        leaf.prop_recursive(2, 8, 4, |inner| {
            prop::collection::btree_map("[a-zA-Z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect()))
        })
    }

    proptest! {
        #[test]
        fn apply_leaves_siblings_untouched(
            siblings in prop::collection::btree_map("[a-z]{1,5}", any::<i64>(), 1..8),
            target in "[a-z]{1,5}",
            value in arb_value(),
        ) {
            let doc = json!({
                "block": siblings.iter().map(|(k, v)| (k.clone(), json!(v))).collect::<Map<_, _>>()
            });
            let next = apply(&doc, &FieldPath::parse("block").key(&target), value.clone());

            prop_assert_eq!(&next["block"][target.as_str()], &value);
            for (key, original) in &siblings {
                if *key != target {
                    prop_assert_eq!(&next["block"][key.as_str()], &json!(original));
                }
            }
        }
    }
}
