//! Nested merging of JSON maps.
//!
//! Two callers need it with different list semantics: source options stack
//! defaults under per-source values (lists concatenate), while entries merge
//! contributions from several sources (lists union).

use serde_json::{Map, Value};

/// How two lists under the same key are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListMerge {
    /// Keep every item of the base, then every item of the overlay.
    Concat,
    /// Keep the base, then append overlay items not already present.
    Union,
}

/// Merge `overlay` into `base` in place.
///
/// Objects merge recursively, lists follow `lists`, anything else is
/// overwritten by the overlay value.
pub fn merge_maps(base: &mut Map<String, Value>, overlay: &Map<String, Value>, lists: ListMerge) {
    for (key, incoming) in overlay {
        match base.get_mut(key) {
            Some(existing) => merge_value(existing, incoming, lists),
            None => {
                base.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value, lists: ListMerge) {
    match (existing, incoming) {
        (Value::Object(base), Value::Object(overlay)) => merge_maps(base, overlay, lists),
        (Value::Array(base), Value::Array(overlay)) => match lists {
            ListMerge::Concat => base.extend(overlay.iter().cloned()),
            ListMerge::Union => {
                for item in overlay {
                    if !base.contains(item) {
                        base.push(item.clone());
                    }
                }
            }
        },
        (slot, value) => *slot = value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn scalars_are_overwritten() {
        let mut base = obj(json!({"a": 1, "b": "x"}));
        merge_maps(&mut base, &obj(json!({"a": 2})), ListMerge::Union);
        assert_eq!(Value::Object(base), json!({"a": 2, "b": "x"}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let mut base = obj(json!({"categories": {"CLI": "cli-"}}));
        let overlay = obj(json!({"categories": {"GUI": "gui-"}}));
        merge_maps(&mut base, &overlay, ListMerge::Concat);
        assert_eq!(
            Value::Object(base),
            json!({"categories": {"CLI": "cli-", "GUI": "gui-"}})
        );
    }

    #[test]
    fn concat_keeps_duplicates_and_union_drops_them() {
        let overlay = obj(json!({"exclude": ["b", "c"]}));

        let mut concat = obj(json!({"exclude": ["a", "b"]}));
        merge_maps(&mut concat, &overlay, ListMerge::Concat);
        assert_eq!(concat["exclude"], json!(["a", "b", "b", "c"]));

        let mut union = obj(json!({"exclude": ["a", "b"]}));
        merge_maps(&mut union, &overlay, ListMerge::Union);
        assert_eq!(union["exclude"], json!(["a", "b", "c"]));
    }

    #[test]
    fn mismatched_shapes_take_the_overlay() {
        let mut base = obj(json!({"tags": ["a"]}));
        merge_maps(&mut base, &obj(json!({"tags": "b"})), ListMerge::Union);
        assert_eq!(base["tags"], json!("b"));
    }
}
