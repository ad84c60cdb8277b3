//! Default/override merging for event data and tags.
//!
//! Data is merged recursively: nested objects merge key by key, every other
//! value (arrays included) replaces the default wholesale. Tag lists are
//! concatenated and deduplicated by the caller; generic merge never touches
//! them.

use serde_json::Value;

use crate::record::{DataMap, TagMap};

/// How a `null` leaf in the override map is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NullPolicy {
    /// A `null` override leaves the default value in place.
    #[default]
    Keep,
    /// A `null` override replaces the default value.
    Override,
}

/// Merge `overrides` on top of `base`, returning a new map.
pub fn merge_data(base: &DataMap, overrides: &DataMap, nulls: NullPolicy) -> DataMap {
    let mut merged = base.clone();
    merge_into(&mut merged, overrides, nulls);
    merged
}

/// Merge call-site data onto a default map.
///
/// An explicit null payload (`None`) stays null; the defaults are not applied.
pub fn apply_to_defaults(
    defaults: &DataMap,
    overrides: Option<&DataMap>,
    nulls: NullPolicy,
) -> Option<DataMap> {
    overrides.map(|overrides| merge_data(defaults, overrides, nulls))
}

fn merge_into(target: &mut DataMap, source: &DataMap, nulls: NullPolicy) {
    for (key, value) in source {
        match value {
            Value::Object(nested) => match target.get_mut(key) {
                Some(Value::Object(existing)) => merge_into(existing, nested, nulls),
                _ => {
                    target.insert(key.clone(), value.clone());
                }
            },
            Value::Null => {
                if nulls == NullPolicy::Override {
                    target.insert(key.clone(), Value::Null);
                }
            }
            _ => {
                target.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Deduplicate tags, keeping the first occurrence of each.
pub fn unique_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(Into::into)
        .filter(|tag| seen.insert(tag.clone()))
        .collect()
}

/// Deduplicate tags and drop empty strings.
pub fn sanitize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    unique_tags(tags)
        .into_iter()
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Build the `{tag: true}` presence map.
pub fn tag_map(tags: &[String]) -> TagMap {
    tags.iter().map(|tag| (tag.clone(), true)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> DataMap {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn nested_leaves_merge_with_override_winning() {
        let base = map(json!({"a": {"b": {"c": "d", "x": "y"}}}));
        let overrides = map(json!({"a": {"b": {"c": "e", "e": "f"}}}));

        let merged = merge_data(&base, &overrides, NullPolicy::Keep);
        assert_eq!(
            Value::Object(merged),
            json!({"a": {"b": {"c": "e", "e": "f", "x": "y"}}})
        );
    }

    #[test]
    fn arrays_replace_instead_of_concatenating() {
        let base = map(json!({"list": [1, 2, 3], "keep": true}));
        let overrides = map(json!({"list": [4]}));

        let merged = merge_data(&base, &overrides, NullPolicy::Keep);
        assert_eq!(Value::Object(merged), json!({"list": [4], "keep": true}));
    }

    #[test]
    fn scalars_and_objects_replace_each_other() {
        let base = map(json!({"a": "scalar", "b": {"nested": 1}}));
        let overrides = map(json!({"a": {"now": "object"}, "b": 2}));

        let merged = merge_data(&base, &overrides, NullPolicy::Keep);
        assert_eq!(
            Value::Object(merged),
            json!({"a": {"now": "object"}, "b": 2})
        );
    }

    #[test]
    fn null_policy_controls_null_leaves() {
        let base = map(json!({"a": "b", "n": {"x": 1}}));
        let overrides = map(json!({"a": null, "n": {"x": null}}));

        let kept = merge_data(&base, &overrides, NullPolicy::Keep);
        assert_eq!(Value::Object(kept), json!({"a": "b", "n": {"x": 1}}));

        let replaced = merge_data(&base, &overrides, NullPolicy::Override);
        assert_eq!(Value::Object(replaced), json!({"a": null, "n": {"x": null}}));
    }

    #[test]
    fn empty_override_reproduces_base() {
        let base = map(json!({"a": {"b": 1}, "c": [1]}));
        assert_eq!(merge_data(&base, &DataMap::new(), NullPolicy::Keep), base);
    }

    #[test]
    fn explicit_null_payload_stays_null() {
        let defaults = map(json!({"a": "b"}));
        assert_eq!(apply_to_defaults(&defaults, None, NullPolicy::Override), None);

        let merged = apply_to_defaults(&defaults, Some(&map(json!({"c": "d"}))), NullPolicy::Override);
        assert_eq!(merged, Some(map(json!({"a": "b", "c": "d"}))));
    }

    #[test]
    fn tags_are_deduplicated_in_first_occurrence_order() {
        assert_eq!(unique_tags(["b", "a", "b", "", "a", ""]), vec!["b", "a", ""]);
        assert_eq!(sanitize_tags(["a", "a", ""]), vec!["a"]);
        assert!(sanitize_tags(Vec::<String>::new()).is_empty());
    }

    #[test]
    fn tag_map_marks_every_tag_present() {
        let tags = vec!["x".to_string(), "y".to_string()];
        let presence = tag_map(&tags);
        assert_eq!(presence.len(), 2);
        assert_eq!(presence.get("x"), Some(&true));
        assert_eq!(presence.get("y"), Some(&true));
    }
}
