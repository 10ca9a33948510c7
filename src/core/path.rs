//! Dot-path addressing over nested JSON values
//!
//! A path such as `user.emails.0` descends through objects by key and
//! through arrays by numeric index. The empty path addresses the root; an
//! empty segment inside a path (`a.` or `a..b`) never matches anything.

use serde_json::{Map, Value};

/// Look up the value at `path`
///
/// Returns `None` when any segment is missing. An explicit `null` stored at
/// the path is returned as `Some(&Value::Null)`.
pub fn get<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(root);
    }
    descend(root, path)
}

fn descend<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(root, |current, segment| match current {
        _ if segment.is_empty() => None,
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Look up the value at `path` inside an input map
pub fn get_in<'a>(map: &'a Map<String, Value>, path: &str) -> Option<&'a Value> {
    let (head, rest) = split_first(path);
    if head.is_empty() {
        return None;
    }
    let value = map.get(head)?;
    match rest {
        Some(rest) => descend(value, rest),
        None => Some(value),
    }
}

/// Look up `path`, falling back to `default` (or `null`) when absent
pub fn get_or(root: &Value, path: &str, default: Option<Value>) -> Value {
    match get(root, path) {
        Some(value) => value.clone(),
        None => default.unwrap_or(Value::Null),
    }
}

/// Write `value` at `path`
///
/// Missing intermediate segments, or segments holding a scalar, are
/// replaced by empty objects. An array index past the end of an array is
/// left untouched.
pub fn set(root: &mut Value, path: &str, value: Value) {
    if path.is_empty() {
        *root = value;
        return;
    }
    if has_empty_segment(path) {
        return;
    }

    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let last = segments.peek().is_none();

        current = match current {
            Value::Array(items) => {
                let Some(slot) = segment.parse::<usize>().ok().and_then(|i| items.get_mut(i))
                else {
                    return;
                };
                if last {
                    *slot = value;
                    return;
                }
                slot
            }
            node => {
                if !node.is_object() {
                    *node = Value::Object(Map::new());
                }
                let Value::Object(map) = node else {
                    return;
                };
                if last {
                    map.insert(segment.to_string(), value);
                    return;
                }
                map.entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()))
            }
        };
    }
}

/// Write `value` at `path` inside an input map
pub fn set_in(map: &mut Map<String, Value>, path: &str, value: Value) {
    if has_empty_segment(path) {
        return;
    }
    let (head, rest) = split_first(path);
    match rest {
        Some(rest) => {
            let slot = map
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            set(slot, rest, value);
        }
        None => {
            map.insert(head.to_string(), value);
        }
    }
}

fn has_empty_segment(path: &str) -> bool {
    path.split('.').any(str::is_empty)
}

fn split_first(path: &str) -> (&str, Option<&str>) {
    match path.split_once('.') {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_top_level() {
        let data = json!({"name": "alice"});
        assert_eq!(get(&data, "name"), Some(&json!("alice")));
    }

    #[test]
    fn test_get_nested_object() {
        let data = json!({"user": {"email": "a@b.com"}});
        assert_eq!(get(&data, "user.email"), Some(&json!("a@b.com")));
    }

    #[test]
    fn test_get_array_index() {
        let data = json!({"tags": ["a", "b"]});
        assert_eq!(get(&data, "tags.1"), Some(&json!("b")));
        assert_eq!(get(&data, "tags.2"), None);
        assert_eq!(get(&data, "tags.x"), None);
    }

    #[test]
    fn test_get_missing_is_distinct_from_null() {
        let data = json!({"a": null});
        assert_eq!(get(&data, "a"), Some(&Value::Null));
        assert_eq!(get(&data, "b"), None);
        assert_eq!(get(&data, "a.b"), None);
    }

    #[test]
    fn test_empty_segment_is_missing() {
        let data = json!({"a": {"b": 1}});
        assert_eq!(get(&data, "a."), None);
        assert_eq!(get(&data, "a..b"), None);
        assert_eq!(get(&data, ".a"), None);

        let map = data.as_object().cloned().expect("object");
        assert_eq!(get_in(&map, "a."), None);
        assert_eq!(get_in(&map, "a..b"), None);
        assert_eq!(get_in(&map, ".a"), None);
    }

    #[test]
    fn test_set_with_empty_segment_is_noop() {
        let mut data = json!({"a": {"b": 1}});
        set(&mut data, "a.", json!("x"));
        set(&mut data, "a..b", json!("x"));
        assert_eq!(data, json!({"a": {"b": 1}}));

        let mut map = data.as_object().cloned().expect("object");
        set_in(&mut map, "a.", json!("x"));
        set_in(&mut map, "", json!("x"));
        assert_eq!(Value::Object(map), json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_get_empty_path_is_root() {
        let data = json!({"a": 1});
        assert_eq!(get(&data, ""), Some(&data));
    }

    #[test]
    fn test_get_or_uses_default() {
        let data = json!({"a": 1});
        assert_eq!(get_or(&data, "b", Some(json!("fallback"))), json!("fallback"));
        assert_eq!(get_or(&data, "b", None), Value::Null);
        assert_eq!(get_or(&data, "a", Some(json!(0))), json!(1));
    }

    #[test]
    fn test_set_overwrites_nested() {
        let mut data = json!({"user": {"email": "x", "name": "n"}});
        set(&mut data, "user.email", json!("y"));
        assert_eq!(data, json!({"user": {"email": "y", "name": "n"}}));
    }

    #[test]
    fn test_set_into_array_slot() {
        let mut data = json!({"items": [{"sku": "a"}, {"sku": "b"}]});
        set(&mut data, "items.1.sku", json!("B"));
        assert_eq!(data, json!({"items": [{"sku": "a"}, {"sku": "B"}]}));
    }

    #[test]
    fn test_set_out_of_range_index_is_ignored() {
        let mut data = json!({"items": ["a"]});
        set(&mut data, "items.5", json!("z"));
        assert_eq!(data, json!({"items": ["a"]}));
    }

    #[test]
    fn test_set_creates_missing_intermediate() {
        let mut data = json!({});
        set(&mut data, "a.b", json!(1));
        assert_eq!(data, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_map_helpers() {
        let mut map = json!({"user": {"email": " X "}, "plain": 1})
            .as_object()
            .cloned()
            .expect("object");
        assert_eq!(get_in(&map, "user.email"), Some(&json!(" X ")));
        assert_eq!(get_in(&map, "plain"), Some(&json!(1)));
        assert_eq!(get_in(&map, "missing"), None);

        set_in(&mut map, "user.email", json!("X"));
        set_in(&mut map, "plain", json!(2));
        assert_eq!(
            Value::Object(map),
            json!({"user": {"email": "X"}, "plain": 2})
        );
    }
}
