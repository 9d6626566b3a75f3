//! Nested-map lookup over JSON values.

use serde_json::Value;

use crate::error::{MemokitError, Result};

/// Walk `map` one key at a time and return the value at the end of `path`.
///
/// An empty `path` returns `map` itself.
///
/// # Errors
/// Returns [`MemokitError::MissingKey`] naming the first key that could not be
/// resolved: either it is absent, or the value reached so far is not a JSON
/// object.
///
/// ```
/// use memokit_core::access_nested_map;
/// use serde_json::json;
///
/// let map = json!({"a": {"b": 2}});
/// assert_eq!(access_nested_map(&map, &["a", "b"]).expect("path resolves"), &json!(2));
/// assert!(access_nested_map(&map, &["a", "c"]).is_err());
/// ```
pub fn access_nested_map<'a, K>(map: &'a Value, path: &[K]) -> Result<&'a Value>
where
    K: AsRef<str>,
{
    path.iter().try_fold(map, |current, key| {
        let key = key.as_ref();
        current
            .as_object()
            .and_then(|object| object.get(key))
            .ok_or_else(|| MemokitError::MissingKey { key: key.to_string() })
    })
}

/// Split a dotted path such as `"a.b.c"` into its keys.
///
/// # Errors
/// Returns [`MemokitError::InvalidPath`] if the path is empty or has an empty
/// segment (`"a..b"`, `".a"`, `"a."`).
pub fn parse_path(path: &str) -> Result<Vec<String>> {
    if path.is_empty() {
        return Err(MemokitError::InvalidPath("path is empty".into()));
    }
    path.split('.')
        .map(|segment| {
            if segment.is_empty() {
                Err(MemokitError::InvalidPath(format!("empty segment in '{path}'")))
            } else {
                Ok(segment.to_string())
            }
        })
        .collect()
}
