//! Dotted-path access into JSON documents (`education.2.document`).
//!
//! Numeric segments index into arrays; everything else is an object key.

use serde_json::{Map, Value};

use super::StoreError;

/// Resolves `path` inside `doc`. Returns `None` when any segment is missing.
pub fn lookup_path<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(doc);
    }
    path.split('.').try_fold(doc, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Mutable counterpart of `lookup_path`, creating intermediate objects and
/// padding arrays with `null` the way a `$set` does.
pub fn entry_path<'a>(doc: &'a mut Value, path: &str) -> Result<&'a mut Value, StoreError> {
    if path.is_empty() {
        return Err(StoreError::InvalidUpdate("empty field path".to_string()));
    }

    let mut current = doc;
    for segment in path.split('.') {
        if segment.is_empty() {
            return Err(StoreError::InvalidUpdate(format!(
                "field path '{path}' contains an empty segment"
            )));
        }
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.to_string()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = segment.parse::<usize>().map_err(|_| {
                    StoreError::InvalidUpdate(format!(
                        "cannot use non-numeric segment '{segment}' of '{path}' on an array"
                    ))
                })?;
                if index >= items.len() {
                    items.resize(index + 1, Value::Null);
                }
                &mut items[index]
            }
            _ => {
                return Err(StoreError::InvalidUpdate(format!(
                    "cannot create field '{segment}' of '{path}' inside a scalar value"
                )))
            }
        };
    }
    Ok(current)
}

/// Writes `value` at `path`. Returns whether the stored value changed.
pub fn set_path(doc: &mut Value, path: &str, value: Value) -> Result<bool, StoreError> {
    let slot = entry_path(doc, path)?;
    if *slot == value {
        return Ok(false);
    }
    *slot = value;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_array_index() {
        let doc = json!({"education": [{"institute": "A"}, {"institute": "B"}]});
        assert_eq!(lookup_path(&doc, "education.1.institute"), Some(&json!("B")));
        assert_eq!(lookup_path(&doc, "education.5"), None);
        assert_eq!(lookup_path(&doc, "education.x"), None);
    }

    #[test]
    fn test_set_creates_intermediate_objects() {
        let mut doc = json!({});
        assert!(set_path(&mut doc, "basicDetails.firstName", json!("Asha")).unwrap());
        assert_eq!(doc, json!({"basicDetails": {"firstName": "Asha"}}));
    }

    #[test]
    fn test_set_same_value_reports_unchanged() {
        let mut doc = json!({"about": "hi"});
        assert!(!set_path(&mut doc, "about", json!("hi")).unwrap());
    }

    #[test]
    fn test_set_array_index_touches_only_that_field() {
        let mut doc = json!({"work": [{"company": "X", "certificate": "a.pdf"}]});
        set_path(&mut doc, "work.0.certificate", Value::Null).unwrap();
        assert_eq!(doc, json!({"work": [{"company": "X", "certificate": null}]}));
    }

    #[test]
    fn test_set_through_scalar_is_rejected() {
        let mut doc = json!({"about": "text"});
        assert!(set_path(&mut doc, "about.more", json!(1)).is_err());
    }

    #[test]
    fn test_non_numeric_segment_on_array_is_rejected() {
        let mut doc = json!({"skills": []});
        assert!(set_path(&mut doc, "skills.name", json!("rust")).is_err());
    }
}
