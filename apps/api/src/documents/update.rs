//! MongoDB-style update documents: `$set` and `$push`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::path::{entry_path, set_path};
use super::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct UpdateDocument {
    #[serde(rename = "$set", default, skip_serializing_if = "Map::is_empty")]
    pub set: Map<String, Value>,

    #[serde(rename = "$push", default, skip_serializing_if = "Map::is_empty")]
    pub push: Map<String, Value>,
}

impl UpdateDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: Value) -> Self {
        self.set.insert(path.into(), value);
        self
    }

    pub fn push(mut self, path: impl Into<String>, value: Value) -> Self {
        self.push.insert(path.into(), value);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty() && self.push.is_empty()
    }

    /// Applies the update to `doc` in place. Returns whether anything changed.
    ///
    /// On error `doc` may be partially updated; callers apply to a copy.
    pub fn apply(&self, doc: &mut Value) -> Result<bool, StoreError> {
        if self.is_empty() {
            return Err(StoreError::InvalidUpdate(
                "update document has no operators".to_string(),
            ));
        }

        let mut modified = false;
        for (path, value) in &self.set {
            modified |= set_path(doc, path, value.clone())?;
        }

        for (path, value) in &self.push {
            let slot = entry_path(doc, path)?;
            if slot.is_null() {
                *slot = Value::Array(Vec::new());
            }
            let items = slot.as_array_mut().ok_or_else(|| {
                StoreError::InvalidUpdate(format!("cannot $push to non-array field '{path}'"))
            })?;
            match value.get("$each").and_then(Value::as_array) {
                Some(each) => {
                    modified |= !each.is_empty();
                    items.extend(each.iter().cloned());
                }
                None => {
                    items.push(value.clone());
                    modified = true;
                }
            }
        }

        Ok(modified)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_format_uses_dollar_operators() {
        let update = UpdateDocument::new()
            .set("about", json!("hello"))
            .push("skills", json!({"id": "s1"}));
        let wire = serde_json::to_value(&update).unwrap();
        assert_eq!(
            wire,
            json!({"$set": {"about": "hello"}, "$push": {"skills": {"id": "s1"}}})
        );
    }

    #[test]
    fn test_empty_operators_are_omitted_on_the_wire() {
        let wire = serde_json::to_value(UpdateDocument::new().set("a", json!(1))).unwrap();
        assert!(wire.get("$push").is_none());
    }

    #[test]
    fn test_push_creates_missing_array() {
        let mut doc = json!({"_id": "u1"});
        UpdateDocument::new()
            .push("education", json!({"institute": "A"}))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["education"], json!([{"institute": "A"}]));
    }

    #[test]
    fn test_push_appends_at_end() {
        let mut doc = json!({"education": [1, 2]});
        UpdateDocument::new()
            .push("education", json!(3))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["education"], json!([1, 2, 3]));
    }

    #[test]
    fn test_push_each_extends() {
        let mut doc = json!({"skills": ["a"]});
        UpdateDocument::new()
            .push("skills", json!({"$each": ["b", "c"]}))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["skills"], json!(["a", "b", "c"]));
    }

    #[test]
    fn test_push_onto_scalar_fails() {
        let mut doc = json!({"about": "text"});
        let result = UpdateDocument::new().push("about", json!(1)).apply(&mut doc);
        assert!(matches!(result, Err(StoreError::InvalidUpdate(_))));
    }

    #[test]
    fn test_empty_update_is_invalid() {
        let mut doc = json!({});
        assert!(UpdateDocument::new().apply(&mut doc).is_err());
    }
}
