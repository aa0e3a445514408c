use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::path::{entry_path, lookup_path};

/// Equality filter: every `path -> value` pair must match the document.
/// An empty query matches every document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Query(pub Map<String, Value>);

impl Query {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_id(id: &str) -> Self {
        Self::all().eq("_id", Value::String(id.to_string()))
    }

    pub fn eq(mut self, path: impl Into<String>, value: Value) -> Self {
        self.0.insert(path.into(), value);
        self
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.0
            .iter()
            .all(|(path, expected)| lookup_path(doc, path) == Some(expected))
    }

    /// Top-level equality pairs, used to seed an upserted document.
    pub fn seed_document(&self) -> Value {
        let mut doc = Value::Object(Map::new());
        for (path, value) in &self.0 {
            if let Ok(slot) = entry_path(&mut doc, path) {
                *slot = value.clone();
            }
        }
        doc
    }
}

/// Inclusion projection (`{"education": 1}`). `_id` is always kept; an empty
/// projection returns whole documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Projection(pub Map<String, Value>);

impl Projection {
    pub fn include(paths: &[&str]) -> Self {
        Self(
            paths
                .iter()
                .map(|p| (p.to_string(), Value::from(1)))
                .collect(),
        )
    }

    fn included_paths(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .filter(|(_, flag)| match flag {
                Value::Bool(b) => *b,
                Value::Number(n) => n.as_i64() != Some(0),
                _ => false,
            })
            .map(|(path, _)| path.as_str())
    }

    pub fn apply(&self, doc: &Value) -> Value {
        if self.0.is_empty() {
            return doc.clone();
        }

        let mut out = Value::Object(Map::new());
        if let Some(id) = doc.get("_id") {
            out["_id"] = id.clone();
        }
        for path in self.included_paths() {
            if let Some(value) = lookup_path(doc, path) {
                if let Ok(slot) = entry_path(&mut out, path) {
                    *slot = value.clone();
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_by_id_matches_only_that_document() {
        let q = Query::by_id("u1");
        assert!(q.matches(&json!({"_id": "u1", "about": "x"})));
        assert!(!q.matches(&json!({"_id": "u2"})));
        assert!(!q.matches(&json!({"about": "x"})));
    }

    #[test]
    fn test_empty_query_matches_everything() {
        assert!(Query::all().matches(&json!({"anything": true})));
    }

    #[test]
    fn test_projection_keeps_id_and_selected_fields() {
        let doc = json!({"_id": "u1", "about": "hi", "skills": [1], "education": []});
        let projected = Projection::include(&["about"]).apply(&doc);
        assert_eq!(projected, json!({"_id": "u1", "about": "hi"}));
    }

    #[test]
    fn test_projection_skips_missing_fields() {
        let doc = json!({"_id": "u1"});
        let projected = Projection::include(&["workExperience"]).apply(&doc);
        assert_eq!(projected, json!({"_id": "u1"}));
    }

    #[test]
    fn test_zero_flag_is_not_an_inclusion() {
        let mut projection = Projection::include(&["about"]);
        projection.0.insert("skills".to_string(), json!(0));
        let projected = projection.apply(&json!({"_id": "u", "about": "a", "skills": []}));
        assert!(projected.get("skills").is_none());
    }

    #[test]
    fn test_seed_document_from_query() {
        let seeded = Query::by_id("u9").seed_document();
        assert_eq!(seeded, json!({"_id": "u9"}));
    }
}
