use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{DocumentStore, FetchRequest, StoreError, UpdateOutcome, UpdateRequest};

/// In-process document store with the same query/update semantics as the
/// remote API. Used when `DOCUMENT_API_URL` is unset.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, collection: &str, doc: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(doc);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn fetch_section_data(
        &self,
        _bearer: &str,
        request: &FetchRequest,
    ) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.read().await;
        let docs = collections
            .get(&request.collection_name)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| request.query.matches(doc))
                    .map(|doc| request.projection.apply(doc))
                    .collect()
            })
            .unwrap_or_default();
        Ok(docs)
    }

    /// `updateOne` semantics: the first matching document is updated.
    async fn m_update(
        &self,
        _bearer: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut collections = self.collections.write().await;
        let docs = collections
            .entry(request.collection_name.clone())
            .or_default();

        if let Some(doc) = docs.iter_mut().find(|doc| request.query.matches(doc)) {
            let mut updated = doc.clone();
            let modified = request.update.apply(&mut updated)?;
            *doc = updated;
            return Ok(UpdateOutcome {
                success: true,
                matched_count: 1,
                modified_count: u64::from(modified),
                upserted_id: None,
            });
        }

        if !request.options.upsert {
            debug!(
                "No document in '{}' matched {:?}",
                request.collection_name, request.query
            );
            return Ok(UpdateOutcome {
                success: true,
                ..UpdateOutcome::default()
            });
        }

        let mut doc = request.query.seed_document();
        if doc.get("_id").is_none() {
            doc["_id"] = Value::String(Uuid::new_v4().to_string());
        }
        request.update.apply(&mut doc)?;
        let upserted_id = doc.get("_id").cloned();
        docs.push(doc);

        Ok(UpdateOutcome {
            success: true,
            matched_count: 0,
            modified_count: 0,
            upserted_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::{Projection, Query, UpdateDocument, UpdateOptions};
    use serde_json::json;

    fn update(query: Query, update: UpdateDocument, upsert: bool) -> UpdateRequest {
        UpdateRequest {
            collection_name: "users".to_string(),
            query,
            update,
            options: UpdateOptions { upsert },
        }
    }

    fn fetch(query: Query, projection: Projection) -> FetchRequest {
        FetchRequest {
            collection_name: "users".to_string(),
            query,
            projection,
        }
    }

    #[tokio::test]
    async fn test_fetch_unknown_collection_is_empty() {
        let store = MemoryDocumentStore::new();
        let docs = store
            .fetch_section_data("t", &fetch(Query::all(), Projection::default()))
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_update_reports_matched_and_modified() {
        let store = MemoryDocumentStore::new();
        store.insert("users", json!({"_id": "u1", "about": "old"})).await;

        let outcome = store
            .m_update(
                "t",
                &update(
                    Query::by_id("u1"),
                    UpdateDocument::new().set("about", json!("new")),
                    false,
                ),
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched_count, 1);
        assert_eq!(outcome.modified_count, 1);

        let docs = store
            .fetch_section_data(
                "t",
                &fetch(Query::by_id("u1"), Projection::include(&["about"])),
            )
            .await
            .unwrap();
        assert_eq!(docs, vec![json!({"_id": "u1", "about": "new"})]);
    }

    #[tokio::test]
    async fn test_update_without_match_or_upsert_changes_nothing() {
        let store = MemoryDocumentStore::new();
        let outcome = store
            .m_update(
                "t",
                &update(
                    Query::by_id("ghost"),
                    UpdateDocument::new().set("about", json!("x")),
                    false,
                ),
            )
            .await
            .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.matched_count, 0);
        assert!(outcome.upserted_id.is_none());
    }

    #[tokio::test]
    async fn test_upsert_creates_document_with_query_id() {
        let store = MemoryDocumentStore::new();
        let outcome = store
            .m_update(
                "t",
                &update(
                    Query::by_id("u7"),
                    UpdateDocument::new().push("education", json!({"institute": "A"})),
                    true,
                ),
            )
            .await
            .unwrap();
        assert_eq!(outcome.upserted_id, Some(json!("u7")));

        let docs = store
            .fetch_section_data("t", &fetch(Query::by_id("u7"), Projection::default()))
            .await
            .unwrap();
        assert_eq!(docs[0]["education"], json!([{"institute": "A"}]));
    }

    #[tokio::test]
    async fn test_failed_update_leaves_document_untouched() {
        let store = MemoryDocumentStore::new();
        store.insert("users", json!({"_id": "u1", "about": "keep"})).await;

        let bad = UpdateDocument::new()
            .set("skills", json!(["x"]))
            .push("about", json!("not an array"));
        let result = store
            .m_update("t", &update(Query::by_id("u1"), bad, false))
            .await;
        assert!(result.is_err());

        let docs = store
            .fetch_section_data("t", &fetch(Query::by_id("u1"), Projection::default()))
            .await
            .unwrap();
        assert_eq!(docs[0], json!({"_id": "u1", "about": "keep"}));
    }
}
