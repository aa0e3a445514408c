//! Lookup catalogs (skills, institutes, hobbies) and client-side style
//! filtering over a fully fetched catalog.

pub mod cache;
pub mod filter;
pub mod handlers;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::documents::{DocumentStore, FetchRequest, Projection, Query, StoreError};
use crate::support::{retry_fixed, RetryPolicy};

pub use cache::LookupCache;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LookupKind {
    Skills,
    Institutes,
    Hobbies,
}

impl LookupKind {
    pub fn collection(self) -> &'static str {
        match self {
            LookupKind::Skills => "skills",
            LookupKind::Institutes => "institutes",
            LookupKind::Hobbies => "hobbies",
        }
    }
}

impl fmt::Display for LookupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

/// One selectable entry of a catalog. Stored documents carry `_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LookupEntity {
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
}

/// Returns the full catalog for `kind`, served from the cache when present.
pub async fn fetch_catalog(
    store: &Arc<dyn DocumentStore>,
    cache: Option<&Arc<dyn LookupCache>>,
    retry: &RetryPolicy,
    bearer: &str,
    kind: LookupKind,
) -> Result<Vec<LookupEntity>, StoreError> {
    if let Some(cache) = cache {
        if let Some(hit) = cache.get(kind).await {
            return Ok(hit);
        }
    }

    let request = FetchRequest {
        collection_name: kind.collection().to_string(),
        query: Query::all(),
        projection: Projection::include(&["name"]),
    };
    let request = &request;
    let label = format!("fetch {kind} catalog");
    let docs = retry_fixed(retry, &label, move || store.fetch_section_data(bearer, request)).await?;

    // Entries without a usable id or name are skipped rather than failing the catalog.
    let catalog: Vec<LookupEntity> = docs
        .into_iter()
        .filter_map(|doc| serde_json::from_value(doc).ok())
        .collect();
    info!("Fetched {} {kind} lookup entries", catalog.len());

    if let Some(cache) = cache {
        cache.put(kind, &catalog).await;
    }
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::MemoryDocumentStore;
    use serde_json::json;

    #[test]
    fn test_entity_reads_mongo_id() {
        let entity: LookupEntity =
            serde_json::from_value(json!({"_id": "s1", "name": "Rust"})).unwrap();
        assert_eq!(entity.id, "s1");
        assert_eq!(entity.name, "Rust");
    }

    #[test]
    fn test_kind_path_names() {
        let kind: LookupKind = serde_json::from_value(json!("institutes")).unwrap();
        assert_eq!(kind, LookupKind::Institutes);
        assert_eq!(kind.collection(), "institutes");
    }

    #[tokio::test]
    async fn test_fetch_catalog_skips_malformed_entries() {
        let memory = MemoryDocumentStore::new();
        memory.insert("hobbies", json!({"_id": "h1", "name": "Chess"})).await;
        memory.insert("hobbies", json!({"_id": "h2"})).await;
        let store: Arc<dyn DocumentStore> = Arc::new(memory);

        let catalog = fetch_catalog(&store, None, &RetryPolicy::default(), "t", LookupKind::Hobbies)
            .await
            .unwrap();
        assert_eq!(
            catalog,
            vec![LookupEntity {
                id: "h1".to_string(),
                name: "Chess".to_string()
            }]
        );
    }
}
