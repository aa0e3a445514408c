//! Generic document-access API: `fetchSectionData` / `mUpdate`.
//!
//! Every profile section reads and writes the user document through the
//! `DocumentStore` trait. Two backends exist: the remote HTTP document API
//! and an in-process store with the same update semantics.

pub mod http;
pub mod memory;
pub mod path;
pub mod query;
pub mod update;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use http::HttpDocumentStore;
pub use memory::MemoryDocumentStore;
pub use query::{Projection, Query};
pub use update::UpdateDocument;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Document API error (status {status}): {message}")]
    Status { status: u16, message: String },

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid update: {0}")]
    InvalidUpdate(String),

    #[error("Update was not acknowledged by the document store")]
    Rejected,
}

impl StoreError {
    /// HTTP status of the upstream response, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Status { status, .. } => Some(*status),
            StoreError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    pub collection_name: String,
    #[serde(default)]
    pub query: Query,
    #[serde(default)]
    pub projection: Projection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateOptions {
    #[serde(default)]
    pub upsert: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRequest {
    pub collection_name: String,
    pub query: Query,
    pub update: UpdateDocument,
    #[serde(default)]
    pub options: UpdateOptions,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOutcome {
    pub success: bool,
    #[serde(default)]
    pub matched_count: u64,
    #[serde(default)]
    pub modified_count: u64,
    #[serde(default)]
    pub upserted_id: Option<Value>,
}

/// The document API seam. Held in `AppState` as `Arc<dyn DocumentStore>`.
///
/// `bearer` is the caller's token; backends that talk to a remote API forward
/// it, the in-process store ignores it.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn fetch_section_data(
        &self,
        bearer: &str,
        request: &FetchRequest,
    ) -> Result<Vec<Value>, StoreError>;

    async fn m_update(
        &self,
        bearer: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome, StoreError>;
}
