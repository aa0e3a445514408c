use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{DocumentStore, FetchRequest, StoreError, UpdateOutcome, UpdateRequest};

const FETCH_ENDPOINT: &str = "fetchSectionData";
const UPDATE_ENDPOINT: &str = "mUpdate";

/// Client for the remote generic document API.
#[derive(Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// `fetchSectionData` answers with either a bare array or `{"data": [...]}`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FetchResponse {
    Bare(Vec<Value>),
    Wrapped { data: Option<Vec<Value>> },
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn post<B, T>(&self, endpoint: &str, bearer: &str, body: &B) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Document API {endpoint} returned {status}: {body}");
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|e| e.message.or(e.error))
                .unwrap_or(body);
            return Err(StoreError::Status {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn fetch_section_data(
        &self,
        bearer: &str,
        request: &FetchRequest,
    ) -> Result<Vec<Value>, StoreError> {
        let response: FetchResponse = self.post(FETCH_ENDPOINT, bearer, request).await?;
        let docs = match response {
            FetchResponse::Bare(docs) => docs,
            FetchResponse::Wrapped { data } => data.unwrap_or_default(),
        };
        debug!(
            "fetchSectionData on '{}' returned {} documents",
            request.collection_name,
            docs.len()
        );
        Ok(docs)
    }

    async fn m_update(
        &self,
        bearer: &str,
        request: &UpdateRequest,
    ) -> Result<UpdateOutcome, StoreError> {
        let outcome: UpdateOutcome = self.post(UPDATE_ENDPOINT, bearer, request).await?;
        debug!(
            "mUpdate on '{}': matched={}, modified={}, upserted={:?}",
            request.collection_name,
            outcome.matched_count,
            outcome.modified_count,
            outcome.upserted_id
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fetch_response_accepts_bare_array() {
        let parsed: FetchResponse = serde_json::from_value(json!([{"_id": "u1"}])).unwrap();
        assert!(matches!(parsed, FetchResponse::Bare(docs) if docs.len() == 1));
    }

    #[test]
    fn test_fetch_response_accepts_wrapped_data() {
        let parsed: FetchResponse = serde_json::from_value(json!({"data": []})).unwrap();
        assert!(matches!(parsed, FetchResponse::Wrapped { data: Some(d) } if d.is_empty()));
    }

    #[test]
    fn test_update_outcome_reads_camel_case() {
        let outcome: UpdateOutcome = serde_json::from_value(json!({
            "success": true,
            "matchedCount": 1,
            "modifiedCount": 1,
            "upsertedId": null
        }))
        .unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.modified_count, 1);
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store =
            HttpDocumentStore::new("http://docs.local/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(store.base_url, "http://docs.local/api");
    }
}
