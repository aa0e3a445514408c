use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use super::models::{ProfileSection, ProfileSnapshot};
use crate::auth::Session;
use crate::documents::path::lookup_path;
use crate::documents::{
    DocumentStore, FetchRequest, Projection, Query, StoreError, UpdateDocument, UpdateOptions,
    UpdateOutcome, UpdateRequest,
};
use crate::errors::AppError;
use crate::support::{retry_fixed, RetryPolicy};

/// One user's document, seen through the generic document API.
///
/// Reads go through the fixed-delay retry helper. Writes are sent once:
/// a `$push` is not idempotent.
pub struct ProfileRepository {
    store: Arc<dyn DocumentStore>,
    collection: String,
    session: Session,
    retry: RetryPolicy,
}

impl ProfileRepository {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        collection: impl Into<String>,
        session: Session,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            collection: collection.into(),
            session,
            retry,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn query(&self) -> Query {
        Query::by_id(&self.session.user_id)
    }

    async fn fetch(&self, paths: &[&str]) -> Result<Option<Value>, AppError> {
        let request = FetchRequest {
            collection_name: self.collection.clone(),
            query: self.query(),
            projection: Projection::include(paths),
        };
        let store = &self.store;
        let bearer = self.session.token.as_str();
        let request = &request;
        let docs = retry_fixed(&self.retry, "fetchSectionData", move || {
            store.fetch_section_data(bearer, request)
        })
        .await?;
        Ok(docs.into_iter().next())
    }

    /// Loads the value at `path`. A missing document or field is the type's
    /// empty value, not an error.
    pub async fn load<T>(&self, path: &str) -> Result<T, AppError>
    where
        T: DeserializeOwned + Default,
    {
        let doc = self.fetch(&[path]).await?;
        match doc.as_ref().and_then(|d| lookup_path(d, path)) {
            None | Some(Value::Null) => {
                debug!("{path} is empty for user {}", self.session.user_id);
                Ok(T::default())
            }
            Some(value) => Ok(serde_json::from_value(value.clone()).map_err(StoreError::from)?),
        }
    }

    pub async fn load_snapshot(&self) -> Result<ProfileSnapshot, AppError> {
        let paths: Vec<&str> = ProfileSection::ALL.iter().map(|s| s.path()).collect();
        match self.fetch(&paths).await? {
            Some(doc) => Ok(serde_json::from_value(doc).map_err(StoreError::from)?),
            None => Ok(ProfileSnapshot::default()),
        }
    }

    /// Sends one `mUpdate`. Without `upsert` the user document must exist,
    /// otherwise the update is reported as not found.
    pub async fn apply(
        &self,
        update: UpdateDocument,
        upsert: bool,
    ) -> Result<UpdateOutcome, AppError> {
        let request = UpdateRequest {
            collection_name: self.collection.clone(),
            query: self.query(),
            update,
            options: UpdateOptions { upsert },
        };
        let outcome = self
            .store
            .m_update(&self.session.token, &request)
            .await?;

        if !outcome.success {
            return Err(StoreError::Rejected.into());
        }
        if !upsert && outcome.matched_count == 0 && outcome.upserted_id.is_none() {
            return Err(AppError::NotFound(format!(
                "Profile for user {} not found",
                self.session.user_id
            )));
        }
        Ok(outcome)
    }
}
