use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use crate::auth::Session;
use crate::config::Config;
use crate::documents::{DocumentStore, HttpDocumentStore, MemoryDocumentStore};
use crate::lookups::cache::RedisLookupCache;
use crate::lookups::LookupCache;
use crate::places::PlacesClient;
use crate::profile::ProfileRepository;
use crate::support::RetryPolicy;
use crate::uploads::{FileUploader, HttpFileUploader, MemoryFileUploader};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Generic document API. Remote when `DOCUMENT_API_URL` is set, in-memory otherwise.
    pub store: Arc<dyn DocumentStore>,
    pub uploader: Arc<dyn FileUploader>,
    /// Lookup catalog cache; `None` without `REDIS_URL`.
    pub lookup_cache: Option<Arc<dyn LookupCache>>,
    /// Place autocomplete; `None` without `PLACES_API_KEY`.
    pub places: Option<PlacesClient>,
    pub config: Config,
}

impl AppState {
    /// Picks a backend for each collaborator from the configuration.
    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.document_api_url {
            Some(url) => {
                info!("Using document API at {url}");
                Arc::new(HttpDocumentStore::new(url, config.http_timeout())?)
            }
            None => {
                warn!("DOCUMENT_API_URL not set; using the in-memory document store");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        let uploader: Arc<dyn FileUploader> = match &config.upload_api_url {
            Some(url) => {
                info!("Using upload API at {url}");
                Arc::new(HttpFileUploader::new(
                    url,
                    config.http_timeout(),
                    config.upload_max_bytes,
                )?)
            }
            None => {
                warn!("UPLOAD_API_URL not set; uploads are kept in memory");
                Arc::new(MemoryFileUploader::new(config.upload_max_bytes))
            }
        };

        let lookup_cache = match &config.redis_url {
            Some(url) => {
                let client = redis::Client::open(url.as_str())?;
                info!("Redis lookup cache initialized");
                Some(Arc::new(RedisLookupCache::new(client, config.lookup_cache_ttl_secs))
                    as Arc<dyn LookupCache>)
            }
            None => None,
        };

        let places = match &config.places_api_key {
            Some(key) => {
                let client = PlacesClient::new(
                    key.clone(),
                    config.places_country.clone(),
                    config.http_timeout(),
                )?;
                info!("Place autocomplete enabled for country '{}'", client.country());
                Some(client)
            }
            None => None,
        };

        Ok(AppState {
            store,
            uploader,
            lookup_cache,
            places,
            config,
        })
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.config.fetch_retry_attempts,
            delay: self.config.fetch_retry_delay(),
        }
    }

    pub fn repository(&self, session: Session) -> ProfileRepository {
        ProfileRepository::new(
            Arc::clone(&self.store),
            self.config.users_collection.clone(),
            session,
            self.retry_policy(),
        )
    }
}
