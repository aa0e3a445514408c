//! Redis-backed cache for fully fetched lookup catalogs.
//!
//! Cache failures never fail a request: they are logged and the caller falls
//! through to the document API.

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{LookupEntity, LookupKind};

#[async_trait]
pub trait LookupCache: Send + Sync {
    async fn get(&self, kind: LookupKind) -> Option<Vec<LookupEntity>>;
    async fn put(&self, kind: LookupKind, catalog: &[LookupEntity]);
}

pub struct RedisLookupCache {
    client: redis::Client,
    ttl_secs: u64,
}

impl RedisLookupCache {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }
}

fn cache_key(kind: LookupKind) -> String {
    format!("lookup:{}", kind.collection())
}

#[async_trait]
impl LookupCache for RedisLookupCache {
    async fn get(&self, kind: LookupKind) -> Option<Vec<LookupEntity>> {
        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable for lookup cache read: {e}");
                return None;
            }
        };

        let raw: Option<String> = match redis::cmd("GET")
            .arg(cache_key(kind))
            .query_async(&mut conn)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Redis GET for {kind} catalog failed: {e}");
                return None;
            }
        };

        let catalog = raw.and_then(|json| serde_json::from_str::<Vec<LookupEntity>>(&json).ok())?;
        debug!("Lookup cache hit for {kind} ({} entries)", catalog.len());
        Some(catalog)
    }

    async fn put(&self, kind: LookupKind, catalog: &[LookupEntity]) {
        let json = match serde_json::to_string(catalog) {
            Ok(json) => json,
            Err(e) => {
                warn!("Could not serialize {kind} catalog for cache: {e}");
                return;
            }
        };

        let mut conn = match self.client.get_multiplexed_async_connection().await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("Redis unavailable for lookup cache write: {e}");
                return;
            }
        };

        let result: redis::RedisResult<()> = redis::cmd("SET")
            .arg(cache_key(kind))
            .arg(json)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async(&mut conn)
            .await;
        if let Err(e) = result {
            warn!("Redis SET for {kind} catalog failed: {e}");
        }
    }
}
