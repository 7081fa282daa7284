use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

/// Typed keys for cached catalog responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Full-text search, keyed by a query fingerprint
    Search(String),
    /// Best-podcasts listing for a genre
    GenreTop(u32),
    /// Catalog similar-podcasts lookup
    Similar(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search(fingerprint) => write!(f, "search:{}", fingerprint.to_lowercase()),
            CacheKey::GenreTop(genre_id) => write!(f, "genre_top:{}", genre_id),
            CacheKey::Similar(podcast_id) => write!(f, "similar:{}", podcast_id),
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Message for asynchronous cache writes
struct CacheWriteMessage {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed response cache with non-blocking writes
///
/// Reads go straight to Redis; writes are handed to a background task so
/// caching never delays a response. Must be constructed inside a Tokio
/// runtime.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<CacheWriteMessage>,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        let (write_tx, mut write_rx) = mpsc::unbounded_channel::<CacheWriteMessage>();

        let client = redis_client.clone();
        tokio::spawn(async move {
            while let Some(msg) = write_rx.recv().await {
                if let Err(e) = Self::write_to_redis(&client, msg).await {
                    tracing::warn!(error = %e, "Cache write failed");
                }
            }
            tracing::debug!("Cache writer task stopped");
        });

        Self {
            redis_client,
            write_tx,
        }
    }

    async fn write_to_redis(client: &Client, msg: CacheWriteMessage) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(msg.key, msg.value, msg.ttl).await?;
        Ok(())
    }

    /// Retrieves and deserializes a cached value, `None` on miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Queues a value for caching without blocking the caller
    ///
    /// Serialization or send failures are logged and dropped; losing a
    /// cache write only costs a future API call.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let msg = CacheWriteMessage {
            key: format!("{}", key),
            value: json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(msg) {
            tracing::error!(error = %e, "Failed to queue cache write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_search() {
        let key = CacheKey::Search("Astronomy|description|20|0|0".to_string());
        assert_eq!(format!("{}", key), "search:astronomy|description|20|0|0");
    }

    #[test]
    fn test_cache_key_display_genre_top() {
        let key = CacheKey::GenreTop(125);
        assert_eq!(format!("{}", key), "genre_top:125");
    }

    #[test]
    fn test_cache_key_display_similar() {
        let key = CacheKey::Similar("abc123".to_string());
        assert_eq!(format!("{}", key), "similar:abc123");
    }
}
