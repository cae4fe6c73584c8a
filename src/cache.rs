//! Token cache - one live token per user, keyed by user id with a TTL
//!
//! The cache is the source of truth for which token string is currently
//! recognized for a user. `set` is a last-writer-wins overwrite; that is
//! what makes re-issuance invalidate prior tokens system-wide.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::AuthError;

#[async_trait]
pub trait TokenCache: Send + Sync {
    /// Current token for the user, or `None` if never issued or the TTL
    /// has elapsed.
    async fn get(&self, user_id: i64) -> Result<Option<String>, AuthError>;

    /// Store `token` as the single live token for the user, expiring
    /// after `ttl_seconds`. Overwrites any previous entry.
    async fn set(&self, user_id: i64, token: &str, ttl_seconds: u64) -> Result<(), AuthError>;
}

/// Redis-backed cache used in production. Entries expire server-side via
/// `SET ... EX`, so a cache miss and an elapsed TTL are indistinguishable
/// to callers, which is exactly the contract.
pub struct RedisTokenCache {
    conn: ConnectionManager,
}

impl RedisTokenCache {
    pub async fn connect(redis_url: &str) -> Result<Self, AuthError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;
        Ok(Self { conn })
    }

    fn key(user_id: i64) -> String {
        format!("token:{user_id}")
    }
}

#[async_trait]
impl TokenCache for RedisTokenCache {
    async fn get(&self, user_id: i64) -> Result<Option<String>, AuthError> {
        let mut conn = self.conn.clone();
        let token: Option<String> = conn.get(Self::key(user_id)).await?;
        Ok(token)
    }

    async fn set(&self, user_id: i64, token: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        conn.set_ex::<_, _, ()>(Self::key(user_id), token, ttl_seconds)
            .await?;
        Ok(())
    }
}

/// In-memory cache for tests and local development. Honors TTLs so the
/// expiry semantics match the Redis implementation.
#[derive(Default)]
pub struct InMemoryTokenCache {
    entries: Mutex<HashMap<i64, (String, Instant)>>,
}

impl InMemoryTokenCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenCache for InMemoryTokenCache {
    async fn get(&self, user_id: i64) -> Result<Option<String>, AuthError> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match entries.get(&user_id) {
            Some((_, deadline)) if *deadline <= Instant::now() => {
                entries.remove(&user_id);
                Ok(None)
            }
            Some((token, _)) => Ok(Some(token.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, user_id: i64, token: &str, ttl_seconds: u64) -> Result<(), AuthError> {
        let deadline = Instant::now() + Duration::from_secs(ttl_seconds);
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(user_id, (token.to_string(), deadline));
        Ok(())
    }
}
