//! Token service - issuance, refresh and validity checks
//!
//! A token string is valid only if it decodes, its expiry has not passed,
//! and it is byte-equal to the cache entry for its embedded user id. The
//! cache comparison is what gives the single-active-token guarantee:
//! issuing a new token overwrites the entry, so any holder of the old
//! string fails `check` from that point on.

use std::sync::Arc;

use tracing::debug;

use crate::cache::TokenCache;
use crate::error::AuthError;
use crate::models::UserTokenCheck;
use crate::token::{Claims, TokenCodec};

#[derive(Clone)]
pub struct TokenService {
    cache: Arc<dyn TokenCache>,
    codec: TokenCodec,
    ttl_seconds: u64,
}

impl TokenService {
    pub fn new(cache: Arc<dyn TokenCache>, codec: TokenCodec, ttl_seconds: u64) -> Self {
        Self {
            cache,
            codec,
            ttl_seconds,
        }
    }

    /// Current live token for the user, if any.
    pub async fn get_token(&self, user_id: i64) -> Result<Option<String>, AuthError> {
        self.cache.get(user_id).await
    }

    /// Mint a new token and store it as the single live token for the
    /// user. The cache TTL matches the token's own expiry window.
    pub async fn issue_token(&self, user_id: i64) -> Result<String, AuthError> {
        let token = self.codec.encode(user_id, self.ttl_seconds)?;
        self.cache.set(user_id, &token, self.ttl_seconds).await?;
        debug!(user_id, "issued token");
        Ok(token)
    }

    /// True only when the token decodes as expired. A tampered or
    /// malformed token is not "expired"; callers handle that separately.
    pub fn is_expired(&self, token: &str) -> bool {
        matches!(self.codec.decode(token), Err(AuthError::TokenExpired))
    }

    /// Decode signature and expiry without consulting the cache.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        self.codec.decode(token)
    }

    /// Full validity check: decode (propagating `TokenExpired` /
    /// `InvalidToken`), then require byte-equality with the cached token
    /// for the embedded user id. A structurally valid token that was
    /// superseded by a later issuance, or that was never cached at all,
    /// reports invalid rather than erroring.
    pub async fn check(&self, token: &str) -> Result<UserTokenCheck, AuthError> {
        let claims = self.decode(token)?;
        let cached = self.cache.get(claims.id).await?;
        let is_token_valid = cached.as_deref() == Some(token);
        Ok(UserTokenCheck {
            user_id: is_token_valid.then_some(claims.id),
            is_token_valid,
        })
    }
}
