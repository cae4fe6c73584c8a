//! Auth service - registration, authentication and verification flag
//!
//! Composes the credential store, password hashing and the token service.
//! Tokens are regenerated only when missing or no longer decodable, never
//! on every successful login.
//!
//! Two concurrent authentications racing on an expired token can both
//! re-issue; the cache write is a last-writer-wins overwrite, so the
//! earlier caller's token simply fails `check` afterwards. The race is
//! detectable and harmless, and is deliberately not locked away.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AuthError;
use crate::services::password;
use crate::services::token_service::TokenService;
use crate::store::{NewUser, User, UserStore};

pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    /// Create a user and hand back their first token.
    ///
    /// The store's uniqueness constraint is the authoritative conflict
    /// check; the early lookup only short-circuits the hash work. If
    /// token issuance fails after the insert, the user row stays
    /// committed (unverified and tokenless) and the caller retries via
    /// authentication.
    pub async fn register(&self, login: &str, password: String) -> Result<String, AuthError> {
        if self.store.find_by_login(login).await?.is_some() {
            return Err(AuthError::UserExists(login.to_string()));
        }
        let hashed_password = password::hash(password).await?;
        let user = self
            .store
            .insert(NewUser {
                login: login.to_string(),
                hashed_password,
            })
            .await?;
        let token = self.tokens.issue_token(user.id).await?;
        info!(user_id = user.id, "registered new user");
        Ok(token)
    }

    /// Validate credentials and return the user's live token.
    ///
    /// Unknown login and wrong password collapse to `UserNotFound`. The
    /// cached token is reused unchanged while it still decodes; it is
    /// re-issued when absent, expired, or corrupt (a corrupt entry is
    /// server-side state, and valid credentials must not fail for it).
    pub async fn authenticate(&self, login: &str, password: String) -> Result<String, AuthError> {
        let user = self
            .store
            .find_by_login(login)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if !password::verify(password, user.hashed_password.clone()).await? {
            return Err(AuthError::UserNotFound);
        }

        match self.tokens.get_token(user.id).await? {
            None => self.tokens.issue_token(user.id).await,
            Some(cached) if self.tokens.is_expired(&cached) => {
                self.tokens.issue_token(user.id).await
            }
            Some(cached) => {
                if self.tokens.decode(&cached).is_err() {
                    warn!(user_id = user.id, "cached token does not decode; reissuing");
                    return self.tokens.issue_token(user.id).await;
                }
                Ok(cached)
            }
        }
    }

    /// Set the verified flag after the out-of-band photo check completes.
    /// Idempotent: verifying an already-verified user is a no-op.
    pub async fn mark_verified(&self, user_id: i64) -> Result<(), AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;
        if user.is_verified {
            return Ok(());
        }
        let updated = User {
            is_verified: true,
            ..user
        };
        self.store.update(&updated).await?;
        info!(user_id, "user marked verified");
        Ok(())
    }
}
