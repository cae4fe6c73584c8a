//! Password hashing - bcrypt with a fresh salt per hash
//!
//! bcrypt is deliberately slow, so both operations run on the blocking
//! pool to keep hashing latency off the async dispatcher.

use anyhow::Context;
use tokio::task;

use crate::error::AuthError;

/// Hash a password with a freshly generated salt.
pub async fn hash(password: String) -> Result<String, AuthError> {
    let hashed = task::spawn_blocking(move || bcrypt::hash(password, bcrypt::DEFAULT_COST))
        .await
        .context("hashing task panicked")?
        .context("bcrypt hash failed")?;
    Ok(hashed)
}

/// Verify a password against a stored hash. A mismatch is `Ok(false)`;
/// only a malformed hash is an error.
pub async fn verify(password: String, hashed_password: String) -> Result<bool, AuthError> {
    let matches = task::spawn_blocking(move || bcrypt::verify(password, &hashed_password))
        .await
        .context("verification task panicked")?
        .context("bcrypt verify failed")?;
    Ok(matches)
}
