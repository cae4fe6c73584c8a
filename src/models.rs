//! Wire schemas for the auth API

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Registration and authentication payload.
#[derive(Debug, Deserialize, Validate)]
pub struct UserCredentials {
    #[validate(length(min = 3, max = 20), custom = "validate_login_charset")]
    pub login: String,
    #[validate(length(min = 6, max = 100))]
    pub password: String,
}

/// Token handed back from registration and authentication.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserToken {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenCheckRequest {
    pub token: String,
}

/// Token check verdict; `user_id` is populated only for a valid token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserTokenCheck {
    pub user_id: Option<i64>,
    pub is_token_valid: bool,
}

#[derive(Debug, Serialize)]
pub struct ReadyProbe {
    pub is_ready: bool,
}

#[derive(Debug, Serialize)]
pub struct VerifyAccepted {
    pub message: String,
}

/// Logins are restricted to alphanumerics plus `.`, `_` and `-`.
fn validate_login_charset(login: &str) -> Result<(), ValidationError> {
    let ok = login
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new("login_charset"))
    }
}
