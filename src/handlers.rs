//! API handlers for the auth service

use axum::extract::{Multipart, State};
use axum::Json;
use tracing::error;
use validator::Validate;

use crate::app_state::AppState;
use crate::error::AuthError;
use crate::models::{
    ReadyProbe, TokenCheckRequest, UserCredentials, UserToken, UserTokenCheck, VerifyAccepted,
};

const VERIFY_ACCEPTED_MESSAGE: &str = "Message received for processing";

/// `POST /api/registration` - create a user and return their first token.
pub async fn registration(
    State(state): State<AppState>,
    Json(body): Json<UserCredentials>,
) -> Result<Json<UserToken>, AuthError> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    let token = state.auth_service.register(&body.login, body.password).await?;
    Ok(Json(UserToken { token }))
}

/// `POST /api/auth` - validate credentials and return the live token.
pub async fn authentication(
    State(state): State<AppState>,
    Json(body): Json<UserCredentials>,
) -> Result<Json<UserToken>, AuthError> {
    body.validate()
        .map_err(|e| AuthError::Validation(e.to_string()))?;
    let token = state
        .auth_service
        .authenticate(&body.login, body.password)
        .await?;
    Ok(Json(UserToken { token }))
}

/// `POST /api/check_token` - report whether a token is the user's live
/// one. Decode failures (expired or tampered) answer 401; a superseded
/// or never-issued token answers 200 with `is_token_valid: false`.
pub async fn check_token(
    State(state): State<AppState>,
    Json(body): Json<TokenCheckRequest>,
) -> Result<Json<UserTokenCheck>, AuthError> {
    let check = state.token_service.check(&body.token).await?;
    Ok(Json(check))
}

/// `GET /api/healthz/ready` - readiness probe.
pub async fn healthz_ready() -> Json<ReadyProbe> {
    Json(ReadyProbe { is_ready: true })
}

/// `POST /api/verify` - accept a photo for out-of-band verification.
///
/// Persists the upload and publishes `{user_id: file_path}` to the
/// verification topic. The publish is fire-and-forget: a producer error
/// is logged and the client still gets the accepted response.
pub async fn verify(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<VerifyAccepted>, AuthError> {
    let mut user_id: Option<i64> = None;
    let mut file: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AuthError::Validation(e.to_string()))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("user_id") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AuthError::Validation(e.to_string()))?;
                let parsed = text
                    .trim()
                    .parse::<i64>()
                    .map_err(|_| AuthError::Validation("user_id must be an integer".to_string()))?;
                user_id = Some(parsed);
            }
            Some("file") => {
                let filename = field
                    .file_name()
                    .ok_or(AuthError::BadFileName)?
                    .to_string();
                validate_image_filename(&filename)?;
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AuthError::Validation(e.to_string()))?;
                file = Some((filename, data.to_vec()));
            }
            _ => {}
        }
    }

    let user_id =
        user_id.ok_or_else(|| AuthError::Validation("user_id field is required".to_string()))?;
    let (filename, data) =
        file.ok_or_else(|| AuthError::Validation("file field is required".to_string()))?;

    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?;
    let path = state.upload_dir.join(format!("{user_id}_{filename}"));
    tokio::fs::write(&path, data)
        .await
        .map_err(|e| AuthError::Internal(e.into()))?;

    let producer = state.producer.clone();
    let file_path = path.to_string_lossy().into_owned();
    tokio::spawn(async move {
        if let Err(err) = producer.send(user_id, &file_path).await {
            error!(user_id, file_path = %file_path, error = %err, "failed to publish verification task");
        }
    });

    Ok(Json(VerifyAccepted {
        message: VERIFY_ACCEPTED_MESSAGE.to_string(),
    }))
}

/// Uploaded photos must carry a whitelisted image extension.
fn validate_image_filename(filename: &str) -> Result<(), AuthError> {
    let (stem, extension) = filename.rsplit_once('.').ok_or(AuthError::BadFileName)?;
    if filename.len() < 5 || stem.is_empty() || extension.is_empty() {
        return Err(AuthError::BadFileName);
    }
    match extension.to_ascii_lowercase().as_str() {
        "jpg" | "jpeg" | "png" => Ok(()),
        other => Err(AuthError::WrongImageFormat(format!(".{other}"))),
    }
}
