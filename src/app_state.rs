//! Application state shared across handlers

use std::path::PathBuf;
use std::sync::Arc;

use crate::producer::VerifyProducer;
use crate::services::{AuthService, TokenService};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub token_service: TokenService,
    pub producer: Arc<dyn VerifyProducer>,
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        auth_service: Arc<AuthService>,
        token_service: TokenService,
        producer: Arc<dyn VerifyProducer>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            auth_service,
            token_service,
            producer,
            upload_dir,
        }
    }
}
