//! AuthVault server entry point
//!
//! Wires the credential store (Postgres), token cache (Redis) and the
//! verification queue producer (Kafka) into the axum router.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::CorsLayer;
use tracing::info;

use authvault_server::app_state::AppState;
use authvault_server::cache::RedisTokenCache;
use authvault_server::config::AppConfig;
use authvault_server::producer::KafkaVerifyProducer;
use authvault_server::routes;
use authvault_server::services::{AuthService, TokenService};
use authvault_server::store::PgUserStore;
use authvault_server::token::TokenCodec;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load environment variables
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;
    let cache = RedisTokenCache::connect(&config.redis_url)
        .await
        .context("failed to connect to Redis")?;
    let producer = KafkaVerifyProducer::new(
        &config.kafka_bootstrap_servers,
        config.kafka_verify_topic.clone(),
    )
    .context("failed to create Kafka producer")?;

    let token_service = TokenService::new(
        Arc::new(cache),
        TokenCodec::new(&config.secret),
        config.token_ttl_seconds,
    );
    let auth_service = AuthService::new(Arc::new(PgUserStore::new(db_pool)), token_service.clone());

    let state = AppState::new(
        Arc::new(auth_service),
        token_service,
        Arc::new(producer),
        PathBuf::from(&config.upload_dir),
    );

    let app = routes::app(state).layer(build_cors_layer());

    let host: IpAddr = config.host.parse().context("HOST must be an IP address")?;
    let addr = SocketAddr::from((host, config.port));
    info!("server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind listener")?;
    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

fn build_cors_layer() -> CorsLayer {
    let allowed_origins = std::env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| "http://localhost:3000".to_string())
        .split(',')
        .filter_map(|origin| origin.trim().parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .allow_credentials(false)
}
