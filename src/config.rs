//! Service configuration, loaded once from the environment at startup

use anyhow::{Context, Result};
use std::env;

const DEFAULT_TOKEN_TTL_SECONDS: u64 = 86_400; // one day
const DEFAULT_VERIFY_TOPIC: &str = "faces";
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 3001;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HS256 signing secret for tokens.
    pub secret: String,
    /// Token validity window; also the cache TTL.
    pub token_ttl_seconds: u64,
    pub database_url: String,
    pub redis_url: String,
    pub kafka_bootstrap_servers: String,
    pub kafka_verify_topic: String,
    pub upload_dir: String,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let secret = env::var("AUTH_SECRET").context("AUTH_SECRET must be set")?;
        let token_ttl_seconds = match env::var("AUTH_TOKEN_TTL_SECONDS") {
            Ok(raw) => raw
                .parse()
                .context("AUTH_TOKEN_TTL_SECONDS must be a number of seconds")?,
            Err(_) => DEFAULT_TOKEN_TTL_SECONDS,
        };
        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
        let redis_url = env::var("REDIS_URL").context("REDIS_URL must be set")?;
        let kafka_bootstrap_servers =
            env::var("KAFKA_BOOTSTRAP_SERVERS").unwrap_or_else(|_| "localhost:9092".to_string());
        let kafka_verify_topic =
            env::var("KAFKA_VERIFY_TOPIC").unwrap_or_else(|_| DEFAULT_VERIFY_TOPIC.to_string());
        let upload_dir =
            env::var("UPLOAD_DIR").unwrap_or_else(|_| DEFAULT_UPLOAD_DIR.to_string());
        let host = env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = match env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT must be a number")?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self {
            secret,
            token_ttl_seconds,
            database_url,
            redis_url,
            kafka_bootstrap_servers,
            kafka_verify_topic,
            upload_dir,
            host,
            port,
        })
    }
}
