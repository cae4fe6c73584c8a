//! Photo-verification queue producer
//!
//! Fire-and-forget publish of `{user_id: file_path}` messages consumed by
//! the downstream face-recognition worker. A publish failure is logged by
//! the caller and never fails the upload response.

use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::AuthError;

#[async_trait]
pub trait VerifyProducer: Send + Sync {
    async fn send(&self, user_id: i64, file_path: &str) -> Result<(), AuthError>;
}

/// Kafka producer used in production.
pub struct KafkaVerifyProducer {
    producer: FutureProducer,
    topic: String,
}

impl KafkaVerifyProducer {
    pub fn new(bootstrap_servers: &str, topic: String) -> Result<Self, AuthError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("message.timeout.ms", "5000")
            .create()
            .map_err(|e| AuthError::Queue(e.to_string()))?;

        info!(bootstrap_servers, topic = %topic, "verification producer created");
        Ok(Self { producer, topic })
    }
}

#[async_trait]
impl VerifyProducer for KafkaVerifyProducer {
    async fn send(&self, user_id: i64, file_path: &str) -> Result<(), AuthError> {
        let key = user_id.to_string();
        let mut message = serde_json::Map::new();
        message.insert(key.clone(), Value::String(file_path.to_string()));
        let payload = Value::Object(message).to_string();

        debug!(user_id, file_path, topic = %self.topic, "publishing verification task");

        let record = FutureRecord::to(&self.topic).key(&key).payload(&payload);
        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| AuthError::Queue(e.to_string()))?;
        Ok(())
    }
}

/// No-op producer for tests and local runs without a broker.
#[derive(Default)]
pub struct NoopVerifyProducer;

#[async_trait]
impl VerifyProducer for NoopVerifyProducer {
    async fn send(&self, user_id: i64, file_path: &str) -> Result<(), AuthError> {
        debug!(user_id, file_path, "verification publish skipped (noop producer)");
        Ok(())
    }
}
