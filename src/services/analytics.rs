use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tokio::sync::Mutex;

/// Best-effort analytics fan-out. Implementations swallow their own
/// failures; the engines never block on or observe delivery.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn record(&self, event: &str, payload: serde_json::Value);
}

/// Appends events to a Redis stream for downstream consumers.
pub struct RedisAnalytics {
    redis: Arc<Mutex<ConnectionManager>>,
    stream_key: String,
}

impl RedisAnalytics {
    pub async fn new(redis_url: &str, stream_key: String) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        let redis = ConnectionManager::new(client).await?;

        Ok(Self {
            redis: Arc::new(Mutex::new(redis)),
            stream_key,
        })
    }
}

#[async_trait]
impl AnalyticsSink for RedisAnalytics {
    async fn record(&self, event: &str, payload: serde_json::Value) {
        let mut conn = self.redis.lock().await;
        let result: Result<String, redis::RedisError> = redis::cmd("XADD")
            .arg(&self.stream_key)
            .arg("*")
            .arg("event")
            .arg(event)
            .arg("payload")
            .arg(payload.to_string())
            .query_async(&mut *conn)
            .await;
        drop(conn);

        match result {
            Ok(_) => tracing::trace!("Recorded analytics event: {}", event),
            Err(e) => tracing::warn!("Failed to record analytics event {}: {}", event, e),
        }
    }
}

/// Sink that drops everything, used when Redis is unavailable and in tests.
#[derive(Default)]
pub struct NoopAnalytics;

#[async_trait]
impl AnalyticsSink for NoopAnalytics {
    async fn record(&self, event: &str, _payload: serde_json::Value) {
        tracing::trace!("Dropping analytics event: {}", event);
    }
}
