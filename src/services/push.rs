use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::PublicProfile;

/// Errors that can occur when dispatching push notifications
#[derive(Debug, Error)]
pub enum PushError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Gateway returned error: {0}")]
    GatewayError(String),
}

/// One-way notification dispatch. Failures are logged by callers and never
/// roll back the state transition that triggered the notification.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Tell `target_id` they matched with `counterpart`.
    async fn notify_match(
        &self,
        target_id: &str,
        counterpart: &PublicProfile,
    ) -> Result<(), PushError>;

    /// Bump `target_id`'s pending-likes counter.
    async fn notify_like_counter(&self, target_id: &str) -> Result<(), PushError>;

    /// Deliver a fast match invitation carrying the request id, so the
    /// client can reference it for accept or cancellation.
    async fn notify_fast_match_request(
        &self,
        target_id: &str,
        requester: &PublicProfile,
        request_id: Uuid,
    ) -> Result<(), PushError>;

    /// Withdraw a previously scheduled fast match notification.
    async fn cancel_scheduled_notification(
        &self,
        target_id: &str,
        request_id: Uuid,
    ) -> Result<(), PushError>;
}

/// Client for the push gateway (Firebase-style REST relay).
///
/// Delivery is fire-and-forget: each call spawns the HTTP send and returns
/// immediately, so a slow gateway never delays a response or holds a lock.
/// Send failures are logged inside the spawned task.
pub struct PushGatewayClient {
    base_url: String,
    server_key: String,
    client: Client,
}

impl PushGatewayClient {
    pub fn new(base_url: String, server_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            server_key,
            client,
        }
    }

    fn dispatch(&self, path: &str, payload: serde_json::Value) {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        let client = self.client.clone();
        let server_key = self.server_key.clone();

        tokio::spawn(async move {
            let result = client
                .post(&url)
                .header("Authorization", format!("key={}", server_key))
                .json(&payload)
                .send()
                .await;

            match result {
                Ok(response) if !response.status().is_success() => {
                    tracing::warn!("Push gateway rejected {}: {}", url, response.status());
                }
                Err(e) => {
                    tracing::warn!("Push dispatch to {} failed: {}", url, e);
                }
                _ => {}
            }
        });
    }
}

#[async_trait]
impl NotificationSink for PushGatewayClient {
    async fn notify_match(
        &self,
        target_id: &str,
        counterpart: &PublicProfile,
    ) -> Result<(), PushError> {
        self.dispatch(
            "/send",
            serde_json::json!({
                "to": target_id,
                "notification": { "type": "match" },
                "data": { "matchedUser": counterpart },
            }),
        );
        Ok(())
    }

    async fn notify_like_counter(&self, target_id: &str) -> Result<(), PushError> {
        self.dispatch(
            "/send",
            serde_json::json!({
                "to": target_id,
                "notification": { "type": "like_counter_increment" },
            }),
        );
        Ok(())
    }

    async fn notify_fast_match_request(
        &self,
        target_id: &str,
        requester: &PublicProfile,
        request_id: Uuid,
    ) -> Result<(), PushError> {
        self.dispatch(
            "/send",
            serde_json::json!({
                "to": target_id,
                "notification": { "type": "fast_match_request" },
                "data": { "requester": requester, "requestId": request_id },
            }),
        );
        Ok(())
    }

    async fn cancel_scheduled_notification(
        &self,
        target_id: &str,
        request_id: Uuid,
    ) -> Result<(), PushError> {
        self.dispatch(
            "/cancel",
            serde_json::json!({
                "to": target_id,
                "requestId": request_id,
            }),
        );
        Ok(())
    }
}

/// Notification event captured by [`RecordingNotifications`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationEvent {
    Match {
        target_id: String,
        counterpart_id: String,
    },
    LikeCounter {
        target_id: String,
    },
    FastMatchRequest {
        target_id: String,
        request_id: Uuid,
    },
    Cancelled {
        target_id: String,
        request_id: Uuid,
    },
}

/// Sink that records every dispatch, for tests and local development.
#[derive(Default)]
pub struct RecordingNotifications {
    events: Arc<Mutex<Vec<NotificationEvent>>>,
}

impl RecordingNotifications {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().await.clone()
    }
}

#[async_trait]
impl NotificationSink for RecordingNotifications {
    async fn notify_match(
        &self,
        target_id: &str,
        counterpart: &PublicProfile,
    ) -> Result<(), PushError> {
        self.events.lock().await.push(NotificationEvent::Match {
            target_id: target_id.to_string(),
            counterpart_id: counterpart.user_id.clone(),
        });
        Ok(())
    }

    async fn notify_like_counter(&self, target_id: &str) -> Result<(), PushError> {
        self.events
            .lock()
            .await
            .push(NotificationEvent::LikeCounter {
                target_id: target_id.to_string(),
            });
        Ok(())
    }

    async fn notify_fast_match_request(
        &self,
        target_id: &str,
        _requester: &PublicProfile,
        request_id: Uuid,
    ) -> Result<(), PushError> {
        self.events
            .lock()
            .await
            .push(NotificationEvent::FastMatchRequest {
                target_id: target_id.to_string(),
                request_id,
            });
        Ok(())
    }

    async fn cancel_scheduled_notification(
        &self,
        target_id: &str,
        request_id: Uuid,
    ) -> Result<(), PushError> {
        self.events.lock().await.push(NotificationEvent::Cancelled {
            target_id: target_id.to_string(),
            request_id,
        });
        Ok(())
    }
}
