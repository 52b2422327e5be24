use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::core::error::EngineError;
use crate::core::exclusion::ExclusionLedger;
use crate::core::pair::PairKey;
use crate::models::{MatchFeature, MatchOutcome, PublicProfile};
use crate::services::{AnalyticsSink, NotificationSink, UserDirectory};
use crate::store::{FastMatchStore, RelationshipStore};

/// Time-boxed mutual-confirmation flow.
///
/// A request lives for a fixed window; both parties must confirm inside it.
/// Acceptance is an atomic conditional write in the store ("set my flag only
/// if the record is still live"), so it composes safely with the expiry
/// sweep and with the other party acting at the same moment.
pub struct FastMatchEngine {
    relationships: Arc<dyn RelationshipStore>,
    requests: Arc<dyn FastMatchStore>,
    directory: Arc<dyn UserDirectory>,
    exclusions: ExclusionLedger,
    notifier: Arc<dyn NotificationSink>,
    analytics: Arc<dyn AnalyticsSink>,
    ttl: Duration,
}

impl FastMatchEngine {
    pub fn new(
        relationships: Arc<dyn RelationshipStore>,
        requests: Arc<dyn FastMatchStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSink>,
        analytics: Arc<dyn AnalyticsSink>,
        ttl: Duration,
    ) -> Self {
        let exclusions = ExclusionLedger::new(directory.clone());
        Self {
            relationships,
            requests,
            directory,
            exclusions,
            notifier,
            analytics,
            ttl,
        }
    }

    /// Open a fast match request from `first` towards `second`.
    ///
    /// The requester's side starts confirmed. A live request already holding
    /// the pair, in either direction, rejects with `AlreadyExists`.
    pub async fn request(&self, first: &str, second: &str) -> Result<Uuid, EngineError> {
        let pair = PairKey::new(first, second)?;
        let requester_profile = self.resolve_profile(first).await?;
        self.resolve_profile(second).await?;
        let side = pair.side_of(first).ok_or(EngineError::InvalidActor)?;

        let request = self.requests.create(&pair, side, Utc::now(), self.ttl).await?;

        tracing::info!(
            "Fast match request {} opened: {} -> {}",
            request.id,
            first,
            second
        );

        if let Err(e) = self
            .notifier
            .notify_fast_match_request(second, &requester_profile, request.id)
            .await
        {
            tracing::warn!("Fast match notification to {} failed: {}", second, e);
        }
        self.analytics
            .record(
                "fast_match.requested",
                serde_json::json!({ "requestId": request.id, "first": first, "second": second }),
            )
            .await;

        Ok(request.id)
    }

    /// Confirm the pending request as `caller`.
    ///
    /// The caller's flag is set only if the record is still live; when both
    /// sides are confirmed the request converts into a matched relationship
    /// and dies. A caller whose counterpart has not confirmed (the initiator
    /// re-confirming their own invitation) gets `isMatch: false`.
    pub async fn accept(&self, caller: &str, other: &str) -> Result<MatchOutcome, EngineError> {
        let pair = PairKey::new(caller, other)?;
        let other_profile = self.resolve_profile(other).await?;
        let side = pair.side_of(caller).ok_or(EngineError::InvalidActor)?;

        let request = self.requests.confirm(&pair, side, Utc::now()).await?;

        if !request.both_confirmed() {
            return Ok(MatchOutcome::no_match());
        }

        tracing::info!(
            "Fast match {} confirmed by both: {} and {}",
            request.id,
            pair.low(),
            pair.high()
        );

        // Conversion: the pair becomes a matched relationship and the fast
        // match record dies with its scheduled notification.
        self.relationships
            .record_match(&pair, MatchFeature::Fast)
            .await?;

        for (a, b) in [(pair.low(), pair.high()), (pair.high(), pair.low())] {
            if let Err(e) = self.directory.add_match(a, b).await {
                tracing::warn!("Failed to add {} to matches of {}: {}", b, a, e);
            }
        }
        self.exclusions.exclude(pair.low(), pair.high()).await;

        if let Err(e) = self.relationships.delete_pair(&pair).await {
            tracing::warn!(
                "Failed to delete consumed record {}/{}: {}",
                pair.low(),
                pair.high(),
                e
            );
        }
        if let Err(e) = self.requests.delete(&pair).await {
            tracing::warn!("Failed to delete fast match {}: {}", request.id, e);
        }
        if let Err(e) = self
            .notifier
            .cancel_scheduled_notification(request.recipient_id(), request.id)
            .await
        {
            tracing::warn!(
                "Failed to cancel scheduled notification for {}: {}",
                request.id,
                e
            );
        }
        self.analytics
            .record(
                "fast_match.matched",
                serde_json::json!({ "requestId": request.id }),
            )
            .await;

        Ok(MatchOutcome::matched(other_profile))
    }

    /// Delete the pending request between `caller` and `other`.
    ///
    /// Mutual exclusion is applied only on an explicit rejection by the
    /// recipient; an initiator withdrawing their own invitation leaves the
    /// pair discoverable. This asymmetry is a product rule, not an
    /// oversight.
    pub async fn cancel_or_reject(
        &self,
        caller: &str,
        other: &str,
        is_rejection: bool,
    ) -> Result<(), EngineError> {
        let pair = PairKey::new(caller, other)?;

        let request = self
            .requests
            .delete(&pair)
            .await?
            .ok_or_else(|| EngineError::NotFound("fast match request".to_string()))?;

        if let Err(e) = self
            .notifier
            .cancel_scheduled_notification(request.recipient_id(), request.id)
            .await
        {
            tracing::warn!(
                "Failed to cancel scheduled notification for {}: {}",
                request.id,
                e
            );
        }

        if is_rejection {
            self.exclusions.exclude(caller, other).await;
        }

        self.analytics
            .record(
                if is_rejection {
                    "fast_match.rejected"
                } else {
                    "fast_match.cancelled"
                },
                serde_json::json!({ "requestId": request.id }),
            )
            .await;

        Ok(())
    }

    /// Delete every request whose window has lapsed. Returns the count.
    pub async fn cleanup_expired(&self) -> Result<u64, EngineError> {
        let deleted = self.requests.delete_expired(Utc::now()).await?;
        if deleted > 0 {
            tracing::info!("Expired {} fast match requests", deleted);
        }
        Ok(deleted)
    }

    async fn resolve_profile(&self, user_id: &str) -> Result<PublicProfile, EngineError> {
        self.directory
            .find_profile(user_id)
            .await
            .map_err(|e| EngineError::Dependency(e.to_string()))?
            .ok_or_else(|| EngineError::NotFound(format!("user {}", user_id)))
    }
}
