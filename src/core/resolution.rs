use std::sync::Arc;

use crate::core::error::EngineError;
use crate::core::exclusion::ExclusionLedger;
use crate::core::pair::PairKey;
use crate::models::{MatchFeature, MatchOutcome, PublicProfile};
use crate::services::{AnalyticsSink, NotificationSink, UserDirectory};
use crate::store::RelationshipStore;

/// Resolves like and dislike events against the pairwise relationship store
/// and applies the side effects of a terminal outcome.
///
/// The store write is the authoritative transition. Everything after it
/// (matches lists, exclusion, notifications, analytics) is best-effort: a
/// failed side effect is logged and the caller still gets the definitive
/// match/no-match answer.
pub struct MatchResolutionEngine {
    store: Arc<dyn RelationshipStore>,
    directory: Arc<dyn UserDirectory>,
    exclusions: ExclusionLedger,
    notifier: Arc<dyn NotificationSink>,
    analytics: Arc<dyn AnalyticsSink>,
}

impl MatchResolutionEngine {
    pub fn new(
        store: Arc<dyn RelationshipStore>,
        directory: Arc<dyn UserDirectory>,
        notifier: Arc<dyn NotificationSink>,
        analytics: Arc<dyn AnalyticsSink>,
    ) -> Self {
        let exclusions = ExclusionLedger::new(directory.clone());
        Self {
            store,
            directory,
            exclusions,
            notifier,
            analytics,
        }
    }

    pub fn exclusions(&self) -> &ExclusionLedger {
        &self.exclusions
    }

    /// Register that `actor` liked `target`.
    ///
    /// Returns the match outcome; on a mutual like the consumed record is
    /// deleted before the response is returned, so the pair never resurfaces
    /// as pending.
    pub async fn like(&self, actor: &str, target: &str) -> Result<MatchOutcome, EngineError> {
        let pair = PairKey::new(actor, target)?;
        let target_profile = self.resolve_profile(target).await?;
        let side = pair.side_of(actor).ok_or(EngineError::InvalidActor)?;

        let relationship = self
            .store
            .upsert_like(&pair, side, MatchFeature::Standard)
            .await?;

        if relationship.is_matched() {
            tracing::info!("Matched: {} and {}", pair.low(), pair.high());
            self.finalize_match(&pair).await;
            self.notify_match(actor, target).await;
            self.analytics
                .record(
                    "match.matched",
                    serde_json::json!({ "userLow": pair.low(), "userHigh": pair.high() }),
                )
                .await;
            return Ok(MatchOutcome::matched(target_profile));
        }

        if let Err(e) = self.notifier.notify_like_counter(target).await {
            tracing::warn!("Like counter notification to {} failed: {}", target, e);
        }
        self.analytics
            .record(
                "match.liked",
                serde_json::json!({ "actor": actor, "target": target }),
            )
            .await;

        Ok(MatchOutcome::no_match())
    }

    /// Register that `actor` disliked `target`. One side is sufficient; the
    /// pair is excluded from discovery and the record dropped immediately.
    pub async fn dislike(&self, actor: &str, target: &str) -> Result<MatchOutcome, EngineError> {
        let pair = PairKey::new(actor, target)?;
        self.resolve_profile(target).await?;

        self.store
            .upsert_dislike(&pair, MatchFeature::Standard)
            .await?;

        self.exclusions.exclude(actor, target).await;
        self.consume(&pair).await;
        self.analytics
            .record(
                "match.disliked",
                serde_json::json!({ "actor": actor, "target": target }),
            )
            .await;

        Ok(MatchOutcome::no_match())
    }

    async fn resolve_profile(&self, user_id: &str) -> Result<PublicProfile, EngineError> {
        self.directory
            .find_profile(user_id)
            .await
            .map_err(|e| EngineError::Dependency(e.to_string()))?
            .ok_or_else(|| EngineError::NotFound(format!("user {}", user_id)))
    }

    /// Side effects of a mutual match: both users land in each other's
    /// matches list and exclusion set, then the consumed record is dropped.
    async fn finalize_match(&self, pair: &PairKey) {
        for (a, b) in [(pair.low(), pair.high()), (pair.high(), pair.low())] {
            if let Err(e) = self.directory.add_match(a, b).await {
                tracing::warn!("Failed to add {} to matches of {}: {}", b, a, e);
            }
        }
        self.exclusions.exclude(pair.low(), pair.high()).await;
        self.consume(pair).await;
    }

    async fn notify_match(&self, actor: &str, target: &str) {
        // The notification carries the actor's public snippet; a missing
        // profile degrades to no notification, never to a failed match.
        match self.directory.find_profile(actor).await {
            Ok(Some(actor_profile)) => {
                if let Err(e) = self.notifier.notify_match(target, &actor_profile).await {
                    tracing::warn!("Match notification to {} failed: {}", target, e);
                }
            }
            Ok(None) => {
                tracing::warn!("Actor {} vanished before match notification", actor);
            }
            Err(e) => {
                tracing::warn!("Could not load {} for match notification: {}", actor, e);
            }
        }
    }

    async fn consume(&self, pair: &PairKey) {
        match self.store.delete_pair(pair).await {
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(
                    "Failed to delete consumed record {}/{}: {}",
                    pair.low(),
                    pair.high(),
                    e
                );
            }
        }
    }
}
