use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::core::pair::{PairKey, PairSide};
use crate::models::{FastMatchRequest, MatchFeature, Relationship, RelationshipStatus};
use crate::store::{FastMatchStore, RelationshipStore, StoreError};

/// In-memory relationship store.
///
/// Each operation runs under a single async lock, which makes the whole
/// find-or-create + set-flag + re-evaluate sequence atomic. Used by tests
/// and by embedded deployments without Postgres.
#[derive(Default)]
pub struct MemoryRelationshipStore {
    inner: Mutex<HashMap<PairKey, Relationship>>,
}

impl MemoryRelationshipStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn fresh(pair: &PairKey, status: RelationshipStatus, feature: MatchFeature) -> Relationship {
        Relationship {
            user_low: pair.low().to_string(),
            user_high: pair.high().to_string(),
            liked_by_low: false,
            liked_by_high: false,
            status,
            feature,
            last_interaction_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RelationshipStore for MemoryRelationshipStore {
    async fn upsert_like(
        &self,
        pair: &PairKey,
        actor: PairSide,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError> {
        let mut map = self.inner.lock().await;
        let rel = map
            .entry(pair.clone())
            .or_insert_with(|| Self::fresh(pair, RelationshipStatus::Pending, feature));

        if rel.status != RelationshipStatus::Disliked {
            match actor {
                PairSide::Low => rel.liked_by_low = true,
                PairSide::High => rel.liked_by_high = true,
            }
            if rel.liked_by_low && rel.liked_by_high {
                rel.status = RelationshipStatus::Matched;
            }
        }
        rel.last_interaction_at = Utc::now();

        Ok(rel.clone())
    }

    async fn upsert_dislike(
        &self,
        pair: &PairKey,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError> {
        let mut map = self.inner.lock().await;
        let rel = map
            .entry(pair.clone())
            .or_insert_with(|| Self::fresh(pair, RelationshipStatus::Disliked, feature));

        rel.status = RelationshipStatus::Disliked;
        rel.last_interaction_at = Utc::now();

        Ok(rel.clone())
    }

    async fn record_match(
        &self,
        pair: &PairKey,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError> {
        let mut map = self.inner.lock().await;
        let rel = map
            .entry(pair.clone())
            .or_insert_with(|| Self::fresh(pair, RelationshipStatus::Pending, feature));

        rel.liked_by_low = true;
        rel.liked_by_high = true;
        rel.status = RelationshipStatus::Matched;
        rel.feature = feature;
        rel.last_interaction_at = Utc::now();

        Ok(rel.clone())
    }

    async fn find_by_pair(&self, pair: &PairKey) -> Result<Option<Relationship>, StoreError> {
        Ok(self.inner.lock().await.get(pair).cloned())
    }

    async fn delete_pair(&self, pair: &PairKey) -> Result<bool, StoreError> {
        Ok(self.inner.lock().await.remove(pair).is_some())
    }
}

/// In-memory fast match store with the same atomicity contract as the
/// Postgres implementation: confirm is conditional on liveness, expired
/// entries are removed lazily on touch.
#[derive(Default)]
pub struct MemoryFastMatchStore {
    inner: Mutex<HashMap<PairKey, FastMatchRequest>>,
}

impl MemoryFastMatchStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FastMatchStore for MemoryFastMatchStore {
    async fn create(
        &self,
        pair: &PairKey,
        initiator: PairSide,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<FastMatchRequest, StoreError> {
        let mut map = self.inner.lock().await;

        if let Some(existing) = map.get(pair) {
            if !existing.is_expired(now) {
                return Err(StoreError::AlreadyExists);
            }
            // Expired leftover, replaced below.
        }

        let initiated_by_low = initiator == PairSide::Low;
        let request = FastMatchRequest {
            id: Uuid::new_v4(),
            user_low: pair.low().to_string(),
            user_high: pair.high().to_string(),
            initiated_by_low,
            confirmed_low: initiated_by_low,
            confirmed_high: !initiated_by_low,
            started_at: now,
            expires_at: now + ttl,
        };
        map.insert(pair.clone(), request.clone());

        Ok(request)
    }

    async fn confirm(
        &self,
        pair: &PairKey,
        side: PairSide,
        now: DateTime<Utc>,
    ) -> Result<FastMatchRequest, StoreError> {
        let mut map = self.inner.lock().await;

        let request = match map.get_mut(pair) {
            Some(r) => r,
            None => return Err(StoreError::NotFound),
        };

        if request.is_expired(now) {
            map.remove(pair);
            return Err(StoreError::Expired);
        }

        match side {
            PairSide::Low => request.confirmed_low = true,
            PairSide::High => request.confirmed_high = true,
        }

        Ok(request.clone())
    }

    async fn find(&self, pair: &PairKey) -> Result<Option<FastMatchRequest>, StoreError> {
        Ok(self.inner.lock().await.get(pair).cloned())
    }

    async fn delete(&self, pair: &PairKey) -> Result<Option<FastMatchRequest>, StoreError> {
        Ok(self.inner.lock().await.remove(pair))
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError> {
        let mut map = self.inner.lock().await;
        let before = map.len();
        map.retain(|_, r| !r.is_expired(now));
        Ok((before - map.len()) as u64)
    }
}
