// Store exports
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::core::pair::{PairKey, PairSide};
use crate::models::{FastMatchRequest, MatchFeature, Relationship};

pub use memory::{MemoryFastMatchStore, MemoryRelationshipStore};
pub use postgres::{connect_pool, PgFastMatchStore, PgRelationshipStore};

/// Errors from the relationship and fast match stores.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("record not found")]
    NotFound,

    #[error("a live record already exists for this pair")]
    AlreadyExists,

    #[error("record has expired")]
    Expired,
}

/// Canonical one-record-per-pair relationship storage.
///
/// Every mutation is a single atomic conditional operation: find-or-create,
/// set the actor's flag and re-evaluate the status in one step. Two
/// concurrent likes must converge on `matched` with the flags of both sides
/// set, never on two records or a lost update.
#[async_trait]
pub trait RelationshipStore: Send + Sync {
    /// Set the actor's liked flag, creating the record if absent. Re-liking
    /// only refreshes the interaction timestamp; a disliked record stays
    /// disliked.
    async fn upsert_like(
        &self,
        pair: &PairKey,
        actor: PairSide,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError>;

    /// Force the record into `disliked`. One side is sufficient.
    async fn upsert_dislike(
        &self,
        pair: &PairKey,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError>;

    /// Write a `matched` record with both flags set (fast match conversion).
    async fn record_match(
        &self,
        pair: &PairKey,
        feature: MatchFeature,
    ) -> Result<Relationship, StoreError>;

    /// Direction-independent lookup.
    async fn find_by_pair(&self, pair: &PairKey) -> Result<Option<Relationship>, StoreError>;

    /// Remove a consumed record. Returns whether anything was deleted.
    async fn delete_pair(&self, pair: &PairKey) -> Result<bool, StoreError>;
}

/// Storage for pending fast match invitations.
#[async_trait]
pub trait FastMatchStore: Send + Sync {
    /// Create a request with the initiator's side pre-confirmed. Fails with
    /// `AlreadyExists` when a live (unexpired) record holds the pair; an
    /// expired leftover is replaced in the same atomic write.
    async fn create(
        &self,
        pair: &PairKey,
        initiator: PairSide,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<FastMatchRequest, StoreError>;

    /// Atomically set the given side's confirmed flag, only if the record
    /// still exists and has not expired. Returns the merged record so the
    /// caller can decide whether both sides are now confirmed.
    async fn confirm(
        &self,
        pair: &PairKey,
        side: PairSide,
        now: DateTime<Utc>,
    ) -> Result<FastMatchRequest, StoreError>;

    /// Direction-independent lookup.
    async fn find(&self, pair: &PairKey) -> Result<Option<FastMatchRequest>, StoreError>;

    /// Delete the record, returning it (its id references the scheduled
    /// notification) or `None` if absent.
    async fn delete(&self, pair: &PairKey) -> Result<Option<FastMatchRequest>, StoreError>;

    /// Sweep all records with `expires_at` in the past. Safe to run
    /// concurrently with `create`, `confirm` and `delete`.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, StoreError>;
}
