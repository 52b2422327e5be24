//! Amora Match - pairwise match and consent engine for the Amora dating app
//!
//! This library implements the match/like/dislike state machine, the
//! time-boxed fast match variant with concurrent-accept resolution, and the
//! exclusion bookkeeping both depend on. Profile storage, push delivery and
//! discovery filtering are external collaborators behind traits.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

// Re-export commonly used types
pub use self::core::{EngineError, ExclusionLedger, FastMatchEngine, MatchResolutionEngine, PairKey, PairSide};
pub use models::{FastMatchRequest, MatchFeature, MatchOutcome, PublicProfile, Relationship, RelationshipStatus};
pub use store::{FastMatchStore, RelationshipStore};
