// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{FastMatchRequest, MatchFeature, PublicProfile, Relationship, RelationshipStatus};
pub use requests::{FastMatchCancelRequest, PairActionRequest};
pub use responses::{
    CleanupResponse, ErrorResponse, FastMatchCancelResponse, FastMatchRequestResponse,
    HealthResponse, MatchOutcome,
};
