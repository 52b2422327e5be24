use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::domain::PublicProfile;

/// Definitive answer to a like or fast-match accept.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchOutcome {
    #[serde(rename = "isMatch")]
    pub is_match: bool,
    #[serde(rename = "matchedUser", skip_serializing_if = "Option::is_none")]
    pub matched_user: Option<PublicProfile>,
}

impl MatchOutcome {
    pub fn matched(profile: PublicProfile) -> Self {
        Self {
            is_match: true,
            matched_user: Some(profile),
        }
    }

    pub fn no_match() -> Self {
        Self {
            is_match: false,
            matched_user: None,
        }
    }
}

/// Response for a created fast match request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastMatchRequestResponse {
    #[serde(rename = "requestId")]
    pub request_id: Uuid,
}

/// Response for a cancelled or rejected fast match request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastMatchCancelResponse {
    pub status: String,
}

/// Response for the expiry sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleanupResponse {
    #[serde(rename = "deletedCount")]
    pub deleted_count: u64,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}
