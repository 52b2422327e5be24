use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request body shared by like, dislike, fast-match request and accept.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PairActionRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}

/// Request body for cancelling or rejecting a fast match invitation.
///
/// `isRejection` controls whether mutual exclusion is applied: a recipient's
/// decline excludes the pair permanently, an initiator's withdrawal does not.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FastMatchCancelRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
    #[serde(default)]
    #[serde(alias = "is_rejection", rename = "isRejection")]
    pub is_rejection: bool,
}
