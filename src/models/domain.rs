use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::pair::PairSide;

/// Public slice of a user record, as returned to callers and embedded in
/// notification payloads. The full profile lives in the user directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PublicProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u8,
    #[serde(rename = "isVerified", default)]
    pub is_verified: bool,
    #[serde(rename = "imageFileIds", default)]
    pub image_file_ids: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Lifecycle state of a pairwise relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
pub enum RelationshipStatus {
    Pending,
    Matched,
    Disliked,
}

/// Which matching mode produced a relationship record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "match_feature", rename_all = "snake_case")]
pub enum MatchFeature {
    Standard,
    Fast,
    OneNight,
}

/// Canonical record of the interaction state between exactly two users.
///
/// `user_low < user_high` holds after every write, so `{A,B}` and `{B,A}`
/// always map to the same record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub user_low: String,
    pub user_high: String,
    pub liked_by_low: bool,
    pub liked_by_high: bool,
    pub status: RelationshipStatus,
    pub feature: MatchFeature,
    pub last_interaction_at: DateTime<Utc>,
}

impl Relationship {
    pub fn liked_by(&self, side: PairSide) -> bool {
        match side {
            PairSide::Low => self.liked_by_low,
            PairSide::High => self.liked_by_high,
        }
    }

    pub fn is_matched(&self) -> bool {
        self.status == RelationshipStatus::Matched
    }
}

/// A pending fast match invitation with a hard expiry.
///
/// The requester's side starts confirmed; the record dies on double
/// confirmation, cancellation, rejection, or expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FastMatchRequest {
    pub id: Uuid,
    pub user_low: String,
    pub user_high: String,
    pub initiated_by_low: bool,
    pub confirmed_low: bool,
    pub confirmed_high: bool,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl FastMatchRequest {
    pub fn confirmed(&self, side: PairSide) -> bool {
        match side {
            PairSide::Low => self.confirmed_low,
            PairSide::High => self.confirmed_high,
        }
    }

    pub fn both_confirmed(&self) -> bool {
        self.confirmed_low && self.confirmed_high
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Which side initiated the request.
    pub fn initiator(&self) -> PairSide {
        if self.initiated_by_low {
            PairSide::Low
        } else {
            PairSide::High
        }
    }

    /// User id of the invited party (the non-initiator).
    pub fn recipient_id(&self) -> &str {
        if self.initiated_by_low {
            &self.user_high
        } else {
            &self.user_low
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn request(initiated_by_low: bool) -> FastMatchRequest {
        let now = Utc::now();
        FastMatchRequest {
            id: Uuid::new_v4(),
            user_low: "alice".to_string(),
            user_high: "bob".to_string(),
            initiated_by_low,
            confirmed_low: initiated_by_low,
            confirmed_high: !initiated_by_low,
            started_at: now,
            expires_at: now + Duration::minutes(10),
        }
    }

    #[test]
    fn test_recipient_is_the_non_initiator() {
        assert_eq!(request(true).recipient_id(), "bob");
        assert_eq!(request(false).recipient_id(), "alice");
    }

    #[test]
    fn test_expiry_boundary() {
        let req = request(true);
        assert!(!req.is_expired(req.started_at));
        assert!(req.is_expired(req.expires_at));
        assert!(req.is_expired(req.expires_at + Duration::seconds(1)));
    }

    #[test]
    fn test_both_confirmed() {
        let mut req = request(true);
        assert!(!req.both_confirmed());
        req.confirmed_high = true;
        assert!(req.both_confirmed());
    }
}
