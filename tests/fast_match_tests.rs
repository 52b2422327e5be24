// Integration tests for the time-boxed fast match flow

use std::sync::Arc;

use chrono::Duration;

use amora_match::core::{EngineError, FastMatchEngine, PairKey};
use amora_match::models::PublicProfile;
use amora_match::services::{
    MemoryUserDirectory, NoopAnalytics, NotificationEvent, RecordingNotifications, UserDirectory,
};
use amora_match::store::{
    FastMatchStore, MemoryFastMatchStore, MemoryRelationshipStore, RelationshipStore,
};

struct Harness {
    engine: Arc<FastMatchEngine>,
    directory: Arc<MemoryUserDirectory>,
    notifications: Arc<RecordingNotifications>,
    relationships: Arc<MemoryRelationshipStore>,
    requests: Arc<MemoryFastMatchStore>,
}

fn profile(id: &str) -> PublicProfile {
    PublicProfile {
        user_id: id.to_string(),
        name: format!("User {}", id),
        age: 27,
        is_verified: false,
        image_file_ids: vec![],
        description: None,
    }
}

async fn harness(ttl: Duration) -> Harness {
    let relationships = Arc::new(MemoryRelationshipStore::new());
    let requests = Arc::new(MemoryFastMatchStore::new());
    let directory = Arc::new(MemoryUserDirectory::new());
    let notifications = Arc::new(RecordingNotifications::new());

    for id in ["1", "2", "3"] {
        directory.insert_profile(profile(id)).await;
    }

    let engine = Arc::new(FastMatchEngine::new(
        relationships.clone(),
        requests.clone(),
        directory.clone(),
        notifications.clone(),
        Arc::new(NoopAnalytics),
        ttl,
    ));

    Harness {
        engine,
        directory,
        notifications,
        relationships,
        requests,
    }
}

#[tokio::test]
async fn test_request_notifies_recipient_with_request_id() {
    let h = harness(Duration::minutes(10)).await;

    let request_id = h.engine.request("1", "2").await.unwrap();

    let events = h.notifications.events().await;
    assert_eq!(
        events,
        vec![NotificationEvent::FastMatchRequest {
            target_id: "2".to_string(),
            request_id,
        }]
    );
}

#[tokio::test]
async fn test_duplicate_request_rejected_in_either_direction() {
    let h = harness(Duration::minutes(10)).await;

    h.engine.request("1", "2").await.unwrap();

    let err = h.engine.request("2", "1").await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists));

    let err = h.engine.request("1", "2").await.unwrap_err();
    assert!(matches!(err, EngineError::AlreadyExists));
}

#[tokio::test]
async fn test_self_request_rejected() {
    let h = harness(Duration::minutes(10)).await;

    let err = h.engine.request("1", "1").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidActor));
}

#[tokio::test]
async fn test_recipient_accept_produces_match_and_cleans_up() {
    let h = harness(Duration::minutes(10)).await;

    let request_id = h.engine.request("1", "2").await.unwrap();
    let outcome = h.engine.accept("2", "1").await.unwrap();

    assert!(outcome.is_match);
    assert_eq!(outcome.matched_user.unwrap().user_id, "1");

    // Fast match record is gone, the converted relationship was consumed.
    let pair = PairKey::new("1", "2").unwrap();
    assert!(h.requests.find(&pair).await.unwrap().is_none());
    assert!(h.relationships.find_by_pair(&pair).await.unwrap().is_none());

    // Both users see each other in matches and exclusions.
    assert!(h.directory.matches_of("1").await.contains("2"));
    assert!(h.directory.matches_of("2").await.contains("1"));
    assert!(h.directory.is_excluded("1", "2").await.unwrap());
    assert!(h.directory.is_excluded("2", "1").await.unwrap());

    // The scheduled invitation notification was withdrawn.
    let events = h.notifications.events().await;
    assert!(events.contains(&NotificationEvent::Cancelled {
        target_id: "2".to_string(),
        request_id,
    }));
}

#[tokio::test]
async fn test_initiator_accept_does_not_match() {
    let h = harness(Duration::minutes(10)).await;

    h.engine.request("1", "2").await.unwrap();

    // The initiator re-confirming their own invitation changes nothing; the
    // counterpart has not confirmed yet.
    let outcome = h.engine.accept("1", "2").await.unwrap();
    assert!(!outcome.is_match);

    let pair = PairKey::new("1", "2").unwrap();
    assert!(h.requests.find(&pair).await.unwrap().is_some());
    assert!(h.directory.matches_of("1").await.is_empty());
}

#[tokio::test]
async fn test_accept_without_request_is_not_found() {
    let h = harness(Duration::minutes(10)).await;

    let err = h.engine.accept("2", "1").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_accept_on_expired_request_never_matches() {
    let h = harness(Duration::seconds(0)).await;

    h.engine.request("1", "2").await.unwrap();

    let err = h.engine.accept("2", "1").await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Expired | EngineError::NotFound(_)
    ));

    // No relationship, no matches, no exclusion.
    let pair = PairKey::new("1", "2").unwrap();
    assert!(h.relationships.find_by_pair(&pair).await.unwrap().is_none());
    assert!(h.directory.matches_of("1").await.is_empty());
    assert!(!h.directory.is_excluded("1", "2").await.unwrap());
}

#[tokio::test]
async fn test_initiator_cancel_leaves_pair_discoverable() {
    let h = harness(Duration::minutes(10)).await;

    h.engine.request("1", "2").await.unwrap();
    h.engine.cancel_or_reject("1", "2", false).await.unwrap();

    let pair = PairKey::new("1", "2").unwrap();
    assert!(h.requests.find(&pair).await.unwrap().is_none());

    // Withdrawal by the initiator must not exclude the pair.
    assert!(!h.directory.is_excluded("1", "2").await.unwrap());
    assert!(!h.directory.is_excluded("2", "1").await.unwrap());
}

#[tokio::test]
async fn test_recipient_rejection_excludes_both_sides() {
    let h = harness(Duration::minutes(10)).await;

    h.engine.request("1", "2").await.unwrap();
    h.engine.cancel_or_reject("2", "1", true).await.unwrap();

    let pair = PairKey::new("1", "2").unwrap();
    assert!(h.requests.find(&pair).await.unwrap().is_none());

    assert!(h.directory.is_excluded("1", "2").await.unwrap());
    assert!(h.directory.is_excluded("2", "1").await.unwrap());
}

#[tokio::test]
async fn test_cancel_without_request_is_not_found() {
    let h = harness(Duration::minutes(10)).await;

    let err = h.engine.cancel_or_reject("1", "2", false).await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));
}

#[tokio::test]
async fn test_cleanup_deletes_only_expired_requests() {
    let expired = harness(Duration::seconds(0)).await;
    expired.engine.request("1", "2").await.unwrap();
    expired.engine.request("1", "3").await.unwrap();

    let deleted = expired.engine.cleanup_expired().await.unwrap();
    assert_eq!(deleted, 2);

    // After the sweep an accept must fail cleanly, not crash.
    let err = expired.engine.accept("2", "1").await.unwrap_err();
    assert!(matches!(err, EngineError::NotFound(_)));

    let live = harness(Duration::minutes(10)).await;
    live.engine.request("1", "2").await.unwrap();
    assert_eq!(live.engine.cleanup_expired().await.unwrap(), 0);
}

#[tokio::test]
async fn test_request_reuses_slot_after_expiry() {
    let h = harness(Duration::seconds(0)).await;

    h.engine.request("1", "2").await.unwrap();

    // The previous invitation has already lapsed; a fresh request replaces
    // it instead of failing with AlreadyExists.
    let second = h.engine.request("2", "1").await;
    assert!(second.is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_accept_races_cleanly_with_expiry_sweep() {
    for _ in 0..50 {
        let h = harness(Duration::seconds(0)).await;
        h.engine.request("1", "2").await.unwrap();

        let acceptor = h.engine.clone();
        let sweeper = h.engine.clone();
        let accept = tokio::spawn(async move { acceptor.accept("2", "1").await });
        let sweep = tokio::spawn(async move { sweeper.cleanup_expired().await });

        // Whichever wins, the accept must fail with a clean taxonomy error
        // and never produce a match.
        let accept_result = accept.await.unwrap();
        sweep.await.unwrap().unwrap();

        match accept_result {
            Err(EngineError::Expired) | Err(EngineError::NotFound(_)) => {}
            other => panic!("expected Expired or NotFound, got {:?}", other.map(|o| o.is_match)),
        }
        assert!(h.directory.matches_of("1").await.is_empty());
    }
}
