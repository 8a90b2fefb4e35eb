//! Janitor-driven expiry with the background loops running, and restarts
//! over a surviving store.

use std::sync::Arc;

use tl_01_correlation_store::LevelStore;
use tl_02_janitor::ManualTimeSource;
use tl_03_matching_engine::{
    BridgeMessage, Correlation, DeliveryOutcome, MatchResult, PendingRole, RelayDirection,
    RelayMessage, ResultKind, Waypoint,
};

use super::fixtures::{inbound, node, node_on, outbound, START_MS};

#[tokio::test]
async fn test_unmatched_outbound_expires() {
    let mut n = node();
    n.container.start();

    n.engine().on_outbound(outbound("0xa1")).await.unwrap();
    assert!(matches!(n.next_result().await, Some(MatchResult::Sent { .. })));

    n.clock.advance(1_000);
    match n.next_result().await {
        Some(MatchResult::Unmatched { key, outbound }) => {
            assert_eq!(key.as_str(), "0xa1");
            assert_eq!(outbound.destination.as_str(), "B");
        }
        other => panic!("expected Unmatched, got {other:?}"),
    }

    n.engine().flush().await;
    assert!(n.pending_keys().await.is_empty());
    // The engine acknowledged the sweep in the same batch
    assert_eq!(n.container.janitor.pending_tasks().await.unwrap(), 0);
    n.container.shutdown().await;
}

#[tokio::test]
async fn test_non_outbound_roles_age_out_silently() {
    let mut n = node();

    n.engine()
        .on_inbound(inbound("0xa2", DeliveryOutcome::Received))
        .await
        .unwrap();
    n.engine()
        .on_relay(RelayMessage::new(
            Correlation::commitment("0xa3"),
            "B",
            Waypoint::new("R", 1),
            RelayDirection::Out,
        ))
        .await
        .unwrap();
    n.engine()
        .on_bridge_delivered(BridgeMessage::new("lane-7", 1, Waypoint::new("BH", 1)))
        .await
        .unwrap();
    assert_eq!(n.pending_keys().await.len(), 3);

    n.clock.advance(2_000);
    n.sweep().await;

    assert!(n.drain().await.is_empty());
    assert!(n.pending_keys().await.is_empty());
    assert_eq!(n.container.janitor.pending_tasks().await.unwrap(), 0);
}

#[tokio::test]
async fn test_entries_survive_until_due() {
    let mut n = node();

    n.engine().on_outbound(outbound("0xa4")).await.unwrap();
    n.clock.advance(999);
    n.sweep().await;

    assert_eq!(
        n.drain().await.iter().map(MatchResult::kind).collect::<Vec<_>>(),
        vec![ResultKind::Sent]
    );
    assert_eq!(
        n.pending_keys().await,
        vec![(PendingRole::Outbound, "0xa4".to_string())]
    );
}

#[tokio::test]
async fn test_expired_retry_entry_is_silent() {
    let mut n = node();

    n.engine().on_outbound(outbound("0xa5")).await.unwrap();
    n.engine()
        .on_inbound(inbound("0xa5", DeliveryOutcome::Failed))
        .await
        .unwrap();
    n.drain().await;

    // No declared timeout: the retry entry lives for `timeout_ms`.
    n.clock.advance(1_000);
    n.sweep().await;

    assert!(n.drain().await.is_empty());
    assert!(n.pending_keys().await.is_empty());
}

#[tokio::test]
async fn test_pending_expiry_survives_restart() {
    let store = LevelStore::in_memory().into_shared();

    let mut first = node_on(Arc::clone(&store), Arc::new(ManualTimeSource::new(START_MS)));
    first.container.start();
    first.engine().on_outbound(outbound("0xa6")).await.unwrap();
    assert!(matches!(first.next_result().await, Some(MatchResult::Sent { .. })));
    assert_eq!(first.container.janitor.pending_tasks().await.unwrap(), 1);
    first.container.shutdown().await;

    let mut second = node_on(store, Arc::new(ManualTimeSource::new(START_MS + 5_000)));
    second.container.start();

    match second.next_result().await {
        Some(MatchResult::Unmatched { key, .. }) => assert_eq!(key.as_str(), "0xa6"),
        other => panic!("expected Unmatched, got {other:?}"),
    }
    second.engine().flush().await;
    assert!(second.pending_keys().await.is_empty());
    second.container.shutdown().await;
}

#[tokio::test]
async fn test_match_after_restart() {
    let store = LevelStore::in_memory().into_shared();

    let mut first = node_on(Arc::clone(&store), Arc::new(ManualTimeSource::new(START_MS)));
    first.engine().on_outbound(outbound("0xa7")).await.unwrap();
    first.drain().await;
    first.container.shutdown().await;

    let mut second = node_on(store, Arc::new(ManualTimeSource::new(START_MS + 10)));
    second
        .engine()
        .on_inbound(inbound("0xa7", DeliveryOutcome::Received))
        .await
        .unwrap();

    let results = second.drain().await;
    assert_eq!(results.len(), 1);
    assert!(matches!(
        &results[0],
        MatchResult::Received { outbound, .. } if outbound.origin.chain_id.as_str() == "A"
    ));
}
