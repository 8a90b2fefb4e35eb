//! Matching properties end to end: pairing, duplicates, retries, hops and
//! concurrent dispatch.

use std::sync::Arc;

use tl_03_matching_engine::{
    Correlation, DeliveryOutcome, InboundMessage, Leg, MatchResult, MatchingApi, OutboundMessage,
    PendingRole, RelayStage, ResultKind, Waypoint,
};

use super::fixtures::{inbound, node, outbound, START_MS};

fn kinds(results: &[MatchResult]) -> Vec<ResultKind> {
    results.iter().map(MatchResult::kind).collect()
}

#[tokio::test]
async fn test_example_scenario_leaves_no_trace() {
    let mut n = node();

    n.engine().on_outbound(outbound("0xc1")).await.unwrap();
    n.engine()
        .on_inbound(inbound("0xc1", DeliveryOutcome::Received))
        .await
        .unwrap();

    let results = n.drain().await;
    assert_eq!(kinds(&results), vec![ResultKind::Sent, ResultKind::Received]);
    assert_eq!(results[0].key().as_str(), "0xc1");
    match &results[1] {
        MatchResult::Received { key, outbound, .. } => {
            assert_eq!(key.as_str(), "0xc1");
            assert_eq!(outbound.origin.chain_id.as_str(), "A");
            assert_eq!(outbound.origin.block_number, 10);
        }
        other => panic!("expected Received, got {other:?}"),
    }
    assert!(n.pending_keys().await.is_empty());

    // The expiry task outlives the match but fires into nothing.
    n.clock.advance(10_000);
    n.sweep().await;
    assert!(n.drain().await.is_empty());
    assert_eq!(n.container.janitor.pending_tasks().await.unwrap(), 0);
}

#[tokio::test]
async fn test_either_order_matches_once() {
    let mut n = node();

    n.engine().on_outbound(outbound("0x01")).await.unwrap();
    n.engine()
        .on_inbound(inbound("0x01", DeliveryOutcome::Received))
        .await
        .unwrap();
    n.engine()
        .on_inbound(inbound("0x02", DeliveryOutcome::Received))
        .await
        .unwrap();
    n.engine().on_outbound(outbound("0x02")).await.unwrap();

    let results = n.drain().await;
    for key in ["0x01", "0x02"] {
        let for_key: Vec<_> = results
            .iter()
            .filter(|r| r.key().as_str() == key)
            .map(MatchResult::kind)
            .collect();
        assert_eq!(for_key, vec![ResultKind::Sent, ResultKind::Received], "{key}");
    }
    assert!(n.pending_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_pair_matches_once() {
    let mut n = node();

    for i in 0..50u32 {
        let commitment = format!("0x{i:02x}");
        let engine = Arc::clone(n.engine());
        let out = outbound(&commitment);
        let a = tokio::spawn(async move { engine.on_outbound(out).await });
        let engine = Arc::clone(n.engine());
        let inb = inbound(&commitment, DeliveryOutcome::Received);
        let b = tokio::spawn(async move { engine.on_inbound(inb).await });
        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();
    }

    let results = n.drain().await;
    assert_eq!(results.iter().filter(|r| r.is_terminal()).count(), 50);
    assert!(n.pending_keys().await.is_empty());
}

#[tokio::test]
async fn test_duplicate_outbound_stored_once() {
    let mut n = node();

    n.engine().on_outbound(outbound("0xd1")).await.unwrap();
    n.engine().on_outbound(outbound("0xd1")).await.unwrap();

    assert_eq!(kinds(&n.drain().await), vec![ResultKind::Sent]);
    assert_eq!(
        n.pending_keys().await,
        vec![(PendingRole::Outbound, "0xd1".to_string())]
    );
    assert_eq!(n.container.janitor.pending_tasks().await.unwrap(), 1);
}

#[tokio::test]
async fn test_failed_delivery_then_retry_succeeds() {
    let mut n = node();
    let msg = outbound("0xe1").with_timeout_at(START_MS + 5_000);

    n.engine().on_outbound(msg).await.unwrap();
    n.engine()
        .on_inbound(inbound("0xe1", DeliveryOutcome::Failed))
        .await
        .unwrap();

    let results = n.drain().await;
    assert_eq!(kinds(&results), vec![ResultKind::Sent, ResultKind::Received]);
    assert!(matches!(
        &results[1],
        MatchResult::Received { inbound, .. } if inbound.outcome == DeliveryOutcome::Failed
    ));
    assert_eq!(
        n.pending_keys().await,
        vec![(PendingRole::Retry, "0xe1".to_string())]
    );

    n.engine()
        .on_inbound(inbound("0xe1", DeliveryOutcome::Received))
        .await
        .unwrap();

    let results = n.drain().await;
    assert_eq!(kinds(&results), vec![ResultKind::Received]);
    assert!(matches!(
        &results[0],
        MatchResult::Received { inbound, .. } if inbound.outcome == DeliveryOutcome::Received
    ));
    assert!(n.pending_keys().await.is_empty());
}

#[tokio::test]
async fn test_multi_leg_journey() {
    let mut n = node();
    let legs: Vec<Leg> = serde_json::from_str(
        r#"[{"from":"A","to":"B","type":"hop"},{"from":"B","to":"C","type":"hrmp"}]"#,
    )
    .unwrap();

    let first = Correlation::message("sub-1", "m-1");
    let first_leg =
        OutboundMessage::new(first.clone(), Waypoint::new("A", 1), "C").with_legs(legs.clone());
    let first_key = first_leg.correlation_key().unwrap();
    assert_eq!(first_key.as_str(), "sub-1:m-1:B");

    n.engine().on_outbound(first_leg).await.unwrap();
    n.engine()
        .on_inbound(InboundMessage::new(
            first,
            Waypoint::new("B", 2),
            DeliveryOutcome::Received,
        ))
        .await
        .unwrap();

    let second = Correlation::message("sub-1", "m-2");
    n.engine()
        .on_outbound(
            OutboundMessage::new(second.clone(), Waypoint::new("B", 3), "C")
                .with_legs(legs[1..].to_vec())
                .with_forward_id(first_key.as_str()),
        )
        .await
        .unwrap();
    n.engine()
        .on_inbound(InboundMessage::new(
            second,
            Waypoint::new("C", 4),
            DeliveryOutcome::Received,
        ))
        .await
        .unwrap();

    let results = n.drain().await;
    assert_eq!(
        kinds(&results),
        vec![
            ResultKind::Sent,
            ResultKind::Relayed,
            ResultKind::Sent,
            ResultKind::Received
        ]
    );
    assert!(matches!(
        &results[1],
        MatchResult::Relayed { stage: RelayStage::Hop { waypoint }, .. }
            if waypoint.chain_id.as_str() == "B"
    ));
    assert_eq!(results[3].key().as_str(), "sub-1:m-2:C");
    assert!(n.pending_keys().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_hundred_keys_concurrently() {
    let mut n = node();
    let api: Arc<dyn MatchingApi> = n.engine().clone();

    let mut handles = Vec::new();
    for i in 0..100u32 {
        let commitment = format!("0x{i:04x}");
        let out_api = Arc::clone(&api);
        let out = outbound(&commitment);
        handles.push(tokio::spawn(async move { out_api.on_outbound(out).await }));
        let in_api = Arc::clone(&api);
        let inb = inbound(&commitment, DeliveryOutcome::Received);
        handles.push(tokio::spawn(async move { in_api.on_inbound(inb).await }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let results = n.drain().await;
    assert_eq!(results.iter().filter(|r| r.is_terminal()).count(), 100);
    assert_eq!(
        results
            .iter()
            .filter(|r| r.kind() == ResultKind::Sent)
            .count(),
        100
    );
    assert!(n.pending_keys().await.is_empty());
}
