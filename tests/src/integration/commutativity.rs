//! Arbitrary delivery orders converge on the same outcome.

use std::collections::BTreeMap;
use std::sync::Arc;

use proptest::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tl_03_matching_engine::{DeliveryOutcome, MatchingApi, ResultKind};

use super::fixtures::{inbound, node, outbound, Node};

#[derive(Clone, Copy, Debug)]
enum Step {
    Out(u32),
    In(u32),
}

fn steps(keys: u32) -> Vec<Step> {
    (0..keys).flat_map(|k| [Step::Out(k), Step::In(k)]).collect()
}

fn commitment(k: u32) -> String {
    format!("0x{k:03x}")
}

async fn apply(api: &dyn MatchingApi, step: Step) {
    match step {
        Step::Out(k) => api.on_outbound(outbound(&commitment(k))).await.unwrap(),
        Step::In(k) => api
            .on_inbound(inbound(&commitment(k), DeliveryOutcome::Received))
            .await
            .unwrap(),
    }
}

/// Result kinds per key, in emission order.
async fn outcome(n: &mut Node) -> BTreeMap<String, Vec<ResultKind>> {
    let mut per_key: BTreeMap<String, Vec<ResultKind>> = BTreeMap::new();
    for result in n.drain().await {
        per_key
            .entry(result.key().as_str().to_string())
            .or_default()
            .push(result.kind());
    }
    per_key
}

fn expected(keys: u32) -> BTreeMap<String, Vec<ResultKind>> {
    (0..keys)
        .map(|k| (commitment(k), vec![ResultKind::Sent, ResultKind::Received]))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_any_order_matches_every_pair(
        (keys, order) in (1u32..12)
            .prop_flat_map(|keys| (Just(keys), Just(steps(keys)).prop_shuffle()))
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        let (per_key, leftover) = rt.block_on(async {
            let mut n = node();
            for step in order {
                apply(n.engine().as_ref(), step).await;
            }
            (outcome(&mut n).await, n.pending_keys().await)
        });

        prop_assert_eq!(per_key, expected(keys));
        prop_assert!(leftover.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shuffled_concurrent_delivery() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x7ace);

    for _ in 0..5 {
        let mut n = node();
        let mut order = steps(40);
        order.shuffle(&mut rng);

        let api: Arc<dyn MatchingApi> = n.engine().clone();
        let handles: Vec<_> = order
            .into_iter()
            .map(|step| {
                let api = Arc::clone(&api);
                tokio::spawn(async move { apply(api.as_ref(), step).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(outcome(&mut n).await, expected(40));
        assert!(n.pending_keys().await.is_empty());
    }
}
