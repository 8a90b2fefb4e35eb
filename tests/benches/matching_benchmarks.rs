//! # Tracelink Matching Benchmarks
//!
//! | Scenario | Target |
//! |----------|--------|
//! | Outbound + inbound pair, in-memory store | < 100µs per pair |
//! | Sweep of unmatched outbounds | < 1ms per 100 entries |

use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tl_01_correlation_store::LevelStore;
use tl_02_janitor::{Janitor, JanitorConfig, ManualTimeSource, Scheduler};
use tl_03_matching_engine::{
    ChannelReceiver, Correlation, DeliveryOutcome, EngineContext, InboundMessage,
    MatchingConfig, MatchingEngine, OutboundMessage, Waypoint,
};

fn wire() -> (Arc<MatchingEngine>, Arc<Janitor>, Arc<ManualTimeSource>) {
    let store = LevelStore::in_memory().into_shared();
    let clock = Arc::new(ManualTimeSource::new(0));
    let janitor = Arc::new(Janitor::new(
        Arc::clone(&store),
        clock.clone(),
        JanitorConfig::default(),
    ));
    // Results are dropped; the bench measures matching only.
    let (receiver, _results) = ChannelReceiver::new();
    let engine = Arc::new(MatchingEngine::new(EngineContext {
        store,
        janitor: janitor.clone(),
        receiver: Arc::new(receiver),
        clock: clock.clone(),
        config: MatchingConfig::default(),
    }));
    (engine, janitor, clock)
}

fn bench_matched_pairs(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("tl-03-matching");
    group.measurement_time(Duration::from_secs(10));

    for pairs in [10u64, 100, 1_000] {
        group.throughput(Throughput::Elements(pairs));
        group.bench_with_input(BenchmarkId::new("pairs", pairs), &pairs, |b, &pairs| {
            b.to_async(&rt).iter(|| async move {
                let (engine, _janitor, _clock) = wire();
                for i in 0..pairs {
                    let correlation = Correlation::commitment(format!("0x{i:x}"));
                    engine
                        .on_outbound(OutboundMessage::new(
                            correlation.clone(),
                            Waypoint::new("A", i),
                            "B",
                        ))
                        .await
                        .unwrap();
                    engine
                        .on_inbound(InboundMessage::new(
                            correlation,
                            Waypoint::new("B", i),
                            DeliveryOutcome::Received,
                        ))
                        .await
                        .unwrap();
                }
            })
        });
    }
    group.finish();
}

fn bench_sweep(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("tl-02-janitor");

    group.bench_function("sweep_100_unmatched", |b| {
        b.to_async(&rt).iter(|| async {
            let (engine, janitor, clock) = wire();
            let mut sweeps = janitor.subscribe();
            for i in 0..100u64 {
                engine
                    .on_outbound(OutboundMessage::new(
                        Correlation::commitment(format!("0x{i:x}")),
                        Waypoint::new("A", i),
                        "B",
                    ))
                    .await
                    .unwrap();
            }
            clock.advance(MatchingConfig::default().timeout_ms);
            janitor.sweep_due().await.unwrap();
            while let Ok(Some(event)) = sweeps.try_recv() {
                engine.on_sweep(event).await.unwrap();
            }
        })
    });
    group.finish();
}

criterion_group!(benches, bench_matched_pairs, bench_sweep);
criterion_main!(benches);
