//! JSON lines in, JSON lines out, through the runtime's ingest loop and
//! result sink.

use std::sync::Arc;

use serde_json::Value;
use tl_01_correlation_store::LevelStore;
use tl_02_janitor::ManualTimeSource;
use tl_runtime::ingest::run_ingest;
use tl_runtime::{IngestStats, JsonLinesReceiver, TracelinkContainer};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::fixtures::{test_config, START_MS};

const INPUT: &str = r#"
{"kind":"outbound","commitment":"0xC1","origin":{"chainId":"A","blockNumber":10},"destination":"B"}
{"kind":"relay","commitment":"0xc1","destination":"B","relay":{"chainId":"R","blockNumber":11},"direction":"out"}
this line is not an event
{"kind":"inbound","commitment":"0xc1","destination":{"chainId":"B","blockNumber":12},"outcome":"Received"}
{"kind":"inbound","destination":{"chainId":"B","blockNumber":13}}
{"kind":"bridge-inbound","channelId":"lane-1","nonce":5,"waypoint":{"chainId":"X","blockNumber":3}}
{"kind":"bridge-accepted","channelId":"lane-1","nonce":5,"waypoint":{"chainId":"BH","blockNumber":1}}
"#;

#[tokio::test]
async fn test_ingest_writes_results_as_json_lines() {
    let (sink, source) = tokio::io::duplex(64 * 1024);
    let container = TracelinkContainer::from_parts(
        &test_config(),
        LevelStore::in_memory().into_shared(),
        Arc::new(ManualTimeSource::new(START_MS)),
        Arc::new(JsonLinesReceiver::new(sink)),
    );

    let stats = run_ingest(INPUT.as_bytes(), container.engine.as_ref())
        .await
        .unwrap();
    assert_eq!(
        stats,
        IngestStats {
            lines: 7,
            dispatched: 5,
            malformed: 1,
            failed: 1,
        }
    );
    container.engine.flush().await;

    let mut lines = BufReader::new(source).lines();
    let mut out = Vec::new();
    for _ in 0..5 {
        let line = lines.next_line().await.unwrap().unwrap();
        out.push(serde_json::from_str::<Value>(&line).unwrap());
    }

    let summary: Vec<(&str, &str)> = out
        .iter()
        .map(|v| (v["type"].as_str().unwrap(), v["key"].as_str().unwrap()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Sent", "0xc1"),
            ("Relayed", "0xc1"),
            ("Received", "0xc1"),
            ("Relayed", "lane-1:5"),
            ("Relayed", "lane-1:5"),
        ]
    );
    assert_eq!(out[1]["stage"]["stage"], "relay");
    assert_eq!(out[2]["outbound"]["origin"]["chainId"], "A");
    assert_eq!(out[3]["stage"]["phase"], "accepted");
    assert_eq!(out[4]["stage"]["phase"], "received");

    assert_eq!(container.engine.pending_total().await.unwrap(), 0);
}
