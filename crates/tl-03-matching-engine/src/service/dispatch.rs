//! Ordered delivery of results to the receiver.
//!
//! Results are queued inside the engine's critical section and delivered
//! here, one at a time, in queue order. A failing or panicking receiver is
//! logged and counted; the next result is still delivered.

use crate::domain::MatchResult;
use crate::ports::MatchReceiver;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tl_telemetry::{metric_inc, MATCHING_RECEIVER_ERRORS};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

pub(crate) enum Dispatch {
    Result(MatchResult),
    Flush(oneshot::Sender<()>),
}

pub(crate) async fn run_dispatcher(
    receiver: Arc<dyn MatchReceiver>,
    mut queue: mpsc::UnboundedReceiver<Dispatch>,
) {
    while let Some(item) = queue.recv().await {
        match item {
            Dispatch::Result(result) => deliver(receiver.as_ref(), result).await,
            Dispatch::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("[tl-03] Dispatcher stopped");
}

async fn deliver(receiver: &dyn MatchReceiver, result: MatchResult) {
    let key = result.key().clone();
    let kind = result.kind().as_str();

    match AssertUnwindSafe(receiver.receive(result)).catch_unwind().await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            metric_inc!(MATCHING_RECEIVER_ERRORS);
            warn!(key = %key, kind, error = %e, "[tl-03] Receiver failed");
        }
        Err(_) => {
            metric_inc!(MATCHING_RECEIVER_ERRORS);
            error!(key = %key, kind, "[tl-03] Receiver panicked");
        }
    }
}
