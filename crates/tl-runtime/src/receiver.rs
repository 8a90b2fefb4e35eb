//! JSON-lines result sink.

use async_trait::async_trait;
use tl_03_matching_engine::{MatchReceiver, MatchResult, ReceiverError};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

/// Writes every result as one JSON object per line.
pub struct JsonLinesReceiver<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesReceiver<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> MatchReceiver for JsonLinesReceiver<W> {
    async fn receive(&self, result: MatchResult) -> Result<(), ReceiverError> {
        let mut line =
            serde_json::to_vec(&result).map_err(|e| ReceiverError::Failed(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&line)
            .await
            .map_err(|e| ReceiverError::Failed(e.to_string()))?;
        writer
            .flush()
            .await
            .map_err(|e| ReceiverError::Failed(e.to_string()))
    }
}
