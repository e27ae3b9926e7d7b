use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::debug;

use crate::printer::models::PrinterState;

#[derive(Debug, Clone, Serialize)]
pub struct PrinterStateUpdate {
    pub camera_uuid: String,
    pub state: PrinterState,
}

/// Receives every printer state produced by a polling task.
#[async_trait]
pub trait StateSink: Send + Sync {
    async fn publish(&self, camera_uuid: &str, state: PrinterState) -> Result<()>;
}

/// Fans updates out to in-process subscribers (the SSE endpoint).
#[derive(Debug, Clone)]
pub struct BroadcastSink {
    tx: broadcast::Sender<PrinterStateUpdate>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PrinterStateUpdate> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl StateSink for BroadcastSink {
    async fn publish(&self, camera_uuid: &str, state: PrinterState) -> Result<()> {
        let update = PrinterStateUpdate {
            camera_uuid: camera_uuid.to_string(),
            state,
        };
        // No subscribers is normal between page loads.
        if self.tx.send(update).is_err() {
            debug!("no subscribers for printer state of camera {camera_uuid}");
        }
        Ok(())
    }
}
