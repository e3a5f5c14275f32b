use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

// Define the various events that can occur in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    PurchaseOrderApproved(Uuid),
    PurchaseOrderRejected(Uuid),

    Generic {
        message: String,
        timestamp: DateTime<Utc>,
        metadata: serde_json::Value,
    },
}

/// Consumes domain events from the channel until all senders are dropped.
///
/// Approval decisions deliberately stop here: inventory, accounting and
/// notification side effects are handled by downstream consumers, so this
/// loop only records the intent.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match event {
            Event::PurchaseOrderApproved(po_id) => {
                info!(
                    purchase_order_id = %po_id,
                    "Purchase order approved; downstream inventory and accounting effects deferred"
                );
            }
            Event::PurchaseOrderRejected(po_id) => {
                info!(
                    purchase_order_id = %po_id,
                    "Purchase order rejected; supplier notification deferred"
                );
            }
            Event::Generic {
                message,
                timestamp,
                metadata,
            } => {
                info!(%message, %timestamp, %metadata, "Generic event");
            }
        }
    }

    info!("Event processing loop stopped");
}
