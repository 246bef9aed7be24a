use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

/// Events emitted by the services. Consumed in-process by a logging task;
/// the channel keeps emission off the request path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    OrderCreated(Uuid),
    OrderUpdated(Uuid),
    OrderDeleted(Uuid),
    OrderStatusChanged {
        order_id: Uuid,
        old_status: String,
        new_status: String,
    },
    InventoryDeducted {
        item_id: Uuid,
        old_quantity: i32,
        new_quantity: i32,
    },
    LowStock {
        item_id: Uuid,
        sku: String,
        quantity: i32,
        min_quantity: i32,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event, logging on a full or closed channel instead of
    /// failing the caller's request.
    pub async fn send(&self, event: Event) {
        if let Err(e) = self.sender.send(event).await {
            warn!("Failed to send event: {}", e);
        }
    }
}

/// Consumes events and logs them. Spawned once at startup.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match &event {
            Event::OrderCreated(id) => info!(order_id = %id, "order created"),
            Event::OrderUpdated(id) => info!(order_id = %id, "order updated"),
            Event::OrderDeleted(id) => info!(order_id = %id, "order deleted"),
            Event::OrderStatusChanged {
                order_id,
                old_status,
                new_status,
            } => info!(
                order_id = %order_id,
                from = %old_status,
                to = %new_status,
                "order status changed"
            ),
            Event::InventoryDeducted {
                item_id,
                old_quantity,
                new_quantity,
            } => info!(
                item_id = %item_id,
                old_quantity,
                new_quantity,
                "inventory deducted"
            ),
            Event::LowStock {
                item_id,
                sku,
                quantity,
                min_quantity,
            } => warn!(
                item_id = %item_id,
                sku = %sku,
                quantity,
                min_quantity,
                "inventory item at or below minimum stock"
            ),
        }
    }
}
