//! LiveHub: per-restaurant real-time push
//!
//! Kitchen displays and waiter tablets subscribe to their restaurant's room;
//! handlers publish after their transaction has committed.
//!
//! ```text
//! POST /api/orders ──┐
//!                    ├──► LiveHub ── room "restaurant-{id}" ──► WS clients
//! POST /api/notify-waiter ┘     (one broadcast::Sender per restaurant)
//! ```

use dashmap::DashMap;
use serde::Serialize;
use shared::models::WaiterCall;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Broadcast channel capacity, enough to buffer a burst while a display reconnects
const BROADCAST_CAPACITY: usize = 256;

/// Events pushed to a room, serialized as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum LiveEvent {
    NewOrderForKitchen(KitchenNotice),
    WaiterCall(WaiterCall),
}

/// New or merged kitchen ticket
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KitchenNotice {
    pub message: String,
    pub restaurant_id: i64,
    pub order_id: i64,
    pub bill_no: i64,
}

impl KitchenNotice {
    pub fn new(restaurant_id: i64, order_id: i64, bill_no: i64) -> Self {
        Self {
            message: format!("New KOT received for Bill No: {bill_no}"),
            restaurant_id,
            order_id,
            bill_no,
        }
    }
}

pub fn room_name(restaurant_id: i64) -> String {
    format!("restaurant-{restaurant_id}")
}

/// Restaurant-isolated broadcast rooms
#[derive(Clone, Default)]
pub struct LiveHub {
    /// restaurant_id → room sender
    rooms: Arc<DashMap<i64, broadcast::Sender<LiveEvent>>>,
}

impl LiveHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to a restaurant's room, creating it on first use
    pub fn subscribe(&self, restaurant_id: i64) -> broadcast::Receiver<LiveEvent> {
        self.rooms
            .entry(restaurant_id)
            .or_insert_with(|| broadcast::channel(BROADCAST_CAPACITY).0)
            .subscribe()
    }

    /// Publish to a room. Returns how many subscribers received the event;
    /// a room nobody listens to is not an error.
    pub fn publish(&self, restaurant_id: i64, event: LiveEvent) -> usize {
        match self.rooms.get(&restaurant_id) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        }
    }

    pub fn listener_count(&self, restaurant_id: i64) -> usize {
        self.rooms
            .get(&restaurant_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }

    /// Drop rooms without subscribers
    pub fn prune(&self) {
        self.rooms.retain(|_, tx| tx.receiver_count() > 0);
    }
}
