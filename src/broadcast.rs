use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::broadcast;

use crate::core::ROOM_CHANNEL_CAPACITY;
use crate::models::ServerEvent;

/// Push capability the room registry publishes through.
///
/// Implementations must not block: `publish` is called while the room's
/// mutex is held.
pub trait Broadcaster: Send + Sync {
    /// Deliver `event` to every connection subscribed to `room_code`
    fn publish(&self, room_code: &str, event: &ServerEvent);

    /// Called once a room exists
    fn open_room(&self, _room_code: &str) {}

    /// Called after the last seat leaves and the room is destroyed
    fn close_room(&self, _room_code: &str) {}
}

/// One broadcast channel per room, carrying serialized events
#[derive(Debug, Default)]
pub struct RoomChannels {
    channels: RwLock<HashMap<String, broadcast::Sender<String>>>,
}

impl RoomChannels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every event published to `room_code` from now on
    ///
    /// # Returns
    ///
    /// None if the room has no open channel
    pub fn subscribe(&self, room_code: &str) -> Option<broadcast::Receiver<String>> {
        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        channels.get(room_code).map(|tx| tx.subscribe())
    }

    pub fn is_open(&self, room_code: &str) -> bool {
        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        channels.contains_key(room_code)
    }
}

impl Broadcaster for RoomChannels {
    fn publish(&self, room_code: &str, event: &ServerEvent) {
        let message = match serde_json::to_string(event) {
            Ok(message) => message,
            Err(e) => {
                tracing::error!("Failed to serialize {} event: {}", event.name(), e);
                return;
            }
        };

        let channels = self.channels.read().unwrap_or_else(|e| e.into_inner());
        if let Some(tx) = channels.get(room_code) {
            // No receivers is fine; nobody is listening yet
            let _ = tx.send(message);
        } else {
            tracing::debug!("Dropped {} for closed room {}", event.name(), room_code);
        }
    }

    fn open_room(&self, room_code: &str) {
        let mut channels = self.channels.write().unwrap_or_else(|e| e.into_inner());
        channels
            .entry(room_code.to_string())
            .or_insert_with(|| broadcast::channel(ROOM_CHANNEL_CAPACITY).0);
    }

    fn close_room(&self, room_code: &str) {
        let mut channels = self.channels.write().unwrap_or_else(|e| e.into_inner());
        channels.remove(room_code);
    }
}
