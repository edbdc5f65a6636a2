use std::sync::Arc;

use crate::broadcast::RoomChannels;
use crate::config::ServerConfig;
use crate::core::RoomRegistry;

/// Shared application state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub rooms: Arc<RoomRegistry>,
    /// Same channels the registry publishes through; sockets subscribe here
    pub channels: Arc<RoomChannels>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        let channels = Arc::new(RoomChannels::new());
        let rooms = Arc::new(RoomRegistry::new(channels.clone()));

        Self {
            rooms,
            channels,
            config: Arc::new(config),
        }
    }
}
