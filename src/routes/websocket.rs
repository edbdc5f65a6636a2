use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::collections::HashMap;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::{
    error::GameError,
    models::{requests::edge_position, ClientCommand, ServerEvent},
    state::AppState,
};

/// Largest text frame accepted from a client
const MAX_FRAME_BYTES: usize = 1024;

/// WebSocket endpoint for the game protocol
///
/// Every connection gets a fresh id, which doubles as its player id in any
/// room it creates or joins.
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let connection_id = Uuid::new_v4().to_string();
    tracing::debug!("WebSocket upgrade: connection={}", connection_id);

    ws.on_upgrade(move |socket| handle_socket(socket, connection_id, state))
}

/// Drive one socket until the client goes away
///
/// # Flow
///
/// 1. A writer task drains the connection's outbound queue into the socket
/// 2. Frames from the client are parsed and dispatched in order
/// 3. Each room the connection enters gets a forwarder from its broadcast
///    channel into the outbound queue
/// 4. On close, forwarders stop and the player leaves every room
async fn handle_socket(socket: WebSocket, connection_id: String, state: AppState) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let send_connection_id = connection_id.clone();
    let mut send_task = tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            if sender.send(Message::Text(text)).await.is_err() {
                tracing::debug!("Socket write failed for connection={}", send_connection_id);
                break;
            }
        }
    });

    tracing::info!("WebSocket connected: connection={}", connection_id);
    let mut connection = Connection::new(connection_id.clone(), state, tx);

    loop {
        tokio::select! {
            frame = receiver.next() => {
                let Some(Ok(msg)) = frame else { break };
                match msg {
                    Message::Text(text) => connection.handle_text(&text).await,
                    Message::Close(_) => {
                        tracing::debug!("Close message from connection={}", connection_id);
                        break;
                    }
                    Message::Ping(_) | Message::Pong(_) => {
                        // Axum answers protocol pings itself
                    }
                    Message::Binary(_) => {
                        tracing::warn!("Unexpected binary message from connection={}", connection_id);
                    }
                }
            }
            _ = &mut send_task => {
                tracing::debug!("Send task finished for connection={}", connection_id);
                break;
            }
        }
    }

    connection.close().await;
    send_task.abort();

    tracing::info!("WebSocket closed: connection={}", connection_id);
}

/// Per-socket protocol state, independent of the socket itself
pub struct Connection {
    id: String,
    state: AppState,
    tx: mpsc::UnboundedSender<String>,
    forwarders: HashMap<String, JoinHandle<()>>,
}

impl Connection {
    pub fn new(id: String, state: AppState, tx: mpsc::UnboundedSender<String>) -> Self {
        Self {
            id,
            state,
            tx,
            forwarders: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Handle one text frame. Failures are reported to this connection only.
    pub async fn handle_text(&mut self, text: &str) {
        if text.len() > MAX_FRAME_BYTES {
            tracing::warn!(
                "Message too large from connection={}: {} bytes",
                self.id,
                text.len()
            );
            self.send(&ServerEvent::error(&GameError::MalformedCommand(format!(
                "frame exceeds {} bytes",
                MAX_FRAME_BYTES
            ))));
            return;
        }

        let result = match ClientCommand::parse(text) {
            Ok(command) => self.dispatch(command).await,
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::debug!("Rejected command from connection={}: {}", self.id, e);
            self.send(&ServerEvent::error(&e));
        }
    }

    async fn dispatch(&mut self, command: ClientCommand) -> Result<(), GameError> {
        let rooms = self.state.rooms.clone();

        match command {
            ClientCommand::CreateRoom {
                nickname,
                bet_amount,
            } => {
                let snapshot = rooms.create_room(&self.id, &nickname, bet_amount).await?;
                let room_code = snapshot.room_code.clone();
                let events = self.state.channels.subscribe(&room_code);

                self.send(&ServerEvent::RoomCreated {
                    room_code: room_code.clone(),
                    snapshot,
                });
                self.forward(room_code, events);
            }
            ClientCommand::JoinRoom {
                room_code,
                nickname,
            } => {
                // Subscribe before seating so the joiner sees the resulting game-updated
                let events = self.state.channels.subscribe(&room_code);
                let snapshot = rooms.join_room(&room_code, &self.id, &nickname).await?;

                self.send(&ServerEvent::RoomJoined {
                    room_code: room_code.clone(),
                    snapshot,
                });
                self.forward(room_code, events);
            }
            ClientCommand::RollDice { room_code } => {
                rooms.roll_dice(&room_code, &self.id).await?;
            }
            ClientCommand::PlaceEdge {
                room_code,
                row,
                col,
                orientation,
            } => {
                rooms
                    .place_edge(&room_code, &self.id, edge_position(row, col, orientation))
                    .await?;
            }
        }

        Ok(())
    }

    /// Pipe a room's broadcast channel into this connection's queue
    fn forward(&mut self, room_code: String, events: Option<broadcast::Receiver<String>>) {
        let Some(mut events) = events else {
            tracing::warn!("No channel for room {} on connection={}", room_code, self.id);
            return;
        };
        if self.forwarders.contains_key(&room_code) {
            return;
        }

        let tx = self.tx.clone();
        let connection_id = self.id.clone();
        let code = room_code.clone();
        let task = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(text) => {
                        if tx.send(text).is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Connection={} lagged {} event(s) in room {}",
                            connection_id,
                            skipped,
                            code
                        );
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::debug!("Room {} channel closed for connection={}", code, connection_id);
                        break;
                    }
                }
            }
        });

        self.forwarders.insert(room_code, task);
    }

    fn send(&self, event: &ServerEvent) {
        match serde_json::to_string(event) {
            Ok(text) => {
                let _ = self.tx.send(text);
            }
            Err(e) => tracing::error!("Failed to serialize {} event: {}", event.name(), e),
        }
    }

    /// Stop forwarding and vacate every seat this connection holds
    pub async fn close(&mut self) {
        for (_, task) in self.forwarders.drain() {
            task.abort();
        }

        let left = self.state.rooms.disconnect(&self.id).await;
        if !left.is_empty() {
            tracing::info!("Connection={} left rooms {:?}", self.id, left);
        }
    }
}
