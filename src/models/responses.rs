use serde::{Deserialize, Serialize};

use crate::core::{
    board::{CapturedBox, Coin, Edge, Orientation},
    EndReason, GamePhase, GameSession, Player,
};
use crate::error::{ErrorKind, GameError};

/// Player information for snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResponse {
    /// Player's connection id
    pub id: String,
    /// Player's display name
    pub nickname: String,
    /// Money captured so far
    pub balance: u64,
    /// Seat occupied (0 or 1)
    pub seat_index: usize,
}

impl PlayerResponse {
    pub fn from_player(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            nickname: player.nickname.clone(),
            balance: player.balance,
            seat_index: player.seat_index,
        }
    }
}

/// A placed edge as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeResponse {
    pub row: usize,
    pub col: usize,
    pub orientation: Orientation,
    pub owner_id: String,
}

impl EdgeResponse {
    pub fn from_edge(edge: &Edge) -> Self {
        Self {
            row: edge.position.row,
            col: edge.position.col,
            orientation: edge.position.orientation,
            owner_id: edge.owner_id.clone(),
        }
    }
}

/// A box as sent to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxResponse {
    pub row: usize,
    pub col: usize,
    pub denomination: u64,
    pub owner_id: Option<String>,
}

impl BoxResponse {
    pub fn from_coin(row: usize, col: usize, coin: &Coin) -> Self {
        Self {
            row,
            col,
            denomination: coin.denomination,
            owner_id: coin.owner_id.clone(),
        }
    }
}

/// Full state of a room. Every broadcast carries one of these, never a diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    pub room_code: String,
    pub bet_amount: u64,
    pub grid_size: usize,
    pub players: Vec<PlayerResponse>,
    /// Seat index whose turn it is
    pub current_turn: usize,
    pub dice_value: Option<u8>,
    pub edges_placed: u8,
    pub edges: Vec<EdgeResponse>,
    pub boxes: Vec<Vec<BoxResponse>>,
    pub started: bool,
    /// Every box has an owner
    pub ended: bool,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    /// Unix timestamp of the current phase's start
    pub phase_started_at: i64,
}

impl GameSnapshot {
    pub fn from_session(session: &GameSession) -> Self {
        let boxes = session
            .board
            .coins()
            .iter()
            .enumerate()
            .map(|(row, coins)| {
                coins
                    .iter()
                    .enumerate()
                    .map(|(col, coin)| BoxResponse::from_coin(row, col, coin))
                    .collect()
            })
            .collect();

        Self {
            room_code: session.room_code.clone(),
            bet_amount: session.bet_amount,
            grid_size: session.grid_size(),
            players: session.players.iter().map(PlayerResponse::from_player).collect(),
            current_turn: session.current_turn,
            dice_value: session.dice_value,
            edges_placed: session.edges_placed,
            edges: session.board.edges().iter().map(EdgeResponse::from_edge).collect(),
            boxes,
            started: session.is_started(),
            ended: session.is_board_cleared(),
            phase: session.phase,
            end_reason: session.end_reason,
            phase_started_at: session.phase_started_at.unix_timestamp(),
        }
    }
}

/// Events pushed from the server, framed as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Sent to the creator only
    #[serde(rename_all = "camelCase")]
    RoomCreated {
        room_code: String,
        snapshot: GameSnapshot,
    },
    /// Sent to the joiner only
    #[serde(rename_all = "camelCase")]
    RoomJoined {
        room_code: String,
        snapshot: GameSnapshot,
    },
    /// Sent to the whole room after every accepted mutation
    GameUpdated(GameSnapshot),
    /// Sent to the whole room when a placement captured boxes
    #[serde(rename_all = "camelCase")]
    CoinsCompleted {
        player_id: String,
        boxes: Vec<CapturedBox>,
    },
    /// Sent to the whole room when a seat is vacated
    #[serde(rename_all = "camelCase")]
    PlayerLeft { player_id: String },
    /// Sent to the issuing connection only
    Error { message: String, kind: ErrorKind },
}

impl ServerEvent {
    pub fn error(error: &GameError) -> Self {
        ServerEvent::Error {
            message: error.to_string(),
            kind: error.kind(),
        }
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::RoomCreated { .. } => "room-created",
            ServerEvent::RoomJoined { .. } => "room-joined",
            ServerEvent::GameUpdated(_) => "game-updated",
            ServerEvent::CoinsCompleted { .. } => "coins-completed",
            ServerEvent::PlayerLeft { .. } => "player-left",
            ServerEvent::Error { .. } => "error",
        }
    }
}
