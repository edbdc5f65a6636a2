use serde::{Deserialize, Serialize};

use crate::core::{EdgePosition, Orientation, NICKNAME_MAX_LEN, NICKNAME_MIN_LEN};
use crate::error::GameError;

/// Commands a client sends over the socket, framed as `{"event": ..., "data": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientCommand {
    #[serde(rename_all = "camelCase")]
    CreateRoom { nickname: String, bet_amount: u64 },
    #[serde(rename_all = "camelCase")]
    JoinRoom { room_code: String, nickname: String },
    #[serde(rename_all = "camelCase")]
    RollDice { room_code: String },
    #[serde(rename_all = "camelCase")]
    PlaceEdge {
        room_code: String,
        row: usize,
        col: usize,
        #[serde(alias = "type")]
        orientation: Orientation,
    },
}

impl ClientCommand {
    /// Parse a text frame
    ///
    /// # Errors
    ///
    /// `MalformedCommand` if the frame is not a known command
    pub fn parse(text: &str) -> Result<Self, GameError> {
        serde_json::from_str(text).map_err(|e| GameError::MalformedCommand(e.to_string()))
    }

    /// Room the command targets, if any
    pub fn room_code(&self) -> Option<&str> {
        match self {
            ClientCommand::CreateRoom { .. } => None,
            ClientCommand::JoinRoom { room_code, .. }
            | ClientCommand::RollDice { room_code }
            | ClientCommand::PlaceEdge { room_code, .. } => Some(room_code),
        }
    }
}

/// Edge named by a `place-edge` command
pub fn edge_position(row: usize, col: usize, orientation: Orientation) -> EdgePosition {
    EdgePosition {
        row,
        col,
        orientation,
    }
}

/// Validate and clean a nickname
///
/// # Arguments
///
/// * `nickname` - Raw nickname input
///
/// # Returns
///
/// Cleaned nickname if valid, `InvalidNickname` otherwise
///
/// # Validation Rules
///
/// - Trimmed before checking
/// - Length: 2-20 characters
/// - Only alphanumeric characters and spaces allowed
pub fn validate_nickname(nickname: &str) -> Result<String, GameError> {
    let cleaned = nickname.trim();
    let length = cleaned.chars().count();

    if length < NICKNAME_MIN_LEN {
        return Err(GameError::InvalidNickname(format!(
            "Nickname must be at least {} characters",
            NICKNAME_MIN_LEN
        )));
    }

    if length > NICKNAME_MAX_LEN {
        return Err(GameError::InvalidNickname(format!(
            "Nickname must be {} characters or less",
            NICKNAME_MAX_LEN
        )));
    }

    if !cleaned.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        return Err(GameError::InvalidNickname(
            "Nickname must contain only letters, numbers, and spaces".to_string(),
        ));
    }

    Ok(cleaned.to_string())
}
