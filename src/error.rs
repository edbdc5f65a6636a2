use serde::{Deserialize, Serialize};

use crate::core::board::Orientation;

/// Broad class of a [`GameError`], sent to clients alongside the message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Command rejected by a precondition; nothing was mutated
    Validation,
    /// Unknown room code
    NotFound,
    /// No seat or no room code left
    Capacity,
    /// Room exists but is past the stage this command needs
    State,
    /// The requested stake cannot be laid out as a board
    Configuration,
}

/// Every way a command against the game engine can fail
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("It is not your turn")]
    NotYourTurn,

    #[error("You must roll the dice first")]
    DiceNotRolled,

    #[error("You already rolled the dice this turn")]
    DiceAlreadyRolled,

    #[error("You already placed all your edges for this roll")]
    MovesExhausted,

    #[error("This edge is already taken")]
    EdgeOccupied,

    #[error("Edge {orientation} ({row}, {col}) is outside the board")]
    EdgeOutOfBounds {
        row: usize,
        col: usize,
        orientation: Orientation,
    },

    #[error("The game is not in progress")]
    GameNotInProgress,

    #[error("Room {0} not found")]
    RoomNotFound(String),

    #[error("Room {0} is full")]
    RoomFull(String),

    #[error("The game in room {0} has already started")]
    GameAlreadyStarted(String),

    #[error("You already hold a seat in this room")]
    AlreadySeated,

    #[error("No free room codes available")]
    RoomCodesExhausted,

    #[error("{0}")]
    InvalidNickname(String),

    #[error("Bet amount must be greater than zero")]
    InvalidBet,

    #[error("A pot of {pot} cannot be split into {cells} boxes")]
    UnreachablePot { pot: u64, cells: usize },

    #[error("Board generation failed: boxes sum to {sum} instead of {pot}")]
    BoardGeneration { sum: u64, pot: u64 },

    #[error("Malformed command: {0}")]
    MalformedCommand(String),
}

impl GameError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GameError::NotYourTurn
            | GameError::DiceNotRolled
            | GameError::DiceAlreadyRolled
            | GameError::MovesExhausted
            | GameError::EdgeOccupied
            | GameError::EdgeOutOfBounds { .. }
            | GameError::GameNotInProgress
            | GameError::AlreadySeated
            | GameError::InvalidNickname(_)
            | GameError::InvalidBet
            | GameError::MalformedCommand(_) => ErrorKind::Validation,
            GameError::RoomNotFound(_) => ErrorKind::NotFound,
            GameError::RoomFull(_) | GameError::RoomCodesExhausted => ErrorKind::Capacity,
            GameError::GameAlreadyStarted(_) => ErrorKind::State,
            GameError::UnreachablePot { .. } | GameError::BoardGeneration { .. } => {
                ErrorKind::Configuration
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(GameError::NotYourTurn.kind(), ErrorKind::Validation);
        assert_eq!(GameError::EdgeOccupied.kind(), ErrorKind::Validation);
        assert_eq!(
            GameError::RoomNotFound("1234".to_string()).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            GameError::RoomFull("1234".to_string()).kind(),
            ErrorKind::Capacity
        );
        assert_eq!(
            GameError::GameAlreadyStarted("1234".to_string()).kind(),
            ErrorKind::State
        );
        assert_eq!(
            GameError::UnreachablePot { pot: 50, cells: 9 }.kind(),
            ErrorKind::Configuration
        );
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(GameError::NotYourTurn.to_string(), "It is not your turn");
        assert_eq!(
            GameError::RoomNotFound("4321".to_string()).to_string(),
            "Room 4321 not found"
        );
        assert_eq!(
            GameError::EdgeOutOfBounds {
                row: 9,
                col: 0,
                orientation: Orientation::Horizontal
            }
            .to_string(),
            "Edge horizontal (9, 0) is outside the board"
        );
    }

    #[test]
    fn test_error_kind_serializes_kebab_case() {
        let json = serde_json::to_string(&ErrorKind::NotFound).unwrap();
        assert_eq!(json, "\"not-found\"");
    }
}
