pub mod board;
pub mod coin_board;
pub mod constants;
pub mod game_session;
pub mod player;
pub mod room_registry;
pub mod validation;

pub use board::{Board, CapturedBox, EdgePosition, Orientation};
pub use coin_board::{generate_board, CoinBoard};
pub use constants::*;
pub use game_session::{EndReason, GamePhase, GameSession};
pub use player::Player;
pub use room_registry::RoomRegistry;
