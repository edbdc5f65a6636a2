//! Preconditions for every command that mutates a session.
//!
//! These never touch the session. Each command runs its check to
//! completion before the first write, so a rejected command leaves the
//! session exactly as it was.

use super::{board::EdgePosition, GameSession, MAX_PLAYERS};
use crate::error::GameError;

/// Check that `player_id` may take the free seat
///
/// # Errors
///
/// `RoomNotFound` if the room has already been vacated, `RoomFull`,
/// `GameAlreadyStarted`, or `AlreadySeated` if the connection already
/// holds a seat here
pub fn validate_join(session: &GameSession, player_id: &str) -> Result<(), GameError> {
    if session.players.is_empty() {
        return Err(GameError::RoomNotFound(session.room_code.clone()));
    }

    if session.players.len() >= MAX_PLAYERS {
        return Err(GameError::RoomFull(session.room_code.clone()));
    }

    if session.is_started() {
        return Err(GameError::GameAlreadyStarted(session.room_code.clone()));
    }

    if session.has_player(player_id) {
        return Err(GameError::AlreadySeated);
    }

    Ok(())
}

/// Check that `player_id` may roll the dice now
pub fn validate_roll(session: &GameSession, player_id: &str) -> Result<(), GameError> {
    ensure_turn(session, player_id)?;

    if session.dice_value.is_some() {
        return Err(GameError::DiceAlreadyRolled);
    }

    Ok(())
}

/// Check that `player_id` may place the edge at `position` now
pub fn validate_placement(
    session: &GameSession,
    player_id: &str,
    position: &EdgePosition,
) -> Result<(), GameError> {
    ensure_turn(session, player_id)?;

    let dice = session.dice_value.ok_or(GameError::DiceNotRolled)?;
    if session.edges_placed >= dice {
        return Err(GameError::MovesExhausted);
    }

    session.board.check_placeable(position)
}

fn ensure_turn(session: &GameSession, player_id: &str) -> Result<(), GameError> {
    if !session.phase.is_in_progress() {
        return Err(GameError::GameNotInProgress);
    }

    match session.current_player() {
        Some(player) if player.id == player_id => Ok(()),
        _ => Err(GameError::NotYourTurn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{coin_board::CoinBoard, GamePhase};

    fn create_test_session() -> GameSession {
        let board = CoinBoard {
            grid_size: 2,
            denominations: vec![vec![100, 200], vec![500, 1000]],
        };
        GameSession::new(
            "1234".to_string(),
            900,
            board,
            "alice".to_string(),
            "Alice".to_string(),
        )
    }

    fn started_session() -> GameSession {
        let mut session = create_test_session();
        session
            .seat_player("bob".to_string(), "Bob".to_string())
            .unwrap();
        session
    }

    #[test]
    fn test_join_open_room() {
        let session = create_test_session();
        assert_eq!(validate_join(&session, "bob"), Ok(()));
    }

    #[test]
    fn test_join_full_room() {
        let session = started_session();
        assert_eq!(
            validate_join(&session, "carol"),
            Err(GameError::RoomFull("1234".to_string()))
        );
    }

    #[test]
    fn test_join_twice_from_same_connection() {
        let session = create_test_session();
        assert_eq!(validate_join(&session, "alice"), Err(GameError::AlreadySeated));
    }

    #[test]
    fn test_join_after_opponent_left() {
        let mut session = started_session();
        session.remove_player("bob");

        assert_eq!(
            validate_join(&session, "carol"),
            Err(GameError::GameAlreadyStarted("1234".to_string()))
        );
    }

    #[test]
    fn test_join_vacated_room() {
        let mut session = create_test_session();
        session.remove_player("alice");

        assert_eq!(
            validate_join(&session, "bob"),
            Err(GameError::RoomNotFound("1234".to_string()))
        );
    }

    #[test]
    fn test_roll_before_start() {
        let session = create_test_session();
        assert_eq!(
            validate_roll(&session, "alice"),
            Err(GameError::GameNotInProgress)
        );
    }

    #[test]
    fn test_roll_out_of_turn() {
        let session = started_session();
        assert_eq!(validate_roll(&session, "bob"), Err(GameError::NotYourTurn));
        assert_eq!(validate_roll(&session, "stranger"), Err(GameError::NotYourTurn));
        assert_eq!(validate_roll(&session, "alice"), Ok(()));
    }

    #[test]
    fn test_roll_twice() {
        let mut session = started_session();
        session.dice_value = Some(4);
        session.phase = GamePhase::Placing;

        assert_eq!(
            validate_roll(&session, "alice"),
            Err(GameError::DiceAlreadyRolled)
        );
    }

    #[test]
    fn test_place_without_roll() {
        let session = started_session();
        assert_eq!(
            validate_placement(&session, "alice", &EdgePosition::horizontal(0, 0)),
            Err(GameError::DiceNotRolled)
        );
    }

    #[test]
    fn test_place_with_budget_spent() {
        let mut session = started_session();
        session.dice_value = Some(2);
        session.edges_placed = 2;
        session.phase = GamePhase::Placing;

        assert_eq!(
            validate_placement(&session, "alice", &EdgePosition::horizontal(0, 0)),
            Err(GameError::MovesExhausted)
        );
    }

    #[test]
    fn test_place_occupied_and_out_of_bounds() {
        let mut session = started_session();
        session.dice_value = Some(3);
        session.phase = GamePhase::Placing;
        session
            .board
            .place(EdgePosition::vertical(0, 0), "bob")
            .unwrap();

        assert_eq!(
            validate_placement(&session, "alice", &EdgePosition::vertical(0, 0)),
            Err(GameError::EdgeOccupied)
        );
        assert!(matches!(
            validate_placement(&session, "alice", &EdgePosition::vertical(0, 3)),
            Err(GameError::EdgeOutOfBounds { .. })
        ));
        assert_eq!(
            validate_placement(&session, "alice", &EdgePosition::vertical(0, 1)),
            Ok(())
        );
    }

    #[test]
    fn test_nothing_allowed_after_end() {
        let mut session = started_session();
        session.remove_player("bob");

        assert_eq!(
            validate_roll(&session, "alice"),
            Err(GameError::GameNotInProgress)
        );
        assert_eq!(
            validate_placement(&session, "alice", &EdgePosition::horizontal(0, 0)),
            Err(GameError::GameNotInProgress)
        );
    }
}
