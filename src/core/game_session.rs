use rand::Rng;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{
    board::{Board, CapturedBox, EdgePosition},
    coin_board::CoinBoard,
    validation::{validate_join, validate_placement, validate_roll},
    Player, DICE_SIDES, MAX_PLAYERS,
};
use crate::error::GameError;

/// Where a session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GamePhase {
    /// Creator seated, second seat open
    WaitingForPlayers,
    /// Current player must roll
    AwaitingRoll,
    /// Current player is spending the dice budget on edges
    Placing,
    /// No further commands accepted
    Ended,
}

impl GamePhase {
    pub fn is_in_progress(&self) -> bool {
        matches!(self, GamePhase::AwaitingRoll | GamePhase::Placing)
    }
}

/// Why a session reached [`GamePhase::Ended`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndReason {
    /// Every box has an owner
    BoardCleared,
    /// A seat was vacated mid-game
    OpponentLeft,
}

/// One room's game: seats, board and turn state
#[derive(Debug, Clone, PartialEq)]
pub struct GameSession {
    /// Short numeric code identifying the room
    pub room_code: String,
    /// Stake per player; the board holds twice this
    pub bet_amount: u64,
    /// Seated players, ordered by seat
    pub players: Vec<Player>,
    /// Edges and coins
    pub board: Board,
    /// Seat index whose turn it is
    pub current_turn: usize,
    /// Set only while the current player is placing edges
    pub dice_value: Option<u8>,
    /// Edges placed against the current roll
    pub edges_placed: u8,
    pub phase: GamePhase,
    pub end_reason: Option<EndReason>,
    /// When the room was created
    pub created_at: OffsetDateTime,
    /// When the current phase began (turn timer reference)
    pub phase_started_at: OffsetDateTime,
    /// When the game ended
    pub finished_at: Option<OffsetDateTime>,
}

impl GameSession {
    /// Create a session with the creator in seat 0
    ///
    /// # Arguments
    ///
    /// * `room_code` - Code the registry assigned to the room
    /// * `bet_amount` - Stake per player
    /// * `coin_board` - Denominations produced for this stake
    /// * `creator_id` - Connection id of the creator
    /// * `creator_nickname` - Validated display name
    pub fn new(
        room_code: String,
        bet_amount: u64,
        coin_board: CoinBoard,
        creator_id: String,
        creator_nickname: String,
    ) -> Self {
        let now = OffsetDateTime::now_utc();

        Self {
            room_code,
            bet_amount,
            players: vec![Player::new(creator_id, creator_nickname, 0)],
            board: Board::new(coin_board.denominations),
            current_turn: 0,
            dice_value: None,
            edges_placed: 0,
            phase: GamePhase::WaitingForPlayers,
            end_reason: None,
            created_at: now,
            phase_started_at: now,
            finished_at: None,
        }
    }

    pub fn grid_size(&self) -> usize {
        self.board.grid_size()
    }

    /// True once the second seat has been taken
    pub fn is_started(&self) -> bool {
        self.phase != GamePhase::WaitingForPlayers
    }

    /// True exactly when every box has an owner
    pub fn is_board_cleared(&self) -> bool {
        self.board.is_complete()
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.players.iter().any(|p| p.id == player_id)
    }

    pub fn player(&self, player_id: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    /// The player whose turn it is, if that seat is occupied
    pub fn current_player(&self) -> Option<&Player> {
        self.players.iter().find(|p| p.seat_index == self.current_turn)
    }

    /// Seat the second player and start the game
    ///
    /// # Errors
    ///
    /// Any join precondition failure; the session is untouched
    pub fn seat_player(&mut self, player_id: String, nickname: String) -> Result<&Player, GameError> {
        validate_join(self, &player_id)?;

        // The creator's seat is never vacated while the room is joinable
        let seat_index = self.players.len();
        self.players.push(Player::new(player_id, nickname, seat_index));

        self.current_turn = 0;
        self.enter_phase(GamePhase::AwaitingRoll);

        tracing::info!("Game in room {} started", self.room_code);

        Ok(&self.players[seat_index])
    }

    /// Roll the dice for the current player
    ///
    /// # Returns
    ///
    /// The rolled value, uniform in 1..=6
    pub fn roll_dice<R: Rng + ?Sized>(&mut self, player_id: &str, rng: &mut R) -> Result<u8, GameError> {
        validate_roll(self, player_id)?;

        let value = rng.gen_range(1..=DICE_SIDES);
        self.start_placement(value);

        tracing::debug!(
            "Player {} rolled {} in room {}",
            player_id,
            value,
            self.room_code
        );
        Ok(value)
    }

    /// Place one edge for the current player.
    ///
    /// Captured boxes are credited to the mover in the same step. The turn
    /// passes once the dice budget is spent, and the game ends as soon as
    /// the last box is taken.
    ///
    /// # Returns
    ///
    /// Boxes captured by this edge, row-major (empty if none)
    pub fn place_edge(
        &mut self,
        player_id: &str,
        position: EdgePosition,
    ) -> Result<Vec<CapturedBox>, GameError> {
        validate_placement(self, player_id, &position)?;

        let captured = self.board.place(position, player_id)?;
        let winnings: u64 = captured.iter().map(|b| b.value).sum();
        if let Some(mover) = self.players.iter_mut().find(|p| p.id == player_id) {
            mover.credit(winnings);
        }

        self.edges_placed += 1;
        if Some(self.edges_placed) == self.dice_value {
            self.advance_turn();
        }

        if self.board.is_complete() {
            self.finish(EndReason::BoardCleared);
        }

        Ok(captured)
    }

    /// Vacate `player_id`'s seat. A session left with fewer than two
    /// players can no longer be played and is ended.
    ///
    /// # Returns
    ///
    /// The removed player, or None if they held no seat
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let index = self.players.iter().position(|p| p.id == player_id)?;
        let player = self.players.remove(index);

        if self.players.len() < MAX_PLAYERS && self.phase != GamePhase::Ended {
            self.finish(EndReason::OpponentLeft);
        }

        Some(player)
    }

    fn start_placement(&mut self, value: u8) {
        self.dice_value = Some(value);
        self.edges_placed = 0;
        self.enter_phase(GamePhase::Placing);
    }

    fn advance_turn(&mut self) {
        self.current_turn = (self.current_turn + 1) % MAX_PLAYERS;
        self.dice_value = None;
        self.edges_placed = 0;
        self.enter_phase(GamePhase::AwaitingRoll);
    }

    fn finish(&mut self, reason: EndReason) {
        self.dice_value = None;
        self.edges_placed = 0;
        self.end_reason = Some(reason);
        self.finished_at = Some(OffsetDateTime::now_utc());
        self.enter_phase(GamePhase::Ended);

        tracing::info!("Game in room {} ended: {:?}", self.room_code, reason);
    }

    fn enter_phase(&mut self, phase: GamePhase) {
        self.phase = phase;
        self.phase_started_at = OffsetDateTime::now_utc();
    }
}
