use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Represents a seated player in a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    /// Connection id of the socket holding this seat
    pub id: String,
    /// Player's display name
    pub nickname: String,
    /// Money captured so far
    pub balance: u64,
    /// 0 for the room creator, 1 for the joiner
    pub seat_index: usize,
    /// Timestamp when player took the seat
    pub joined_at: OffsetDateTime,
}

impl Player {
    /// Create a new player with an empty balance
    ///
    /// # Arguments
    ///
    /// * `id` - Connection id that owns the seat
    /// * `nickname` - The player's display name
    /// * `seat_index` - Seat the player occupies
    pub fn new(id: String, nickname: String, seat_index: usize) -> Self {
        Self {
            id,
            nickname,
            balance: 0,
            seat_index,
            joined_at: OffsetDateTime::now_utc(),
        }
    }

    /// Add a captured box's value to the balance
    pub fn credit(&mut self, amount: u64) {
        self.balance += amount;
    }
}
