use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use super::{
    board::{CapturedBox, EdgePosition},
    coin_board::generate_board,
    GameSession, ROOM_CODE_ATTEMPTS, ROOM_CODE_MAX, ROOM_CODE_MIN,
};
use crate::broadcast::Broadcaster;
use crate::error::GameError;
use crate::models::{validate_nickname, GameSnapshot, ServerEvent};

/// A live room, locked independently of every other room
pub type RoomHandle = Arc<Mutex<GameSession>>;

/// Owner of every live room.
///
/// The map lock is only held to look up, insert or remove an entry. Room
/// mutations happen under the room's own mutex, and events are published
/// before that mutex is released so each room's events go out in mutation
/// order.
pub struct RoomRegistry {
    rooms: RwLock<HashMap<String, RoomHandle>>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl RoomRegistry {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            broadcaster,
        }
    }

    /// Create a room with `player_id` in seat 0
    ///
    /// # Arguments
    ///
    /// * `player_id` - Connection id of the creator
    /// * `nickname` - Raw display name
    /// * `bet_amount` - Stake per player; the board holds twice this
    ///
    /// # Returns
    ///
    /// Snapshot of the new room
    ///
    /// # Errors
    ///
    /// Nickname and bet errors, `UnreachablePot` when no board can hold the
    /// pot, and `RoomCodesExhausted`. No room exists after any error.
    pub async fn create_room(
        &self,
        player_id: &str,
        nickname: &str,
        bet_amount: u64,
    ) -> Result<GameSnapshot, GameError> {
        let nickname = validate_nickname(nickname)?;
        let coin_board = generate_board(bet_amount, &mut rand::thread_rng())?;

        let mut rooms = self.rooms.write().await;
        let room_code = Self::free_room_code(&rooms)?;

        let session = GameSession::new(
            room_code.clone(),
            bet_amount,
            coin_board,
            player_id.to_string(),
            nickname,
        );
        let snapshot = GameSnapshot::from_session(&session);

        rooms.insert(room_code.clone(), Arc::new(Mutex::new(session)));
        self.broadcaster.open_room(&room_code);
        drop(rooms);

        tracing::info!(
            "Room {} created by {} with bet {} ({}x{} board)",
            room_code,
            player_id,
            bet_amount,
            snapshot.grid_size,
            snapshot.grid_size
        );

        Ok(snapshot)
    }

    fn free_room_code(rooms: &HashMap<String, RoomHandle>) -> Result<String, GameError> {
        for _ in 0..ROOM_CODE_ATTEMPTS {
            let code = rand::thread_rng()
                .gen_range(ROOM_CODE_MIN..=ROOM_CODE_MAX)
                .to_string();
            if !rooms.contains_key(&code) {
                return Ok(code);
            }
        }

        tracing::warn!("No free room code after {} attempts", ROOM_CODE_ATTEMPTS);
        Err(GameError::RoomCodesExhausted)
    }

    /// Seat `player_id` in the second seat of `room_code` and start the game
    ///
    /// The room receives `game-updated`; the caller answers the joiner.
    pub async fn join_room(
        &self,
        room_code: &str,
        player_id: &str,
        nickname: &str,
    ) -> Result<GameSnapshot, GameError> {
        let nickname = validate_nickname(nickname)?;
        let room = self.require_room(room_code).await?;
        let mut session = room.lock().await;

        session.seat_player(player_id.to_string(), nickname)?;

        let snapshot = GameSnapshot::from_session(&session);
        self.broadcaster
            .publish(room_code, &ServerEvent::GameUpdated(snapshot.clone()));

        tracing::info!("Player {} joined room {}", player_id, room_code);
        Ok(snapshot)
    }

    /// Roll the dice for the current player of `room_code`
    ///
    /// # Returns
    ///
    /// The rolled value
    pub async fn roll_dice(&self, room_code: &str, player_id: &str) -> Result<u8, GameError> {
        let room = self.require_room(room_code).await?;
        let mut session = room.lock().await;

        let value = session.roll_dice(player_id, &mut rand::thread_rng())?;

        self.broadcaster.publish(
            room_code,
            &ServerEvent::GameUpdated(GameSnapshot::from_session(&session)),
        );
        Ok(value)
    }

    /// Place one edge for the current player of `room_code`
    ///
    /// The room receives `game-updated`, followed by `coins-completed` when
    /// the edge closed at least one box.
    ///
    /// # Returns
    ///
    /// Boxes captured by the edge, row-major
    pub async fn place_edge(
        &self,
        room_code: &str,
        player_id: &str,
        position: EdgePosition,
    ) -> Result<Vec<CapturedBox>, GameError> {
        let room = self.require_room(room_code).await?;
        let mut session = room.lock().await;

        let captured = session.place_edge(player_id, position)?;

        self.broadcaster.publish(
            room_code,
            &ServerEvent::GameUpdated(GameSnapshot::from_session(&session)),
        );
        if !captured.is_empty() {
            tracing::debug!(
                "Player {} captured {} box(es) in room {}",
                player_id,
                captured.len(),
                room_code
            );
            self.broadcaster.publish(
                room_code,
                &ServerEvent::CoinsCompleted {
                    player_id: player_id.to_string(),
                    boxes: captured.clone(),
                },
            );
        }

        Ok(captured)
    }

    /// Remove `player_id` from every room it sits in.
    ///
    /// Emptied rooms are destroyed and their channels closed. Rooms with a
    /// remaining seat are ended and told `player-left`.
    ///
    /// # Returns
    ///
    /// Codes of the rooms the player was removed from
    pub async fn disconnect(&self, player_id: &str) -> Vec<String> {
        let mut affected = Vec::new();

        for (room_code, room) in self.room_handles().await {
            let mut session = room.lock().await;
            if session.remove_player(player_id).is_none() {
                continue;
            }
            affected.push(room_code.clone());

            if session.players.is_empty() {
                let mut rooms = self.rooms.write().await;
                if rooms
                    .get(&room_code)
                    .is_some_and(|current| Arc::ptr_eq(current, &room))
                {
                    rooms.remove(&room_code);
                }
                drop(rooms);

                self.broadcaster.close_room(&room_code);
                tracing::info!("Room {} destroyed", room_code);
            } else {
                self.broadcaster.publish(
                    &room_code,
                    &ServerEvent::PlayerLeft {
                        player_id: player_id.to_string(),
                    },
                );
                self.broadcaster.publish(
                    &room_code,
                    &ServerEvent::GameUpdated(GameSnapshot::from_session(&session)),
                );
                tracing::info!("Player {} left room {}", player_id, room_code);
            }
        }

        affected
    }

    /// Current state of `room_code`
    pub async fn snapshot(&self, room_code: &str) -> Option<GameSnapshot> {
        let room = self.room(room_code).await?;
        let session = room.lock().await;
        Some(GameSnapshot::from_session(&session))
    }

    pub async fn room(&self, room_code: &str) -> Option<RoomHandle> {
        self.rooms.read().await.get(room_code).cloned()
    }

    /// Every live room, copied out so the map lock is released immediately
    pub async fn room_handles(&self) -> Vec<(String, RoomHandle)> {
        self.rooms
            .read()
            .await
            .iter()
            .map(|(code, room)| (code.clone(), Arc::clone(room)))
            .collect()
    }

    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    async fn require_room(&self, room_code: &str) -> Result<RoomHandle, GameError> {
        self.room(room_code)
            .await
            .ok_or_else(|| GameError::RoomNotFound(room_code.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::RoomChannels;
    use crate::core::CoinBoard;

    fn create_registry() -> RoomRegistry {
        RoomRegistry::new(Arc::new(RoomChannels::new()))
    }

    #[tokio::test]
    async fn test_create_room() {
        let registry = create_registry();

        let snapshot = registry.create_room("alice", "Alice", 5000).await.unwrap();

        let code: u32 = snapshot.room_code.parse().unwrap();
        assert!((ROOM_CODE_MIN..=ROOM_CODE_MAX).contains(&code));
        assert_eq!(snapshot.grid_size, 4);
        assert_eq!(snapshot.players.len(), 1);
        assert!(!snapshot.started);
        assert_eq!(registry.room_count().await, 1);
    }

    #[tokio::test]
    async fn test_create_room_rejects_bad_input_before_creating() {
        let registry = create_registry();

        assert!(matches!(
            registry.create_room("alice", "A", 5000).await,
            Err(GameError::InvalidNickname(_))
        ));
        assert_eq!(
            registry.create_room("alice", "Alice", 0).await,
            Err(GameError::InvalidBet)
        );
        assert!(matches!(
            registry.create_room("alice", "Alice", 400).await,
            Err(GameError::UnreachablePot { .. })
        ));
        assert_eq!(registry.room_count().await, 0);
    }

    #[tokio::test]
    async fn test_room_codes_are_unique() {
        let registry = create_registry();
        let mut codes = std::collections::HashSet::new();

        for i in 0..50 {
            let snapshot = registry
                .create_room(&format!("p{}", i), "Player", 1000)
                .await
                .unwrap();
            assert!(codes.insert(snapshot.room_code));
        }
        assert_eq!(registry.room_count().await, 50);
    }

    #[test]
    fn test_free_room_code_exhausted() {
        let mut rooms = HashMap::new();
        for code in ROOM_CODE_MIN..=ROOM_CODE_MAX {
            let board = CoinBoard {
                grid_size: 1,
                denominations: vec![vec![100]],
            };
            let session = GameSession::new(
                code.to_string(),
                50,
                board,
                "p".to_string(),
                "Player".to_string(),
            );
            rooms.insert(code.to_string(), Arc::new(Mutex::new(session)));
        }

        assert_eq!(
            RoomRegistry::free_room_code(&rooms),
            Err(GameError::RoomCodesExhausted)
        );
    }

    #[tokio::test]
    async fn test_join_unknown_room() {
        let registry = create_registry();

        assert_eq!(
            registry.join_room("1000", "bob", "Bob").await,
            Err(GameError::RoomNotFound("1000".to_string()))
        );
    }

    #[tokio::test]
    async fn test_disconnect_last_seat_destroys_room() {
        let registry = create_registry();
        let snapshot = registry.create_room("alice", "Alice", 1000).await.unwrap();

        let affected = registry.disconnect("alice").await;

        assert_eq!(affected, vec![snapshot.room_code.clone()]);
        assert_eq!(registry.room_count().await, 0);
        assert!(registry.snapshot(&snapshot.room_code).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_player() {
        let registry = create_registry();
        registry.create_room("alice", "Alice", 1000).await.unwrap();

        assert!(registry.disconnect("nobody").await.is_empty());
        assert_eq!(registry.room_count().await, 1);
    }
}
