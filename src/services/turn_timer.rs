use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::ServerConfig;
use crate::core::{EdgePosition, GamePhase, RoomRegistry};

/// Deadlines for the two turn phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnTimerPolicy {
    pub roll_timeout: Option<Duration>,
    pub placement_timeout: Option<Duration>,
    pub sweep_interval: Duration,
}

impl TurnTimerPolicy {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            roll_timeout: config.roll_timeout,
            placement_timeout: config.placement_timeout,
            sweep_interval: config.sweep_interval,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.roll_timeout.is_some() || self.placement_timeout.is_some()
    }

    fn timeout_for(&self, phase: GamePhase) -> Option<Duration> {
        match phase {
            GamePhase::AwaitingRoll => self.roll_timeout,
            GamePhase::Placing => self.placement_timeout,
            GamePhase::WaitingForPlayers | GamePhase::Ended => None,
        }
    }
}

/// What the timer has to do for one overdue room
enum Overdue {
    Roll { player_id: String },
    Place { player_id: String, remaining: u8, free: Vec<EdgePosition> },
}

fn is_past(started: OffsetDateTime, timeout: Duration, now: OffsetDateTime) -> bool {
    (now - started).whole_milliseconds() >= timeout.as_millis() as i128
}

/// Act for every player whose phase deadline has passed.
///
/// An idle roller gets a roll; an idle placer gets its remaining edges
/// placed at random. Each action goes through the registry like a player
/// command, so a player acting first simply makes the timer's command fail,
/// and such failures are ignored.
///
/// # Returns
///
/// Number of rooms acted on
pub async fn enforce_deadlines(
    registry: &RoomRegistry,
    policy: &TurnTimerPolicy,
    now: OffsetDateTime,
) -> usize {
    let mut acted = 0;

    for (room_code, room) in registry.room_handles().await {
        let overdue = {
            let session = room.lock().await;
            let Some(timeout) = policy.timeout_for(session.phase) else {
                continue;
            };
            if !is_past(session.phase_started_at, timeout, now) {
                continue;
            }
            let Some(player_id) = session.current_player().map(|p| p.id.clone()) else {
                continue;
            };

            match session.dice_value {
                None => Overdue::Roll { player_id },
                Some(dice) => Overdue::Place {
                    player_id,
                    remaining: dice.saturating_sub(session.edges_placed),
                    free: session.board.free_edges(),
                },
            }
        };

        match overdue {
            Overdue::Roll { player_id } => {
                if let Ok(value) = registry.roll_dice(&room_code, &player_id).await {
                    tracing::info!(
                        "Rolled {} for idle player {} in room {}",
                        value,
                        player_id,
                        room_code
                    );
                    acted += 1;
                }
            }
            Overdue::Place {
                player_id,
                remaining,
                mut free,
            } => {
                free.shuffle(&mut rand::thread_rng());
                let mut placed = 0;
                for position in free.into_iter().take(remaining as usize) {
                    if registry
                        .place_edge(&room_code, &player_id, position)
                        .await
                        .is_err()
                    {
                        break;
                    }
                    placed += 1;
                }
                if placed > 0 {
                    tracing::info!(
                        "Placed {} edge(s) for idle player {} in room {}",
                        placed,
                        player_id,
                        room_code
                    );
                    acted += 1;
                }
            }
        }
    }

    acted
}

/// Run [`enforce_deadlines`] on a fixed interval
///
/// # Returns
///
/// The sweep task, or None when both timeouts are disabled
pub fn spawn(registry: Arc<RoomRegistry>, policy: TurnTimerPolicy) -> Option<JoinHandle<()>> {
    if !policy.is_enabled() {
        tracing::info!("Turn timer disabled");
        return None;
    }

    tracing::info!(
        "Turn timer running: roll={:?} placement={:?} sweep={:?}",
        policy.roll_timeout,
        policy.placement_timeout,
        policy.sweep_interval
    );

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(policy.sweep_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            enforce_deadlines(&registry, &policy, OffsetDateTime::now_utc()).await;
        }
    }))
}
