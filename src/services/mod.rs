pub mod turn_timer;

pub use turn_timer::{enforce_deadlines, TurnTimerPolicy};
