/// Seats per room
pub const MAX_PLAYERS: usize = 2;

/// Faces on the die rolled at the start of each turn
pub const DICE_SIDES: u8 = 6;

/// Room codes are four decimal digits, as in "4821"
pub const ROOM_CODE_MIN: u32 = 1000;
pub const ROOM_CODE_MAX: u32 = 9999;

/// Collision retries before giving up on finding a free room code
pub const ROOM_CODE_ATTEMPTS: usize = 64;

/// Upper bound on residual repair passes in the coin board generator
pub const MAX_REPAIR_ATTEMPTS: usize = 100;

/// Capacity of each room's broadcast channel
pub const ROOM_CHANNEL_CAPACITY: usize = 100;

/// Nickname length bounds, in characters, after trimming
pub const NICKNAME_MIN_LEN: usize = 2;
pub const NICKNAME_MAX_LEN: usize = 20;
