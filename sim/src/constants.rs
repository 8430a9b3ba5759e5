// ============================================================================
// Simulation Loop
// ============================================================================

pub const DEFAULT_TICK_RATE: u32 = 30; // Hz
pub const MIN_TICK_RATE: u32 = 4; // Hz
pub const MAX_TICK_RATE: u32 = 1000; // Hz

// ============================================================================
// Player
// ============================================================================

pub const PLAYER_MOVE_SPEED: f32 = 4.0; // meters per second
pub const PLAYER_RADIUS: f32 = 0.4; // meters

// ============================================================================
// Logging
// ============================================================================

pub const LOG_FILTER: &str = "stealth=info,sim=info";
