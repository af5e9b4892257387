//! Mutant Collector - an arcade survival game with mutating rules
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, collisions, level sessions, run controller)
//! - `settings`: Run configuration loaded from JSON
//! - `highscores`: Append-only score history file

pub mod highscores;
pub mod settings;
pub mod sim;

pub use highscores::{ScoreHistory, ScoreRecord};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Simulation frames per time unit (one time unit = one second)
    pub const FRAMES_PER_SECOND: u64 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f32 = 1.0 / FRAMES_PER_SECOND as f32;

    /// Playfield dimensions (pixels)
    pub const PLAY_WIDTH: f32 = 800.0;
    pub const PLAY_HEIGHT: f32 = 600.0;
    /// Reserved top band for the status display
    pub const STATUS_BAND_HEIGHT: f32 = 130.0;

    /// Entity extents (all entities are squares)
    pub const AVATAR_SIZE: f32 = 50.0;
    pub const COLLECTIBLE_SIZE: f32 = 30.0;
    pub const BOOSTER_SIZE: f32 = 30.0;
    pub const HAZARD_SIZE: f32 = 40.0;

    /// Lives at the start of a run
    pub const STARTING_LIVES: u8 = 3;
    /// Levels in a full run
    pub const MAX_LEVELS: u32 = 5;
    /// Collectibles spawned per level number (level 3 spawns 15)
    pub const COLLECTIBLES_PER_LEVEL: u32 = 5;
    /// Chance that a level spawns a booster
    pub const BOOSTER_CHANCE: f64 = 0.3;

    /// Level time budget (ticks)
    pub const LEVEL_TIME_LIMIT_TICKS: u64 = 30 * FRAMES_PER_SECOND;
    /// Post-hit immunity window (ticks)
    pub const IMMUNITY_TICKS: u64 = 3 * FRAMES_PER_SECOND;
    /// Slow-field duration (ticks)
    pub const SLOW_FIELD_TICKS: u64 = 5 * FRAMES_PER_SECOND;
    /// Pickups within this many ticks of spawning are worth the bonus
    pub const FAST_PICKUP_TICKS: u64 = 5 * FRAMES_PER_SECOND;

    /// Points for a fast and a late pickup
    pub const FAST_PICKUP_POINTS: u64 = 3;
    pub const LATE_PICKUP_POINTS: u64 = 1;
    /// Hazard speed multiplier while the slow-field runs
    pub const SLOW_FIELD_FACTOR: f32 = 0.5;

    /// Flicker half-period of the avatar while immune (ticks)
    pub const FLICKER_TICKS: u64 = 6;
}

/// Convert a tick count to whole seconds remaining, rounding down
#[inline]
pub fn ticks_to_secs(ticks: u64) -> u64 {
    ticks / consts::FRAMES_PER_SECOND
}
