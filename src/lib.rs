//! Tap Trio - round-timing and scoring engine for three mini-games
//!
//! Core modules:
//! - `sim`: Deterministic round engines (Flash Square, Memory Match, Stamina)
//! - `tuning`: Data-driven timing and progression schedules
//! - `highscores`: High score and score histogram tracking
//! - `stats`: Tier progress and overall rank
//! - `persistence`: Async key-value stores
//! - `platform`: Browser/native platform abstraction
//! - `settings`: Difficulty preference

pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod settings;
pub mod sim;
pub mod stats;
pub mod tuning;

pub use highscores::{HighScoreTracker, LevelCounts, PersistedStats, RecordOutcome};
pub use persistence::{KeyValueStore, MemoryStore, StoreError};
pub use settings::{Difficulty, Settings};
pub use sim::{GameId, Session};
pub use stats::{StatsSummary, TierProgress};

/// Game configuration constants
pub mod consts {
    /// Number of tappable targets in the reflex and memory games (2x2 grid)
    pub const NUM_TARGETS: usize = 4;

    /// Runs scoring at least this much are counted in the level histogram
    pub const LEVEL_COUNT_MIN_SCORE: u32 = 60;

    /// Tier thresholds on the play count recorded at the high score
    pub const TIER_THRESHOLDS: [u32; 4] = [100, 500, 1000, 2500];

    /// Rank names indexed by tier
    pub const RANK_NAMES: [&str; 5] = ["Beginner", "Novice", "Skilled", "Legend", "Warrior"];

    /// Overall rank once every game is past the last rank name
    pub const CHAMPION_RANK: &str = "Champion";
}
