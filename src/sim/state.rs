//! Shared session types
//!
//! Everything the presentation layer observes about a session lives here:
//! the game catalog, lifecycle status, loss reasons and emitted events.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// The three mini-games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameId {
    /// Reflex: tap the lit square before it fades
    FlashSquare,
    /// Sequence memory: repeat a growing sequence
    MemoryMatch,
    /// Endurance: keep the bar filled against decay
    Stamina,
}

impl GameId {
    pub const ALL: [GameId; 3] = [GameId::FlashSquare, GameId::MemoryMatch, GameId::Stamina];

    /// Display name
    pub fn name(&self) -> &'static str {
        match self {
            GameId::FlashSquare => "Flash Square",
            GameId::MemoryMatch => "Memory Match",
            GameId::Stamina => "Stamina",
        }
    }

    /// Store key prefix
    pub fn storage_prefix(&self) -> &'static str {
        match self {
            GameId::FlashSquare => "agility",
            GameId::MemoryMatch => "memory",
            GameId::Stamina => "stamina",
        }
    }
}

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Start screen, nothing scheduled
    Idle,
    /// Timers running, input accepted
    Active,
    /// Timers cancelled, score and round frozen
    Paused,
    /// Run ended
    GameOver,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LossReason {
    /// Tapped while nothing was lit
    NoStimulus,
    /// Tapped a target other than the lit one
    WrongTarget { expected: usize, got: usize },
    /// The lit target faded before it was tapped
    Expired,
    /// Tapped out of order while repeating the sequence
    SequenceMismatch { position: usize },
    /// Round countdown hit zero
    OutOfTime,
}

/// Score and round counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub score: u32,
    pub round: u32,
}

impl Default for Progress {
    fn default() -> Self {
        Self { score: 0, round: 1 }
    }
}

/// Identity of one game-over event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GameOverId {
    /// Identity of the `Session` that produced it
    pub session: u64,
    /// 1-based run number within that session
    pub run: u32,
}

/// Final result of a run, handed to the high score tracker once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOverReport {
    pub id: GameOverId,
    pub game: GameId,
    pub difficulty: Difficulty,
    pub score: u32,
    pub round: u32,
    pub reason: LossReason,
}

/// Events emitted by a session, drained by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A run is about to start (ads, intro sound)
    GameStarting { game: GameId, games_started: u32 },
    /// A target lit up and must be answered within `duration_ms`
    StimulusShown { target: usize, duration_ms: u64 },
    /// The lit target was tapped
    Hit { target: usize },
    /// Sequence playback lit a target
    PlaybackStep { target: usize },
    /// Playback finished, the player may tap
    UserTurn,
    RoundAdvanced { round: u32, score: u32 },
    Paused,
    Resumed,
    GameOver { reason: LossReason, score: u32 },
    /// The tracker has settled the run (ads, fanfare)
    GameOverResolved { new_high_score: bool, high_score: u32 },
}

impl GameEvent {
    /// True if this is the n-th start (n > 0), e.g. for an interstitial every fifth run
    pub fn is_every_nth_start(&self, n: u32) -> bool {
        match self {
            GameEvent::GameStarting { games_started, .. } => {
                n > 0 && *games_started > 0 && games_started % n == 0
            }
            _ => false,
        }
    }
}
