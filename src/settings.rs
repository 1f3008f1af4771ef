//! Difficulty preference
//!
//! Persisted per game in the key-value store, next to the game's stats.

use serde::{Deserialize, Serialize};

use crate::persistence::{self, KeyValueStore, StatKind};
use crate::sim::GameId;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

/// Per-game preferences
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Settings {
    pub difficulty: Difficulty,
}

impl Settings {
    /// Load the stored preference, falling back to defaults on a missing or unknown value
    pub async fn load(store: &dyn KeyValueStore, game: GameId) -> Self {
        let key = persistence::storage_key(game, StatKind::Difficulty);
        match persistence::get_or_none(store, &key).await {
            Some(raw) => match Difficulty::from_str(&raw) {
                Some(difficulty) => {
                    log::info!("Loaded {} difficulty: {}", game.name(), difficulty.as_str());
                    Self { difficulty }
                }
                None => {
                    log::warn!("Unknown difficulty {raw:?} under {key}, using default");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    /// Store the preference (best effort)
    pub async fn save(&self, store: &dyn KeyValueStore, game: GameId) {
        let key = persistence::storage_key(game, StatKind::Difficulty);
        if persistence::set_best_effort(store, &key, self.difficulty.as_str()).await {
            log::info!("{} difficulty saved", game.name());
        }
    }
}
