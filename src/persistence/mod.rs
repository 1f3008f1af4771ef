//! Async key-value persistence
//!
//! Backends:
//! - `MemoryStore`: in-process map (tests, demo runs)
//! - `FileStore`: JSON file on disk with tmp-file swap (native)
//! - `LocalStorageStore`: browser LocalStorage (wasm32)
//!
//! Callers on the gameplay path go through `get_or_none`/`set_best_effort`,
//! which log failures and never hand them back.

mod memory;
pub use memory::MemoryStore;

#[cfg(not(target_arch = "wasm32"))]
mod file;
#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

use async_trait::async_trait;
use thiserror::Error;

use crate::sim::GameId;

/// Store failure
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed store file: {0}")]
    Json(#[from] serde_json::Error),
    #[error("injected failure on {0}")]
    Injected(String),
}

/// String key-value store
///
/// Single-threaded: futures are not required to be `Send`.
#[async_trait(?Send)]
pub trait KeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Kind of value stored for a game
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatKind {
    HighScore,
    LevelCounts,
    Difficulty,
}

impl StatKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            StatKind::HighScore => "HighScore",
            StatKind::LevelCounts => "LevelCounts",
            StatKind::Difficulty => "Difficulty",
        }
    }
}

/// Store key for a game's stat, e.g. `memoryHighScore`
pub fn storage_key(game: GameId, kind: StatKind) -> String {
    format!("{}{}", game.storage_prefix(), kind.suffix())
}

/// Read a key, logging and swallowing failures
pub async fn get_or_none(store: &dyn KeyValueStore, key: &str) -> Option<String> {
    match store.get(key).await {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Read of {key} failed, treating as empty: {e}");
            None
        }
    }
}

/// Write a key, logging and dropping failures. Returns whether the write landed.
pub async fn set_best_effort(store: &dyn KeyValueStore, key: &str, value: &str) -> bool {
    match store.set(key, value).await {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Write of {key} dropped: {e}");
            false
        }
    }
}
