//! High score and level histogram tracking
//!
//! Per game the store holds the best score (`<game>HighScore`, decimal text)
//! and a histogram of how often runs ended at each score of 60 or more
//! (`<game>LevelCounts`, JSON object score -> count).
//!
//! The histogram is keyed by the score of the run being recorded, not by the
//! high score, while the stats screen only reads the entry at the high score.
//! Entries for scores that never became the high score are written but never
//! read.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT_MIN_SCORE;
use crate::persistence::{self, KeyValueStore, StatKind, StoreError};
use crate::sim::{GameId, GameOverId, GameOverReport, GameRules, Session};

/// Score -> number of runs that ended at that score
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelCounts(BTreeMap<String, u32>);

impl LevelCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse stored JSON. Anything malformed yields an empty histogram;
    /// individual non-numeric counts are skipped.
    pub fn parse(json: &str) -> Self {
        let raw: HashMap<String, serde_json::Value> = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("Malformed level counts, starting fresh: {e}");
                return Self::new();
            }
        };
        let counts = raw
            .into_iter()
            .filter_map(|(score, count)| {
                let count = count.as_u64().and_then(|c| u32::try_from(c).ok())?;
                Some((score, count))
            })
            .collect();
        Self(counts)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_else(|_| "{}".to_string())
    }

    /// Count recorded at `score` (0 if absent)
    pub fn count_at(&self, score: u32) -> u32 {
        self.0.get(&score.to_string()).copied().unwrap_or(0)
    }

    /// Add one run at `score`, returning the new count
    pub fn increment(&mut self, score: u32) -> u32 {
        let count = self.0.entry(score.to_string()).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Everything stored for one game
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedStats {
    pub high_score: u32,
    pub level_counts: LevelCounts,
}

impl PersistedStats {
    /// Histogram count at the high score, the value tiers are computed from
    pub fn level_count(&self) -> u32 {
        self.level_counts.count_at(self.high_score)
    }

    /// Load a game's stats. Read failures and bad values fall back to empty.
    pub async fn load(store: &dyn KeyValueStore, game: GameId) -> Self {
        let high_score = read_high_score(store, game).await.unwrap_or_else(|e| {
            log::warn!("Read of {} high score failed, showing 0: {e}", game.name());
            0
        });
        let level_counts = read_level_counts(store, game).await.unwrap_or_else(|e| {
            log::warn!("Read of {} level counts failed, showing none: {e}", game.name());
            LevelCounts::new()
        });
        let stats = Self {
            high_score,
            level_counts,
        };
        log::info!(
            "Loaded {} stats: high score {}, {} histogram entries",
            game.name(),
            stats.high_score,
            stats.level_counts.len()
        );
        stats
    }
}

/// Stored high score, 0 when absent or not a number. Err only when the store failed.
async fn read_high_score(store: &dyn KeyValueStore, game: GameId) -> Result<u32, StoreError> {
    let key = persistence::storage_key(game, StatKind::HighScore);
    let score = store
        .get(&key)
        .await?
        .and_then(|raw| match raw.trim().parse::<u32>() {
            Ok(score) => Some(score),
            Err(_) => {
                log::warn!("Ignoring non-numeric {key}: {raw:?}");
                None
            }
        })
        .unwrap_or(0);
    Ok(score)
}

async fn read_level_counts(
    store: &dyn KeyValueStore,
    game: GameId,
) -> Result<LevelCounts, StoreError> {
    let key = persistence::storage_key(game, StatKind::LevelCounts);
    let counts = store
        .get(&key)
        .await?
        .map(|json| LevelCounts::parse(&json))
        .unwrap_or_default();
    Ok(counts)
}

/// What recording a finished run changed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordOutcome {
    pub new_high_score: bool,
    /// High score after this run
    pub high_score: u32,
    /// Histogram count at the run's score, if it was counted
    pub level_count: Option<u32>,
}

/// Applies finished runs to the store, once per game-over event
#[derive(Debug, Default)]
pub struct HighScoreTracker {
    recorded: HashMap<GameId, GameOverId>,
}

impl HighScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished run. Returns None if this exact event was already recorded.
    ///
    /// Store failures are logged and skipped; the outcome still reflects the run.
    /// A key that could not be read is left as it is.
    pub async fn record(
        &mut self,
        store: &dyn KeyValueStore,
        report: &GameOverReport,
    ) -> Option<RecordOutcome> {
        if self.recorded.get(&report.game) == Some(&report.id) {
            log::debug!("Game over {:?} already recorded", report.id);
            return None;
        }
        self.recorded.insert(report.game, report.id);

        let game = report.game;
        // a value that could not be read is never overwritten
        let (new_high_score, high_score) = match read_high_score(store, game).await {
            Ok(stored) if report.score > stored => {
                let key = persistence::storage_key(game, StatKind::HighScore);
                persistence::set_best_effort(store, &key, &report.score.to_string()).await;
                log::info!("New {} high score: {}", game.name(), report.score);
                (true, report.score)
            }
            Ok(stored) => (false, stored),
            Err(e) => {
                log::warn!("{} high score unreadable, left untouched: {e}", game.name());
                (false, report.score)
            }
        };

        let level_count = if report.score >= LEVEL_COUNT_MIN_SCORE {
            match read_level_counts(store, game).await {
                Ok(mut counts) => {
                    let count = counts.increment(report.score);
                    let key = persistence::storage_key(game, StatKind::LevelCounts);
                    persistence::set_best_effort(store, &key, &counts.to_json()).await;
                    Some(count)
                }
                Err(e) => {
                    log::warn!("{} level counts unreadable, run not counted: {e}", game.name());
                    None
                }
            }
        } else {
            None
        };

        Some(RecordOutcome {
            new_high_score,
            high_score,
            level_count,
        })
    }

    /// Record the session's finished run, if any, and hand the verdict back to it
    pub async fn settle<G: GameRules>(
        &mut self,
        store: &dyn KeyValueStore,
        session: &mut Session<G>,
    ) -> Option<RecordOutcome> {
        let report = session.take_game_over()?;
        let outcome = self.record(store, &report).await?;
        session.resolve_game_over(outcome.new_high_score, outcome.high_score);
        Some(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::settings::Difficulty;
    use crate::sim::{GameEvent, LossReason, Stamina};

    fn report(game: GameId, run: u32, score: u32) -> GameOverReport {
        GameOverReport {
            id: GameOverId { session: 1, run },
            game,
            difficulty: Difficulty::Normal,
            score,
            round: score + 1,
            reason: LossReason::Expired,
        }
    }

    #[test]
    fn test_parse_level_counts() {
        let counts = LevelCounts::parse(r#"{"60": 3, "75": 1}"#);
        assert_eq!(counts.count_at(60), 3);
        assert_eq!(counts.count_at(75), 1);
        assert_eq!(counts.count_at(61), 0);
    }

    #[test]
    fn test_parse_malformed_is_empty() {
        assert!(LevelCounts::parse("not json").is_empty());
        assert!(LevelCounts::parse("[1, 2]").is_empty());
        assert!(LevelCounts::parse("").is_empty());
        let partial = LevelCounts::parse(r#"{"60": "lots", "61": 2, "62": -1}"#);
        assert_eq!(partial.len(), 1);
        assert_eq!(partial.count_at(61), 2);
    }

    #[test]
    fn test_json_round_trip_keeps_string_keys() {
        let mut counts = LevelCounts::new();
        counts.increment(64);
        counts.increment(64);
        assert_eq!(counts.to_json(), r#"{"64":2}"#);
    }

    #[tokio::test]
    async fn test_first_run_sets_high_score() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();
        let outcome = tracker
            .record(&store, &report(GameId::MemoryMatch, 1, 7))
            .await
            .unwrap();
        assert!(outcome.new_high_score);
        assert_eq!(outcome.high_score, 7);
        assert_eq!(outcome.level_count, None);
        assert_eq!(store.peek("memoryHighScore").as_deref(), Some("7"));
        assert_eq!(store.peek("memoryLevelCounts"), None);
    }

    #[tokio::test]
    async fn test_lower_score_keeps_record() {
        let store = MemoryStore::new().with_entry("agilityHighScore", "30");
        let mut tracker = HighScoreTracker::new();
        let outcome = tracker
            .record(&store, &report(GameId::FlashSquare, 1, 30))
            .await
            .unwrap();
        assert!(!outcome.new_high_score);
        assert_eq!(outcome.high_score, 30);
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn test_histogram_counts_each_event_once() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();
        let first = report(GameId::Stamina, 1, 61);

        let outcome = tracker.record(&store, &first).await.unwrap();
        assert_eq!(outcome.level_count, Some(1));
        // the same event again is a no-op
        assert_eq!(tracker.record(&store, &first).await, None);
        assert_eq!(
            PersistedStats::load(&store, GameId::Stamina)
                .await
                .level_counts
                .count_at(61),
            1
        );

        // a distinct event at the same score counts again
        let outcome = tracker
            .record(&store, &report(GameId::Stamina, 2, 61))
            .await
            .unwrap();
        assert_eq!(outcome.level_count, Some(2));
        assert!(!outcome.new_high_score);
    }

    #[tokio::test]
    async fn test_histogram_threshold() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();
        tracker
            .record(&store, &report(GameId::FlashSquare, 1, 59))
            .await;
        assert_eq!(store.peek("agilityLevelCounts"), None);
        tracker
            .record(&store, &report(GameId::FlashSquare, 2, 60))
            .await;
        assert_eq!(store.peek("agilityLevelCounts").as_deref(), Some(r#"{"60":1}"#));
    }

    /// Runs that do not beat the record still land in the histogram under their
    /// own score, where the stats view never looks.
    #[tokio::test]
    async fn test_non_record_runs_are_write_only_entries() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();
        tracker
            .record(&store, &report(GameId::MemoryMatch, 1, 80))
            .await;
        tracker
            .record(&store, &report(GameId::MemoryMatch, 2, 70))
            .await;
        tracker
            .record(&store, &report(GameId::MemoryMatch, 3, 70))
            .await;

        let stats = PersistedStats::load(&store, GameId::MemoryMatch).await;
        assert_eq!(stats.high_score, 80);
        assert_eq!(stats.level_counts.count_at(70), 2);
        assert_eq!(stats.level_count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_histogram_restarts() {
        let store = MemoryStore::new().with_entry("staminaLevelCounts", "{oops");
        let mut tracker = HighScoreTracker::new();
        let outcome = tracker
            .record(&store, &report(GameId::Stamina, 1, 65))
            .await
            .unwrap();
        assert_eq!(outcome.level_count, Some(1));
        assert_eq!(store.peek("staminaLevelCounts").as_deref(), Some(r#"{"65":1}"#));
    }

    #[tokio::test]
    async fn test_store_failures_do_not_block() {
        let store = MemoryStore::new();
        store.fail_reads(true);
        store.fail_writes(true);
        let mut tracker = HighScoreTracker::new();
        let outcome = tracker
            .record(&store, &report(GameId::FlashSquare, 1, 72))
            .await
            .unwrap();
        assert!(!outcome.new_high_score);
        assert_eq!(outcome.high_score, 72);
        assert_eq!(outcome.level_count, None);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_store_keeps_stats() {
        let store = MemoryStore::new()
            .with_entry("staminaHighScore", "90")
            .with_entry("staminaLevelCounts", r#"{"90":450,"70":3}"#);
        store.fail_reads(true);
        let mut tracker = HighScoreTracker::new();
        let outcome = tracker
            .record(&store, &report(GameId::Stamina, 1, 65))
            .await
            .unwrap();
        assert!(!outcome.new_high_score);
        assert_eq!(outcome.level_count, None);
        assert_eq!(store.write_count(), 0);
        assert_eq!(store.peek("staminaHighScore").as_deref(), Some("90"));
        assert_eq!(
            store.peek("staminaLevelCounts").as_deref(),
            Some(r#"{"90":450,"70":3}"#)
        );

        // once reads work again the next run is counted on top
        store.fail_reads(false);
        let outcome = tracker
            .record(&store, &report(GameId::Stamina, 2, 70))
            .await
            .unwrap();
        assert_eq!(outcome.level_count, Some(4));
        assert_eq!(outcome.high_score, 90);
        let stats = PersistedStats::load(&store, GameId::Stamina).await;
        assert_eq!(stats.level_count(), 450);
    }

    #[tokio::test]
    async fn test_fresh_session_with_same_seed_is_recorded() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();

        let mut first = Session::new(Stamina::new(), 1);
        first.start();
        first.advance(20_000);
        assert!(tracker.settle(&store, &mut first).await.is_some());

        // a remounted screen builds a new session with the same seed
        let mut second = Session::new(Stamina::new(), 1);
        second.start();
        second.tap();
        second.tap();
        second.advance(20_000);
        assert_eq!(second.score(), 1);
        let outcome = tracker.settle(&store, &mut second).await.unwrap();
        assert!(outcome.new_high_score);
        assert_eq!(store.peek("staminaHighScore").as_deref(), Some("1"));
    }

    #[tokio::test]
    async fn test_settle_flags_session_once() {
        let store = MemoryStore::new();
        let mut tracker = HighScoreTracker::new();
        let mut session = Session::new(Stamina::new(), 5);

        session.start();
        session.advance(20_000);
        assert!(session.is_game_over());
        let outcome = tracker.settle(&store, &mut session).await.unwrap();
        assert!(!outcome.new_high_score);
        assert!(!session.new_high_score());
        assert_eq!(tracker.settle(&store, &mut session).await, None);

        // score 1 beats the stored 0
        session.start();
        session.tap();
        session.tap();
        session.advance(20_000);
        let outcome = tracker.settle(&store, &mut session).await.unwrap();
        assert!(outcome.new_high_score);
        assert!(session.new_high_score());
        assert!(session.drain_events().contains(&GameEvent::GameOverResolved {
            new_high_score: true,
            high_score: 1
        }));

        // flag resets on the next start
        session.start();
        assert!(!session.new_high_score());
    }
}
