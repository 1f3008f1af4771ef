//! Tier progress and ranks
//!
//! A game's tier comes from how many runs ended at its high score. The
//! overall rank is the weakest game's tier.

use serde::Serialize;

use crate::consts::{CHAMPION_RANK, RANK_NAMES, TIER_THRESHOLDS};
use crate::highscores::PersistedStats;
use crate::persistence::KeyValueStore;
use crate::sim::GameId;

/// Number of thresholds met by `level_count` (0..=4)
pub fn tier_index(level_count: u32) -> usize {
    TIER_THRESHOLDS
        .iter()
        .take_while(|&&threshold| level_count >= threshold)
        .count()
}

/// Rank name for a tier, clamped to the last name
pub fn rank_name(tier: usize) -> &'static str {
    RANK_NAMES[tier.min(RANK_NAMES.len() - 1)]
}

/// Progress bar toward the next tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierProgress {
    pub tier: usize,
    /// Runs counted inside the current bracket, never above `needed`
    pub current: u32,
    /// Width of the current bracket, 0 once every threshold is met
    pub needed: u32,
    pub rank: &'static str,
}

impl TierProgress {
    pub fn from_level_count(level_count: u32) -> Self {
        let tier = tier_index(level_count);
        let floor = match tier {
            0 => 0,
            t => TIER_THRESHOLDS[t - 1],
        };
        // once maxed the last threshold repeats, so nothing more is needed
        let ceiling = TIER_THRESHOLDS[tier.min(TIER_THRESHOLDS.len() - 1)];
        let needed = ceiling - floor;
        let current = level_count.saturating_sub(floor).min(needed);
        Self {
            tier,
            current,
            needed,
            rank: rank_name(tier),
        }
    }

    /// Every threshold met
    pub fn is_maxed(&self) -> bool {
        self.tier >= TIER_THRESHOLDS.len()
    }

    /// Bar fill in [0, 1]
    pub fn fraction(&self) -> f32 {
        if self.needed == 0 {
            return 1.0;
        }
        self.current as f32 / self.needed as f32
    }
}

/// Overall rank from per-game tiers: the minimum tier's name, or Champion
/// once every game is beyond the rank list. No games reads as the first rank.
pub fn overall_rank(tiers: impl IntoIterator<Item = usize>) -> &'static str {
    match tiers.into_iter().min() {
        None => RANK_NAMES[0],
        Some(min) if min >= RANK_NAMES.len() => CHAMPION_RANK,
        Some(min) => RANK_NAMES[min],
    }
}

/// One row of the stats screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameStats {
    pub game: GameId,
    pub stats: PersistedStats,
    pub progress: TierProgress,
}

/// Everything the stats screen shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsSummary {
    pub games: Vec<GameStats>,
    pub overall_rank: &'static str,
}

impl StatsSummary {
    /// Read every game's stats and derive tiers and the overall rank
    pub async fn load(store: &dyn KeyValueStore) -> Self {
        let mut games = Vec::with_capacity(GameId::ALL.len());
        for game in GameId::ALL {
            let stats = PersistedStats::load(store, game).await;
            let progress = TierProgress::from_level_count(stats.level_count());
            games.push(GameStats {
                game,
                stats,
                progress,
            });
        }
        Self::from_games(games)
    }

    pub fn from_games(games: Vec<GameStats>) -> Self {
        let overall_rank = overall_rank(games.iter().map(|g| g.progress.tier));
        Self {
            games,
            overall_rank,
        }
    }

    pub fn game(&self, game: GameId) -> Option<&GameStats> {
        self.games.iter().find(|g| g.game == game)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use proptest::prelude::*;

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_index(0), 0);
        assert_eq!(tier_index(99), 0);
        assert_eq!(tier_index(100), 1);
        assert_eq!(tier_index(499), 1);
        assert_eq!(tier_index(500), 2);
        assert_eq!(tier_index(1000), 3);
        assert_eq!(tier_index(2500), 4);
        assert_eq!(tier_index(3000), 4);
    }

    #[test]
    fn test_progress_examples() {
        let p = TierProgress::from_level_count(0);
        assert_eq!((p.tier, p.current, p.needed, p.rank), (0, 0, 100, "Beginner"));

        let p = TierProgress::from_level_count(100);
        assert_eq!((p.tier, p.current, p.needed, p.rank), (1, 0, 400, "Novice"));

        let p = TierProgress::from_level_count(750);
        assert_eq!((p.tier, p.current, p.needed, p.rank), (2, 250, 500, "Skilled"));

        let p = TierProgress::from_level_count(2499);
        assert_eq!((p.tier, p.current, p.needed), (3, 1499, 1500));

        let p = TierProgress::from_level_count(2500);
        assert_eq!((p.tier, p.current, p.needed, p.rank), (4, 0, 0, "Warrior"));
        assert!(p.is_maxed());

        let p = TierProgress::from_level_count(3000);
        assert_eq!((p.tier, p.current, p.needed), (4, 0, 0));
        assert_eq!(p.fraction(), 1.0);
    }

    #[test]
    fn test_rank_clamps() {
        assert_eq!(rank_name(0), "Beginner");
        assert_eq!(rank_name(4), "Warrior");
        assert_eq!(rank_name(9), "Warrior");
    }

    #[test]
    fn test_overall_rank() {
        assert_eq!(overall_rank([4, 1, 3]), "Novice");
        assert_eq!(overall_rank([4, 4, 4]), "Warrior");
        assert_eq!(overall_rank([5, 7, 5]), "Champion");
        assert_eq!(overall_rank(Vec::new()), "Beginner");
    }

    #[tokio::test]
    async fn test_summary_from_store() {
        let store = MemoryStore::new()
            .with_entry("agilityHighScore", "72")
            .with_entry("agilityLevelCounts", r#"{"72": 120, "65": 900}"#)
            .with_entry("memoryHighScore", "61")
            .with_entry("memoryLevelCounts", r#"{"61": 600}"#)
            .with_entry("staminaHighScore", "garbage")
            .with_entry("staminaLevelCounts", "{");

        let summary = StatsSummary::load(&store).await;
        assert_eq!(summary.games.len(), 3);

        let agility = summary.game(GameId::FlashSquare).unwrap();
        assert_eq!(agility.stats.level_count(), 120);
        assert_eq!(agility.progress.rank, "Novice");
        assert_eq!(agility.progress.current, 20);

        let memory = summary.game(GameId::MemoryMatch).unwrap();
        assert_eq!(memory.progress.rank, "Skilled");

        let stamina = summary.game(GameId::Stamina).unwrap();
        assert_eq!(stamina.stats, PersistedStats::default());
        assert_eq!(stamina.progress.tier, 0);

        assert_eq!(summary.overall_rank, "Beginner");
    }

    #[tokio::test]
    async fn test_summary_survives_unreadable_store() {
        let store = MemoryStore::new().with_entry("memoryHighScore", "10");
        store.fail_reads(true);
        let summary = StatsSummary::load(&store).await;
        assert!(summary.games.iter().all(|g| g.stats.high_score == 0));
        assert_eq!(summary.overall_rank, "Beginner");
    }

    proptest! {
        #[test]
        fn prop_progress_within_bracket(count in 0u32..10_000) {
            let p = TierProgress::from_level_count(count);
            prop_assert!(p.current <= p.needed);
            prop_assert_eq!(p.needed == 0, p.is_maxed());
            prop_assert!(p.tier <= TIER_THRESHOLDS.len());
            prop_assert_eq!(p.rank, rank_name(p.tier));
        }

        #[test]
        fn prop_tier_monotonic(count in 0u32..10_000) {
            prop_assert!(tier_index(count + 1) >= tier_index(count));
        }
    }
}
