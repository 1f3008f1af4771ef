//! Data-driven game balance
//!
//! Every delay, duration and growth curve the round engines use is read from
//! the tables in this module.

use serde::{Deserialize, Serialize};

use crate::settings::Difficulty;

/// Flash Square timing for one difficulty preset (all values in ms)
///
/// Both the flash duration and the delay bound decay linearly with score and
/// are floored at their minimum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashTuning {
    pub base_flash_ms: u64,
    pub base_delay_ms: u64,
    pub min_flash_ms: u64,
    pub min_delay_ms: u64,
    pub flash_step_ms: u64,
    pub delay_step_ms: u64,
}

impl FlashTuning {
    pub const EASY: Self = Self {
        base_flash_ms: 2500,
        base_delay_ms: 2000,
        min_flash_ms: 400,
        min_delay_ms: 400,
        flash_step_ms: 15,
        delay_step_ms: 10,
    };

    pub const NORMAL: Self = Self {
        base_flash_ms: 1500,
        base_delay_ms: 250,
        min_flash_ms: 250,
        min_delay_ms: 250,
        flash_step_ms: 25,
        delay_step_ms: 20,
    };

    pub const HARD: Self = Self {
        base_flash_ms: 1200,
        base_delay_ms: 900,
        min_flash_ms: 120,
        min_delay_ms: 120,
        flash_step_ms: 40,
        delay_step_ms: 30,
    };

    pub fn for_difficulty(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => Self::EASY,
            Difficulty::Normal => Self::NORMAL,
            Difficulty::Hard => Self::HARD,
        }
    }

    /// How long a target stays lit at the given score
    pub fn flash_duration_ms(&self, score: u32) -> u64 {
        decay_floored(self.base_flash_ms, self.flash_step_ms, score, self.min_flash_ms)
    }

    /// Exclusive upper bound of the random wait before the next flash
    pub fn delay_bound_ms(&self, score: u32) -> u64 {
        decay_floored(self.base_delay_ms, self.delay_step_ms, score, self.min_delay_ms)
    }
}

impl Default for FlashTuning {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[inline]
fn decay_floored(base: u64, step: u64, score: u32, min: u64) -> u64 {
    base.saturating_sub(step.saturating_mul(score as u64)).max(min)
}

/// Memory Match playback timing (ms)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryTuning {
    /// Wait between start and the first playback
    pub lead_in_ms: u64,
    /// How long each element stays lit
    pub flash_on_ms: u64,
    /// Dark gap after each element
    pub flash_gap_ms: u64,
    /// Pause before replaying the extended sequence
    pub replay_pause_ms: u64,
}

impl Default for MemoryTuning {
    fn default() -> Self {
        Self {
            lead_in_ms: 500,
            flash_on_ms: 600,
            flash_gap_ms: 250,
            replay_pause_ms: 800,
        }
    }
}

/// Stamina progression schedule
///
/// Ratios are in whole percent so goal arithmetic stays exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaminaTuning {
    pub initial_goal: u32,
    pub initial_decrease_ms: u64,
    pub min_decrease_ms: u64,
    pub round_seconds: u32,
    /// Seconds left at which the countdown is flagged as urgent
    pub warning_seconds: u32,
    /// Rounds up to and including this one use the proportional tap jump
    pub bounce_rounds: u32,
    /// Tap jump in round 1, as percent of the goal
    pub bounce_base_pct: u32,
    /// Tap jump shrink per round, in percent of the goal
    pub bounce_step_pct: u32,
    /// Rounds below this grow fast, the rest grow slowly
    pub growth_switch_round: u32,
    pub early_growth_pct: u32,
    pub late_growth_pct: u32,
    pub early_speedup_ms: u64,
    pub late_speedup_ms: u64,
    /// Display smoothing step period
    pub smoothing_tick_ms: u64,
}

impl Default for StaminaTuning {
    fn default() -> Self {
        Self {
            initial_goal: 8,
            initial_decrease_ms: 300,
            min_decrease_ms: 120,
            round_seconds: 20,
            warning_seconds: 5,
            bounce_rounds: 5,
            bounce_base_pct: 60,
            bounce_step_pct: 12,
            growth_switch_round: 5,
            early_growth_pct: 115,
            late_growth_pct: 107,
            early_speedup_ms: 20,
            late_speedup_ms: 8,
            smoothing_tick_ms: 16,
        }
    }
}

impl StaminaTuning {
    /// Tap jump scale for a round, in percent of the goal (None past the bounce rounds)
    pub fn bounce_pct(&self, round: u32) -> Option<u32> {
        if round == 0 || round > self.bounce_rounds {
            return None;
        }
        self.bounce_base_pct
            .checked_sub((round - 1) * self.bounce_step_pct)
            .filter(|pct| *pct > 0)
    }

    /// Target fill after one tap
    pub fn target_after_tap(&self, target: u32, goal: u32, round: u32) -> u32 {
        match self.bounce_pct(round) {
            Some(pct) => {
                // ceil(goal * pct / 100)
                let step = (goal * pct).div_ceil(100);
                (target + step).max(step)
            }
            None => target + 1,
        }
    }

    /// Goal for the round following `round`
    pub fn next_goal(&self, goal: u32, round: u32) -> u32 {
        let pct = if round < self.growth_switch_round {
            self.early_growth_pct
        } else {
            self.late_growth_pct
        };
        goal * pct / 100
    }

    /// Decay period for the round following `round`
    pub fn next_decrease_ms(&self, decrease_ms: u64, round: u32) -> u64 {
        let speedup = if round < self.growth_switch_round {
            self.early_speedup_ms
        } else {
            self.late_speedup_ms
        };
        decrease_ms.saturating_sub(speedup).max(self.min_decrease_ms)
    }
}
