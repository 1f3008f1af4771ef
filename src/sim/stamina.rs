//! Stamina: endurance tapping game
//!
//! Taps push a fill target up, a decay timer pulls it down, and a per-round
//! countdown ends the run at zero. Filling to the goal advances the round.
//! `press_count` is the smoothed display value; only `target` decides rounds.

use super::session::{GameRules, RoundCtx, Verdict};
use super::state::{GameId, LossReason};
use crate::tuning::StaminaTuning;

/// Timers used by Stamina
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaminaTimer {
    /// Target drops by one, repeats every `decrease_ms`
    Decay,
    /// One second of the round countdown
    Countdown,
    /// Display value steps one unit toward the target
    Smooth,
}

#[derive(Debug, Clone)]
pub struct Stamina {
    tuning: StaminaTuning,
    goal: u32,
    target: u32,
    press_count: u32,
    decrease_ms: u64,
    seconds_left: u32,
}

impl Default for Stamina {
    fn default() -> Self {
        Self::with_tuning(StaminaTuning::default())
    }
}

impl Stamina {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: StaminaTuning) -> Self {
        Self {
            goal: tuning.initial_goal,
            target: 0,
            press_count: 0,
            decrease_ms: tuning.initial_decrease_ms,
            seconds_left: tuning.round_seconds,
            tuning,
        }
    }

    pub fn goal(&self) -> u32 {
        self.goal
    }

    /// Authoritative fill level
    pub fn target_press_count(&self) -> u32 {
        self.target
    }

    /// Smoothed fill level for display
    pub fn press_count(&self) -> u32 {
        self.press_count
    }

    /// Display fill as a fraction of the goal, capped at 1.0
    pub fn fill_ratio(&self) -> f32 {
        if self.goal == 0 {
            return 1.0;
        }
        (self.press_count as f32 / self.goal as f32).min(1.0)
    }

    pub fn decrease_speed_ms(&self) -> u64 {
        self.decrease_ms
    }

    pub fn round_timer_secs(&self) -> u32 {
        self.seconds_left
    }

    /// Countdown is in its last few seconds
    pub fn timer_warning(&self) -> bool {
        self.seconds_left <= self.tuning.warning_seconds
    }

    fn arm(&mut self, ctx: &mut RoundCtx<'_, StaminaTimer>) {
        ctx.cancel_kind(StaminaTimer::Decay);
        ctx.cancel_kind(StaminaTimer::Countdown);
        ctx.schedule(self.decrease_ms, StaminaTimer::Decay);
        ctx.schedule(1000, StaminaTimer::Countdown);
        self.ensure_smoothing(ctx);
    }

    fn ensure_smoothing(&self, ctx: &mut RoundCtx<'_, StaminaTimer>) {
        if self.press_count != self.target && !ctx.is_scheduled(StaminaTimer::Smooth) {
            ctx.schedule(self.tuning.smoothing_tick_ms, StaminaTimer::Smooth);
        }
    }
}

impl GameRules for Stamina {
    type Timer = StaminaTimer;

    fn game(&self) -> GameId {
        GameId::Stamina
    }

    fn begin(&mut self, ctx: &mut RoundCtx<'_, StaminaTimer>) {
        *self = Self::with_tuning(self.tuning);
        self.arm(ctx);
    }

    fn respond(&mut self, ctx: &mut RoundCtx<'_, StaminaTimer>, _index: usize) -> Verdict {
        let round = ctx.round();
        self.target = self.tuning.target_after_tap(self.target, self.goal, round);
        if self.target < self.goal {
            self.ensure_smoothing(ctx);
            return Verdict::Continue;
        }

        // growth is keyed on the round being left
        self.goal = self.tuning.next_goal(self.goal, round);
        self.decrease_ms = self.tuning.next_decrease_ms(self.decrease_ms, round);
        self.target = 0;
        self.press_count = 0;
        self.seconds_left = self.tuning.round_seconds;
        ctx.advance_round();
        ctx.cancel_kind(StaminaTimer::Smooth);
        self.arm(ctx);
        Verdict::Continue
    }

    fn fire(&mut self, ctx: &mut RoundCtx<'_, StaminaTimer>, timer: StaminaTimer) -> Verdict {
        match timer {
            StaminaTimer::Decay => {
                self.target = self.target.saturating_sub(1);
                ctx.schedule(self.decrease_ms, StaminaTimer::Decay);
                self.ensure_smoothing(ctx);
            }
            StaminaTimer::Countdown => {
                if self.seconds_left > 1 {
                    self.seconds_left -= 1;
                    ctx.schedule(1000, StaminaTimer::Countdown);
                } else {
                    self.seconds_left = 0;
                    return Verdict::GameOver(LossReason::OutOfTime);
                }
            }
            StaminaTimer::Smooth => {
                if self.press_count < self.target {
                    self.press_count += 1;
                } else if self.press_count > self.target {
                    self.press_count -= 1;
                }
                self.ensure_smoothing(ctx);
            }
        }
        Verdict::Continue
    }

    fn rearm(&mut self, ctx: &mut RoundCtx<'_, StaminaTimer>) {
        // remaining seconds carry over, periods restart
        self.arm(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{GameEvent, Session, SessionStatus};

    fn started() -> Session<Stamina> {
        let mut s = Session::new(Stamina::new(), 99);
        s.start();
        s
    }

    #[test]
    fn test_initial_state() {
        let s = started();
        let r = s.rules();
        assert_eq!(r.goal(), 8);
        assert_eq!(r.decrease_speed_ms(), 300);
        assert_eq!(r.round_timer_secs(), 20);
        assert_eq!(r.target_press_count(), 0);
        assert_eq!(s.round(), 1);
    }

    #[test]
    fn test_first_round_tap_jump() {
        let mut s = started();
        // ceil(8 * 0.6) = 5
        s.tap();
        assert_eq!(s.rules().target_press_count(), 5);
        assert_eq!(s.rules().press_count(), 0);
        // second tap crosses the goal of 8
        s.tap();
        assert_eq!(s.score(), 1);
        assert_eq!(s.round(), 2);
        assert_eq!(s.rules().goal(), 9);
        assert_eq!(s.rules().decrease_speed_ms(), 280);
        assert_eq!(s.rules().target_press_count(), 0);
        assert_eq!(s.rules().round_timer_secs(), 20);
    }

    #[test]
    fn test_round_three_goal_ten() {
        let mut s = started();
        while s.round() < 3 {
            s.tap();
        }
        assert_eq!(s.rules().goal(), 10);
        // scale 0.36, ceil(10 * 0.36) = 4
        s.tap();
        assert_eq!(s.rules().target_press_count(), 4);
    }

    #[test]
    fn test_decay_pulls_target_down() {
        let mut s = started();
        s.tap();
        s.advance(299);
        assert_eq!(s.rules().target_press_count(), 5);
        s.advance(1);
        assert_eq!(s.rules().target_press_count(), 4);
        s.advance(300 * 10);
        assert_eq!(s.rules().target_press_count(), 0);
    }

    #[test]
    fn test_smoothing_walks_one_unit_per_tick() {
        let mut s = started();
        s.tap();
        s.advance(16);
        assert_eq!(s.rules().press_count(), 1);
        s.advance(16 * 3);
        assert_eq!(s.rules().press_count(), 4);
        s.advance(16);
        assert_eq!(s.rules().press_count(), 5);
        // follows the decay back down
        s.advance(2000);
        assert_eq!(s.rules().press_count(), s.rules().target_press_count());
    }

    #[test]
    fn test_countdown_ends_run() {
        let mut s = started();
        s.advance(5000);
        assert_eq!(s.rules().round_timer_secs(), 15);
        assert!(!s.rules().timer_warning());
        s.advance(10_000);
        assert!(s.rules().timer_warning());
        s.advance(4999);
        assert_eq!(s.status(), SessionStatus::Active);
        assert_eq!(s.rules().round_timer_secs(), 1);
        s.advance(1);
        assert!(s.is_game_over());
        assert_eq!(s.rules().round_timer_secs(), 0);
        assert_eq!(
            s.take_game_over().map(|r| r.reason),
            Some(LossReason::OutOfTime)
        );
    }

    #[test]
    fn test_untouched_bar_times_out() {
        let mut s = Session::new(Stamina::new(), 3);
        s.start();
        for _ in 0..20 {
            assert!(!s.is_game_over());
            s.advance(1000);
        }
        assert!(s.is_game_over());
        assert_eq!(s.tap(), Verdict::Ignored);
        assert_eq!(s.score(), 0);
    }

    #[test]
    fn test_round_advance_resets_countdown() {
        let mut s = started();
        s.advance(12_000);
        assert_eq!(s.rules().round_timer_secs(), 8);
        s.tap();
        s.tap();
        assert_eq!(s.rules().round_timer_secs(), 20);
        s.advance(19_999);
        assert_eq!(s.status(), SessionStatus::Active);
        s.advance(1);
        assert!(s.is_game_over());
    }

    #[test]
    fn test_late_rounds_step_by_one() {
        let mut s = started();
        while s.round() <= 5 {
            s.tap();
        }
        assert_eq!(s.round(), 6);
        let before = s.rules().target_press_count();
        s.tap();
        assert_eq!(s.rules().target_press_count(), before + 1);
    }

    #[test]
    fn test_pause_keeps_seconds_left() {
        let mut s = started();
        s.advance(3500);
        assert!(s.pause());
        assert_eq!(s.pending_timers(), 0);
        s.advance(60_000);
        assert_eq!(s.rules().round_timer_secs(), 17);
        assert!(s.resume());
        assert!(s.drain_events().contains(&GameEvent::Resumed));
        s.advance(16_999);
        assert_eq!(s.status(), SessionStatus::Active);
        s.advance(1);
        assert!(s.is_game_over());
    }
}
