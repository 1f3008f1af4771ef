//! Flash Square: reflex game
//!
//! Wait a random delay, light one target, and require a tap on it before the
//! flash runs out. Both the delay bound and the flash shrink with score.

use super::session::{GameRules, RoundCtx, Verdict};
use super::state::{GameEvent, GameId, LossReason};
use super::timers::TimerId;
use crate::tuning::FlashTuning;

/// Timers used by Flash Square
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashTimer {
    /// End of the waiting delay: light a target
    Reveal,
    /// End of the flash: the target was missed
    Expire,
}

/// Round phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPhase {
    Idle,
    /// Nothing lit, a reveal is scheduled
    Waiting,
    /// `target` is lit until `shown_at_ms + duration_ms`
    Flashing {
        target: usize,
        shown_at_ms: u64,
        duration_ms: u64,
        expire: TimerId,
    },
}

#[derive(Debug, Clone)]
pub struct FlashSquare {
    phase: FlashPhase,
    /// Overrides the difficulty preset when set
    tuning: Option<FlashTuning>,
}

impl Default for FlashSquare {
    fn default() -> Self {
        Self::new()
    }
}

impl FlashSquare {
    pub fn new() -> Self {
        Self {
            phase: FlashPhase::Idle,
            tuning: None,
        }
    }

    /// Use a fixed tuning table instead of the session's difficulty preset
    pub fn with_tuning(tuning: FlashTuning) -> Self {
        Self {
            phase: FlashPhase::Idle,
            tuning: Some(tuning),
        }
    }

    pub fn phase(&self) -> FlashPhase {
        self.phase
    }

    /// Opacity of the lit target: 1.0 when it lights, 0.0 when it expires
    pub fn fade(&self, now_ms: u64) -> f32 {
        match self.phase {
            FlashPhase::Flashing {
                shown_at_ms,
                duration_ms,
                ..
            } if duration_ms > 0 => {
                let elapsed = now_ms.saturating_sub(shown_at_ms) as f32;
                (1.0 - elapsed / duration_ms as f32).clamp(0.0, 1.0)
            }
            _ => 0.0,
        }
    }

    fn tuning(&self, ctx: &RoundCtx<'_, FlashTimer>) -> FlashTuning {
        self.tuning
            .unwrap_or_else(|| FlashTuning::for_difficulty(ctx.difficulty()))
    }

    fn schedule_wait(&mut self, ctx: &mut RoundCtx<'_, FlashTimer>) {
        let bound = self.tuning(ctx).delay_bound_ms(ctx.score());
        let delay = ctx.draw_below(bound);
        self.phase = FlashPhase::Waiting;
        ctx.schedule(delay, FlashTimer::Reveal);
    }
}

impl GameRules for FlashSquare {
    type Timer = FlashTimer;

    fn game(&self) -> GameId {
        GameId::FlashSquare
    }

    fn begin(&mut self, ctx: &mut RoundCtx<'_, FlashTimer>) {
        self.schedule_wait(ctx);
    }

    fn respond(&mut self, ctx: &mut RoundCtx<'_, FlashTimer>, index: usize) -> Verdict {
        match self.phase {
            FlashPhase::Flashing { target, expire, .. } if target == index => {
                ctx.cancel(expire);
                ctx.emit(GameEvent::Hit { target });
                ctx.advance_round();
                self.schedule_wait(ctx);
                Verdict::Continue
            }
            FlashPhase::Flashing { target, expire, .. } => {
                ctx.cancel(expire);
                self.phase = FlashPhase::Idle;
                Verdict::GameOver(LossReason::WrongTarget {
                    expected: target,
                    got: index,
                })
            }
            FlashPhase::Waiting | FlashPhase::Idle => {
                ctx.cancel_kind(FlashTimer::Reveal);
                self.phase = FlashPhase::Idle;
                Verdict::GameOver(LossReason::NoStimulus)
            }
        }
    }

    fn fire(&mut self, ctx: &mut RoundCtx<'_, FlashTimer>, timer: FlashTimer) -> Verdict {
        match (timer, self.phase) {
            (FlashTimer::Reveal, FlashPhase::Waiting) => {
                let target = ctx.draw_target();
                let duration_ms = self.tuning(ctx).flash_duration_ms(ctx.score());
                let expire = ctx.schedule(duration_ms, FlashTimer::Expire);
                self.phase = FlashPhase::Flashing {
                    target,
                    shown_at_ms: ctx.now_ms(),
                    duration_ms,
                    expire,
                };
                ctx.emit(GameEvent::StimulusShown {
                    target,
                    duration_ms,
                });
                Verdict::Continue
            }
            (FlashTimer::Expire, FlashPhase::Flashing { .. }) => {
                self.phase = FlashPhase::Idle;
                Verdict::GameOver(LossReason::Expired)
            }
            (timer, phase) => {
                log::debug!("Stale {timer:?} in {phase:?}");
                Verdict::Continue
            }
        }
    }

    fn rearm(&mut self, ctx: &mut RoundCtx<'_, FlashTimer>) {
        // never resumes mid-flash
        self.schedule_wait(ctx);
    }

    fn halt(&mut self) {
        self.phase = FlashPhase::Idle;
    }

    fn lit_target(&self) -> Option<usize> {
        match self.phase {
            FlashPhase::Flashing { target, .. } => Some(target),
            _ => None,
        }
    }
}
