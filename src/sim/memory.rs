//! Memory Match: sequence memory game
//!
//! The sequence is played back one target at a time, then the player repeats
//! it. Every correct repetition appends one random target and replays.

use super::session::{GameRules, RoundCtx, Verdict};
use super::state::{GameEvent, GameId, LossReason};
use crate::tuning::MemoryTuning;

/// Timers used by Memory Match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryTimer {
    /// Light the element under the playback cursor (or hand over to the player)
    Light,
    /// Turn the lit element off and move the cursor
    Dark,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryMatch {
    tuning: MemoryTuning,
    sequence: Vec<usize>,
    user_input: Vec<usize>,
    /// Index into `sequence` while playing back
    cursor: Option<usize>,
    lit: Option<usize>,
    user_turn: bool,
}

impl MemoryMatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tuning(tuning: MemoryTuning) -> Self {
        Self {
            tuning,
            ..Self::default()
        }
    }

    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    pub fn user_input(&self) -> &[usize] {
        &self.user_input
    }

    /// Taps are only accepted once playback has finished
    pub fn is_user_turn(&self) -> bool {
        self.user_turn
    }

    pub fn is_playing_back(&self) -> bool {
        self.cursor.is_some()
    }

    fn start_playback(&mut self, ctx: &mut RoundCtx<'_, MemoryTimer>, delay_ms: u64) {
        self.user_turn = false;
        self.lit = None;
        self.cursor = Some(0);
        ctx.schedule(delay_ms, MemoryTimer::Light);
    }
}

impl GameRules for MemoryMatch {
    type Timer = MemoryTimer;

    fn game(&self) -> GameId {
        GameId::MemoryMatch
    }

    fn begin(&mut self, ctx: &mut RoundCtx<'_, MemoryTimer>) {
        self.sequence.clear();
        self.user_input.clear();
        self.sequence.push(ctx.draw_target());
        self.start_playback(ctx, self.tuning.lead_in_ms);
    }

    fn respond(&mut self, ctx: &mut RoundCtx<'_, MemoryTimer>, index: usize) -> Verdict {
        if !self.user_turn {
            return Verdict::Ignored;
        }
        self.user_input.push(index);
        let position = self.user_input.len() - 1;
        if self.sequence.get(position) != Some(&index) {
            self.user_turn = false;
            return Verdict::GameOver(LossReason::SequenceMismatch { position });
        }
        if self.user_input.len() == self.sequence.len() {
            ctx.advance_round();
            let next = ctx.draw_target();
            self.sequence.push(next);
            self.user_input.clear();
            self.start_playback(ctx, self.tuning.replay_pause_ms);
        }
        Verdict::Continue
    }

    fn fire(&mut self, ctx: &mut RoundCtx<'_, MemoryTimer>, timer: MemoryTimer) -> Verdict {
        let Some(cursor) = self.cursor else {
            log::debug!("Stale {timer:?} outside playback");
            return Verdict::Continue;
        };
        match timer {
            MemoryTimer::Light => match self.sequence.get(cursor) {
                Some(&target) => {
                    self.lit = Some(target);
                    ctx.emit(GameEvent::PlaybackStep { target });
                    ctx.schedule(self.tuning.flash_on_ms, MemoryTimer::Dark);
                }
                None => {
                    self.cursor = None;
                    self.user_turn = true;
                    ctx.emit(GameEvent::UserTurn);
                }
            },
            MemoryTimer::Dark => {
                self.lit = None;
                self.cursor = Some(cursor + 1);
                ctx.schedule(self.tuning.flash_gap_ms, MemoryTimer::Light);
            }
        }
        Verdict::Continue
    }

    fn rearm(&mut self, ctx: &mut RoundCtx<'_, MemoryTimer>) {
        // partial input is dropped and the whole sequence replays
        self.user_input.clear();
        self.start_playback(ctx, self.tuning.lead_in_ms);
    }

    fn halt(&mut self) {
        self.cursor = None;
        self.lit = None;
        self.user_turn = false;
    }

    fn lit_target(&self) -> Option<usize> {
        self.lit
    }
}
