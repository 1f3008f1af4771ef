//! Generic timed-challenge session
//!
//! A `Session` owns the lifecycle (start, pause, resume, restart), the score
//! and round counters, a seeded RNG and the timer queue. The game-specific
//! part is a `GameRules` strategy that reacts to taps and fired timers.

use std::sync::atomic::{AtomicU64, Ordering};

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::{
    GameEvent, GameId, GameOverId, GameOverReport, LossReason, Progress, SessionStatus,
};
use super::timers::{TimerId, TimerQueue};
use crate::consts::NUM_TARGETS;
use crate::settings::Difficulty;

/// Result of a tap or a fired timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Accepted, the run goes on
    Continue,
    /// Not accepted right now (playback running, session not active)
    Ignored,
    /// The run is over
    GameOver(LossReason),
}

/// Everything a rules strategy may touch while handling an input or timer
pub struct RoundCtx<'a, T> {
    now_ms: u64,
    difficulty: Difficulty,
    progress: &'a mut Progress,
    timers: &'a mut TimerQueue<T>,
    rng: &'a mut Pcg32,
    events: &'a mut Vec<GameEvent>,
}

impl<T: Copy + PartialEq> RoundCtx<'_, T> {
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn round(&self) -> u32 {
        self.progress.round
    }

    pub fn schedule(&mut self, delay_ms: u64, timer: T) -> TimerId {
        self.timers.schedule(self.now_ms, delay_ms, timer)
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.timers.cancel(id)
    }

    pub fn cancel_kind(&mut self, timer: T) -> usize {
        self.timers.cancel_kind(timer)
    }

    pub fn is_scheduled(&self, timer: T) -> bool {
        self.timers.due_of(timer).is_some()
    }

    /// Uniform target index in [0, NUM_TARGETS)
    pub fn draw_target(&mut self) -> usize {
        self.rng.random_range(0..NUM_TARGETS)
    }

    /// Uniform value in [0, bound); 0 when the bound is 0
    pub fn draw_below(&mut self, bound: u64) -> u64 {
        if bound == 0 {
            0
        } else {
            self.rng.random_range(0..bound)
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Score +1 and round +1
    pub fn advance_round(&mut self) {
        self.progress.score += 1;
        self.progress.round += 1;
        log::debug!(
            "Round {} reached (score {})",
            self.progress.round,
            self.progress.score
        );
        self.events.push(GameEvent::RoundAdvanced {
            round: self.progress.round,
            score: self.progress.score,
        });
    }
}

/// Per-game strategy plugged into a `Session`
pub trait GameRules {
    /// Timer kinds this game schedules
    type Timer: Copy + PartialEq + std::fmt::Debug;

    fn game(&self) -> GameId;

    /// Reset game state and schedule the first round
    fn begin(&mut self, ctx: &mut RoundCtx<'_, Self::Timer>);

    /// Player tapped target `index` (the stamina game ignores the index)
    fn respond(&mut self, ctx: &mut RoundCtx<'_, Self::Timer>, index: usize) -> Verdict;

    /// A scheduled timer came due
    fn fire(&mut self, ctx: &mut RoundCtx<'_, Self::Timer>, timer: Self::Timer) -> Verdict;

    /// Re-arm after a pause. Timers were all cancelled when pausing.
    fn rearm(&mut self, ctx: &mut RoundCtx<'_, Self::Timer>);

    /// All timers were just cancelled (pause, game over, restart)
    fn halt(&mut self) {}

    /// Target currently lit, if any
    fn lit_target(&self) -> Option<usize> {
        None
    }
}

/// Source of per-process session identities
static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// One game's session, owned by its screen
#[derive(Debug)]
pub struct Session<G: GameRules> {
    rules: G,
    /// Unique per `Session` value in this process, independent of the seed
    id: u64,
    difficulty: Difficulty,
    status: SessionStatus,
    progress: Progress,
    now_ms: u64,
    timers: TimerQueue<G::Timer>,
    rng: Pcg32,
    events: Vec<GameEvent>,
    games_started: u32,
    pending_report: Option<GameOverReport>,
    new_high_score: bool,
}

impl<G: GameRules> Session<G> {
    /// Create an idle session with the given RNG seed
    pub fn new(rules: G, seed: u64) -> Self {
        Self {
            rules,
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            difficulty: Difficulty::default(),
            status: SessionStatus::Idle,
            progress: Progress::default(),
            now_ms: 0,
            timers: TimerQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            events: Vec::new(),
            games_started: 0,
            pending_report: None,
            new_high_score: false,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Split borrow: run `f` with the rules and a context over the other fields
    fn with_ctx<R>(
        &mut self,
        f: impl FnOnce(&mut G, &mut RoundCtx<'_, G::Timer>) -> R,
    ) -> R {
        let mut ctx = RoundCtx {
            now_ms: self.now_ms,
            difficulty: self.difficulty,
            progress: &mut self.progress,
            timers: &mut self.timers,
            rng: &mut self.rng,
            events: &mut self.events,
        };
        f(&mut self.rules, &mut ctx)
    }

    /// Start a new run from any state
    pub fn start(&mut self) {
        self.timers.clear();
        self.rules.halt();
        self.progress = Progress::default();
        self.pending_report = None;
        self.new_high_score = false;
        self.games_started += 1;
        self.events.push(GameEvent::GameStarting {
            game: self.rules.game(),
            games_started: self.games_started,
        });
        self.status = SessionStatus::Active;
        log::info!(
            "{} run {} started ({})",
            self.rules.game().name(),
            self.games_started,
            self.difficulty.as_str()
        );
        self.with_ctx(|rules, ctx| rules.begin(ctx));
    }

    /// Player input. Ignored unless the session is active.
    pub fn respond(&mut self, index: usize) -> Verdict {
        if self.status != SessionStatus::Active {
            return Verdict::Ignored;
        }
        let verdict = self.with_ctx(|rules, ctx| rules.respond(ctx, index));
        self.apply(verdict);
        verdict
    }

    /// Tap without a target (stamina)
    pub fn tap(&mut self) -> Verdict {
        self.respond(0)
    }

    /// Freeze the run: cancels every pending timer, keeps score and round
    pub fn pause(&mut self) -> bool {
        if self.status != SessionStatus::Active {
            return false;
        }
        self.timers.clear();
        self.rules.halt();
        self.status = SessionStatus::Paused;
        self.events.push(GameEvent::Paused);
        true
    }

    /// Continue a paused run with freshly armed timers
    pub fn resume(&mut self) -> bool {
        if self.status != SessionStatus::Paused {
            return false;
        }
        self.status = SessionStatus::Active;
        self.events.push(GameEvent::Resumed);
        self.with_ctx(|rules, ctx| rules.rearm(ctx));
        true
    }

    /// Abandon the run and return to the start screen
    pub fn restart(&mut self) {
        self.timers.clear();
        self.rules.halt();
        self.progress = Progress::default();
        self.pending_report = None;
        self.new_high_score = false;
        self.status = SessionStatus::Idle;
    }

    /// Change difficulty. Only allowed between runs.
    pub fn select_difficulty(&mut self, difficulty: Difficulty) -> bool {
        match self.status {
            SessionStatus::Idle | SessionStatus::GameOver => {
                self.difficulty = difficulty;
                true
            }
            SessionStatus::Active | SessionStatus::Paused => {
                log::debug!("Difficulty change ignored mid-run");
                false
            }
        }
    }

    /// Advance the virtual clock by `dt_ms`, firing every timer that comes due
    pub fn advance(&mut self, dt_ms: u64) {
        let until = self.now_ms.saturating_add(dt_ms);
        while self.status == SessionStatus::Active {
            let Some((due, timer)) = self.timers.pop_due(until) else {
                break;
            };
            self.now_ms = due.max(self.now_ms);
            let verdict = self.with_ctx(|rules, ctx| rules.fire(ctx, timer));
            self.apply(verdict);
        }
        self.now_ms = until;
    }

    fn apply(&mut self, verdict: Verdict) {
        if let Verdict::GameOver(reason) = verdict {
            self.timers.clear();
            self.rules.halt();
            self.status = SessionStatus::GameOver;
            self.pending_report = Some(GameOverReport {
                id: GameOverId {
                    session: self.id,
                    run: self.games_started,
                },
                game: self.rules.game(),
                difficulty: self.difficulty,
                score: self.progress.score,
                round: self.progress.round,
                reason,
            });
            log::info!(
                "{} over: score {} ({:?})",
                self.rules.game().name(),
                self.progress.score,
                reason
            );
            self.events.push(GameEvent::GameOver {
                reason,
                score: self.progress.score,
            });
        }
    }

    /// Take the report of the run that just ended. Yields it once per game over.
    pub fn take_game_over(&mut self) -> Option<GameOverReport> {
        self.pending_report.take()
    }

    /// Record the tracker's verdict on the finished run
    pub fn resolve_game_over(&mut self, new_high_score: bool, high_score: u32) {
        if self.status != SessionStatus::GameOver {
            return;
        }
        self.new_high_score = new_high_score;
        self.events.push(GameEvent::GameOverResolved {
            new_high_score,
            high_score,
        });
    }

    /// Drain events emitted since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn game(&self) -> GameId {
        self.rules.game()
    }

    pub fn rules(&self) -> &G {
        &self.rules
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_game_over(&self) -> bool {
        self.status == SessionStatus::GameOver
    }

    pub fn score(&self) -> u32 {
        self.progress.score
    }

    pub fn round(&self) -> u32 {
        self.progress.round
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    pub fn new_high_score(&self) -> bool {
        self.new_high_score
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn games_started(&self) -> u32 {
        self.games_started
    }

    pub fn lit_target(&self) -> Option<usize> {
        self.rules.lit_target()
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Due time of the next pending timer
    pub fn next_due_ms(&self) -> Option<u64> {
        self.timers.next_due()
    }
}
