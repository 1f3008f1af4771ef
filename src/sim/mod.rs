//! Deterministic round engines
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Virtual millisecond clock only, advanced by the caller
//! - Seeded RNG only
//! - Every delay is a cancelable timer owned by the session
//! - No rendering, audio or storage dependencies

pub mod flash;
pub mod memory;
pub mod session;
pub mod stamina;
pub mod state;
pub mod timers;

pub use flash::{FlashPhase, FlashSquare, FlashTimer};
pub use memory::{MemoryMatch, MemoryTimer};
pub use session::{GameRules, RoundCtx, Session, Verdict};
pub use stamina::{Stamina, StaminaTimer};
pub use state::{
    GameEvent, GameId, GameOverId, GameOverReport, LossReason, Progress, SessionStatus,
};
pub use timers::{TimerId, TimerQueue};
