//! Tap Trio entry point
//!
//! Native: a scripted player runs each game on a fixed timestep, the runs are
//! recorded to a JSON file store and the stats screen is printed.
//! Web: sets up logging and reports the stats held in LocalStorage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use tap_trio::consts::NUM_TARGETS;
    use tap_trio::persistence::{FileStore, KeyValueStore};
    use tap_trio::platform;
    use tap_trio::sim::{FlashSquare, GameRules, MemoryMatch, Session, Stamina};
    use tap_trio::{GameId, HighScoreTracker, Settings, StatsSummary};

    /// Fixed demo timestep (~60 Hz)
    const STEP_MS: u64 = 16;
    /// A run still going after this much simulated time is abandoned
    const MAX_RUN_MS: u64 = 30 * 60 * 1000;
    /// The app offered an interstitial every this many starts
    const AD_EVERY_N_STARTS: u32 = 5;

    pub async fn run() {
        let path =
            std::env::var("TAP_TRIO_STORE").unwrap_or_else(|_| "tap_trio_stats.json".into());
        let runs: u32 = std::env::var("TAP_TRIO_RUNS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);
        let store = FileStore::new(&path);
        let mut tracker = HighScoreTracker::new();
        let mut bot_rng = Pcg32::seed_from_u64(platform::random_seed());

        log::info!("Recording {runs} runs per game to {path}");

        let settings = Settings::load(&store, GameId::FlashSquare).await;
        settings.save(&store, GameId::FlashSquare).await;
        let mut flash = Session::new(FlashSquare::new(), platform::random_seed())
            .with_difficulty(settings.difficulty);
        for _ in 0..runs {
            let mut seen: Option<(u64, u64)> = None;
            play(&mut flash, &mut tracker, &store, &mut bot_rng, |s, rng| {
                flash_bot(s, rng, &mut seen)
            })
            .await;
        }

        let mut memory = Session::new(MemoryMatch::new(), platform::random_seed());
        for _ in 0..runs {
            let mut next_tap_ms = 0;
            play(&mut memory, &mut tracker, &store, &mut bot_rng, |s, rng| {
                memory_bot(s, rng, &mut next_tap_ms)
            })
            .await;
        }

        let mut stamina = Session::new(Stamina::new(), platform::random_seed());
        for _ in 0..runs {
            let mut next_tap_ms = 0;
            play(&mut stamina, &mut tracker, &store, &mut bot_rng, |s, rng| {
                stamina_bot(s, rng, &mut next_tap_ms)
            })
            .await;
        }

        print_stats(&StatsSummary::load(&store).await);
    }

    /// Play one run to game over and record it
    async fn play<G: GameRules>(
        session: &mut Session<G>,
        tracker: &mut HighScoreTracker,
        store: &dyn KeyValueStore,
        rng: &mut Pcg32,
        mut bot: impl FnMut(&Session<G>, &mut Pcg32) -> Option<usize>,
    ) {
        session.start();
        let mut elapsed = 0;
        while !session.is_game_over() && elapsed < MAX_RUN_MS {
            if let Some(index) = bot(session, rng) {
                session.respond(index);
            }
            session.advance(STEP_MS);
            elapsed += STEP_MS;
            for event in session.drain_events() {
                if event.is_every_nth_start(AD_EVERY_N_STARTS) {
                    log::info!("Interstitial slot before this run");
                }
                log::debug!("{event:?}");
            }
        }

        if !session.is_game_over() {
            log::warn!(
                "{} run abandoned at score {}",
                session.game().name(),
                session.score()
            );
            session.restart();
            return;
        }

        if let Some(outcome) = tracker.settle(store, session).await {
            log::info!(
                "{} finished: score {}, best {}{}",
                session.game().name(),
                session.score(),
                outcome.high_score,
                if outcome.new_high_score { " (new!)" } else { "" }
            );
        }
    }

    /// Reacts after a human-ish delay, sometimes taps the wrong square
    fn flash_bot(
        s: &Session<FlashSquare>,
        rng: &mut Pcg32,
        seen: &mut Option<(u64, u64)>,
    ) -> Option<usize> {
        let Some(target) = s.lit_target() else {
            *seen = None;
            return None;
        };
        let (seen_at, reaction) =
            *seen.get_or_insert((s.now_ms(), rng.random_range(150..350)));
        if s.now_ms() < seen_at + reaction {
            return None;
        }
        *seen = None;
        if rng.random_bool(0.02) {
            Some((target + 1) % NUM_TARGETS)
        } else {
            Some(target)
        }
    }

    /// Repeats the sequence at a steady pace; longer sequences slip more often
    fn memory_bot(
        s: &Session<MemoryMatch>,
        rng: &mut Pcg32,
        next_tap_ms: &mut u64,
    ) -> Option<usize> {
        let rules = s.rules();
        if !rules.is_user_turn() || s.now_ms() < *next_tap_ms {
            return None;
        }
        *next_tap_ms = s.now_ms() + 300;
        let expected = rules.sequence()[rules.user_input().len()];
        let slip = (rules.sequence().len() as f64 * 0.004).min(1.0);
        if rng.random_bool(slip) {
            Some((expected + 1 + rng.random_range(0..NUM_TARGETS - 1)) % NUM_TARGETS)
        } else {
            Some(expected)
        }
    }

    /// Taps fast at first and tires over the run
    fn stamina_bot(
        s: &Session<Stamina>,
        rng: &mut Pcg32,
        next_tap_ms: &mut u64,
    ) -> Option<usize> {
        if s.now_ms() < *next_tap_ms {
            return None;
        }
        let fatigue = s.score() as u64 * 12;
        *next_tap_ms = s.now_ms() + 70 + fatigue + rng.random_range(0..40);
        Some(0)
    }

    fn print_stats(summary: &StatsSummary) {
        println!();
        for row in &summary.games {
            let p = &row.progress;
            println!(
                "{:<13} best {:>4}  {:<8} {:>4} / {:<4}",
                row.game.name(),
                row.stats.high_score,
                p.rank,
                p.current,
                p.needed
            );
        }
        println!("Overall rank: {}", summary.overall_rank);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    use tap_trio::StatsSummary;
    use tap_trio::persistence::LocalStorageStore;

    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Tap Trio starting...");
    let summary = StatsSummary::load(&LocalStorageStore::new()).await;
    log::info!("Overall rank: {}", summary.overall_rank);
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::init();
    log::info!("Tap Trio (native) starting...");
    demo::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
