//! Platform abstraction layer
//!
//! Handles browser/native differences for seeding session RNGs. On wasm32
//! `rand` reaches the browser's crypto source through getrandom's `wasm_js`
//! backend.

/// Fresh seed for a new session
pub fn random_seed() -> u64 {
    rand::random()
}
