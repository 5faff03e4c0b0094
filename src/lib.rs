//! Valentine card core crate.
//!
//! The interactive parts of the greeting card: the catch-the-heart mini-game
//! ([`game`]), the confetti burst fired when the proposal is accepted
//! ([`burst`]), the typewriter love letter and the proposal flow. Those modules
//! are plain Rust with injected clocks and random sources; the [`web`] module
//! mounts them on canvases and exposes them to the page through wasm-bindgen.

use wasm_bindgen::prelude::*;

pub mod burst;
pub mod card;
pub mod config;
pub mod error;
pub mod game;
pub mod proposal;
pub mod rng;
pub mod typewriter;
pub mod web;

pub use burst::{BURST_SIZE, BurstConfig, Particle, ParticleField, Shape};
pub use card::Card;
pub use config::CardConfig;
pub use error::CardError;
pub use game::{FallingHeart, GameSession, GameState, GameTuning, HeartId, Tick};
pub use proposal::ProposalState;
pub use typewriter::Typewriter;
pub use web::card::ValentineCard;
pub use web::catch_game::CatchGame;
pub use web::confetti::fire_confetti;

// Optional small allocator for size (feature gated)
#[cfg(feature = "wee_alloc")]
#[global_allocator]
static ALLOC: wee_alloc::WeeAlloc = wee_alloc::WeeAlloc::INIT;

#[wasm_bindgen(start)]
pub fn wasm_start() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}
