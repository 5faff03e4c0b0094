//! Random source construction.
//!
//! Everything that rolls dice takes `&mut impl Rng`, so tests hand in a
//! `ChaCha8Rng::seed_from_u64(..)` and the page hands in [`entropy_rng`].

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// The generator type owned by browser widgets.
pub type CardRng = ChaCha8Rng;

/// Deterministic generator for a given seed.
pub fn seeded_rng(seed: u64) -> CardRng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Generator seeded from platform entropy (`crypto.getRandomValues` in the
/// browser). Falls back to `fallback_seed` if the platform has no entropy source.
pub fn entropy_rng(fallback_seed: u64) -> CardRng {
    let mut seed = [0u8; 32];
    match getrandom::getrandom(&mut seed) {
        Ok(()) => ChaCha8Rng::from_seed(seed),
        Err(err) => {
            tracing::warn!("entropy unavailable ({err}), seeding from {fallback_seed}");
            seeded_rng(fallback_seed)
        }
    }
}
