//! Confetti particle burst.
//!
//! [`ParticleField`] is the render tree of the overlay: [`ParticleField::fire`]
//! drops a batch of particles in, [`ParticleField::sweep`] takes out every
//! particle whose lifetime has elapsed. Removal is purely time-driven so a
//! stalled renderer cannot leak particles.

use rand::Rng;
use rand::seq::SliceRandom;

pub const BURST_SIZE: usize = 100;
pub const PALETTE: [&str; 5] = ["#f43f5e", "#ec4899", "#fb7185", "#ffd700", "#ffffff"];
/// Particles spawn just above the viewport.
pub const SPAWN_TOP_PX: f64 = -10.0;
/// Terminal vertical position as a fraction of viewport height.
pub const FALL_TO_FRACTION: f64 = 1.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BurstConfig {
    pub count: usize,
    pub min_size_px: f64,
    pub max_size_px: f64,
    pub min_lifetime_secs: f64,
    pub max_lifetime_secs: f64,
    pub max_drift_px: f64,
}

impl Default for BurstConfig {
    fn default() -> Self {
        Self {
            count: BURST_SIZE,
            min_size_px: 5.0,
            max_size_px: 15.0,
            min_lifetime_secs: 2.0,
            max_lifetime_secs: 5.0,
            max_drift_px: 50.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Circle,
    Square,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub x_percent: f64, // of viewport width, 0..100
    pub size_px: f64,
    pub color: &'static str,
    pub shape: Shape,
    pub lifetime_secs: f64,
    pub drift_px: f64,
    pub rotation_deg: f64,
    pub created_at: f64,
}

impl Particle {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, cfg: &BurstConfig, now: f64) -> Self {
        Self {
            x_percent: rng.gen_range(0.0..100.0),
            size_px: rng.gen_range(cfg.min_size_px..cfg.max_size_px),
            color: PALETTE.choose(rng).copied().unwrap_or(PALETTE[0]),
            shape: if rng.gen_bool(0.5) { Shape::Circle } else { Shape::Square },
            lifetime_secs: rng.gen_range(cfg.min_lifetime_secs..cfg.max_lifetime_secs),
            drift_px: rng.gen_range(-cfg.max_drift_px..cfg.max_drift_px),
            rotation_deg: rng.gen_range(0.0..360.0),
            created_at: now,
        }
    }

    pub fn expires_at(&self) -> f64 {
        self.created_at + self.lifetime_secs * 1000.0
    }

    /// Eased progress in 0..=1, matching CSS `ease-in` closely enough for confetti.
    pub fn progress(&self, now: f64) -> f64 {
        let t = ((now - self.created_at) / (self.lifetime_secs * 1000.0)).clamp(0.0, 1.0);
        t * t * t
    }

    /// Top-left corner, rotation and opacity in a viewport of the given size.
    pub fn pose(&self, now: f64, width: f64, height: f64) -> Pose {
        let p = self.progress(now);
        let end_y = height * FALL_TO_FRACTION;
        Pose {
            x: self.x_percent / 100.0 * width + self.drift_px * p,
            y: SPAWN_TOP_PX + (end_y - SPAWN_TOP_PX) * p,
            rotation_deg: self.rotation_deg * p,
            opacity: 1.0 - p,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub rotation_deg: f64,
    pub opacity: f64,
}

/// Live particles of every burst fired into one overlay.
#[derive(Clone, Debug, Default)]
pub struct ParticleField {
    cfg: BurstConfig,
    particles: Vec<Particle>,
}

impl ParticleField {
    pub fn new(cfg: BurstConfig) -> Self {
        Self { cfg, particles: Vec::new() }
    }

    /// Spawn one batch. Returns the time by which the whole batch has expired.
    pub fn fire<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) -> f64 {
        let mut last_expiry = now;
        self.particles.reserve(self.cfg.count);
        for _ in 0..self.cfg.count {
            let p = Particle::roll(rng, &self.cfg, now);
            last_expiry = last_expiry.max(p.expires_at());
            self.particles.push(p);
        }
        tracing::debug!(count = self.cfg.count, live = self.particles.len(), "confetti fired");
        last_expiry
    }

    /// Drop every particle whose lifetime has elapsed. Returns how many were removed.
    pub fn sweep(&mut self, now: f64) -> usize {
        let before = self.particles.len();
        self.particles.retain(|p| p.expires_at() > now);
        before - self.particles.len()
    }

    /// Earliest expiry among the live particles.
    pub fn next_expiry(&self) -> Option<f64> {
        self.particles.iter().map(Particle::expires_at).reduce(f64::min)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }
    pub fn len(&self) -> usize {
        self.particles.len()
    }
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    #[test]
    fn test_particle_ranges() {
        let mut rng = seeded_rng(11);
        let cfg = BurstConfig::default();
        let mut circles = 0;
        for _ in 0..1_000 {
            let p = Particle::roll(&mut rng, &cfg, 0.0);
            assert!((0.0..100.0).contains(&p.x_percent));
            assert!((-50.0..50.0).contains(&p.drift_px));
            assert!((0.0..360.0).contains(&p.rotation_deg));
            assert!(PALETTE.contains(&p.color));
            if p.shape == Shape::Circle {
                circles += 1;
            }
        }
        assert!((350..650).contains(&circles), "circles: {circles}");
    }

    #[test]
    fn test_pose_endpoints() {
        let mut rng = seeded_rng(12);
        let p = Particle::roll(&mut rng, &BurstConfig::default(), 100.0);
        let start = p.pose(100.0, 1000.0, 800.0);
        assert_eq!(start.y, SPAWN_TOP_PX);
        assert_eq!(start.opacity, 1.0);
        let end = p.pose(p.expires_at(), 1000.0, 800.0);
        assert!((end.y - 880.0).abs() < 1e-6);
        assert!(end.opacity.abs() < 1e-9);
        assert!((end.x - (p.x_percent * 10.0 + p.drift_px)).abs() < 1e-6);
    }

    #[test]
    fn test_sweep_removes_each_particle_once() {
        let mut rng = seeded_rng(13);
        let mut field = ParticleField::default();
        field.fire(&mut rng, 0.0);
        let mut removed = 0;
        for t in (0..=5_000).step_by(100) {
            removed += field.sweep(t as f64);
        }
        assert_eq!(removed, BURST_SIZE);
        assert!(field.is_empty());
        assert_eq!(field.sweep(10_000.0), 0);
    }

    #[test]
    fn test_nothing_removed_before_min_lifetime() {
        let mut rng = seeded_rng(14);
        let mut field = ParticleField::default();
        field.fire(&mut rng, 0.0);
        assert_eq!(field.sweep(1_999.0), 0);
        assert_eq!(field.len(), BURST_SIZE);
    }

    #[test]
    fn test_sweeping_at_next_expiry_drains_field_on_time() {
        let mut rng = seeded_rng(15);
        let mut field = ParticleField::default();
        assert_eq!(field.next_expiry(), None);
        field.fire(&mut rng, 0.0);
        let mut sweeps = 0;
        while let Some(at) = field.next_expiry() {
            assert!(field.particles().iter().all(|p| p.expires_at() >= at));
            let removed = field.sweep(at);
            assert!(removed >= 1);
            // nothing still in the field has outlived its lifetime
            assert!(field.particles().iter().all(|p| p.expires_at() > at));
            sweeps += 1;
        }
        assert!(field.is_empty());
        assert!(sweeps <= BURST_SIZE);
    }
}
