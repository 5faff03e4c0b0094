//! Catch-the-heart mini-game core.
//!
//! Hearts fall from the top of the play area; the player catches them by
//! clicking or tapping before they land. A session runs for a fixed number of
//! seconds, counted down by an external one-second ticker, while a frame-driven
//! loop calls [`GameSession::advance`] to spawn a heart every 800ms.
//!
//! Nothing in here touches the DOM. The browser widget (`web::catch_game`) owns
//! one [`GameSession`], feeds it timestamps from `performance.now()`, and
//! injects `catch` / `expire` events from pointer input and fall completion.

use rand::Rng;

// --- Tuning ------------------------------------------------------------------

pub const GAME_DURATION_SECS: u32 = 30;
pub const SPAWN_INTERVAL_MS: f64 = 800.0;
pub const COUNTDOWN_INTERVAL_MS: i32 = 1000;
/// Fall time of a heart at speed 1.0; slower hearts take `BASE_FALL_SECS / speed`.
pub const BASE_FALL_SECS: f64 = 4.0;
/// Hearts start this many pixels above the play area...
pub const HEART_START_OFFSET_PX: f64 = 50.0;
/// ...and land at this fraction of its height (past the bottom edge).
pub const HEART_LANDING_FRACTION: f64 = 1.2;
/// Clickable radius around a heart center (32px glyph plus padding).
pub const HEART_HIT_RADIUS_PX: f64 = 24.0;

/// Knobs for one game widget. `Default` is the shipped game.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GameTuning {
    pub duration_secs: u32,
    pub spawn_interval_ms: f64,
    pub base_fall_secs: f64,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self {
            duration_secs: GAME_DURATION_SECS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            base_fall_secs: BASE_FALL_SECS,
        }
    }
}

// --- Hearts ------------------------------------------------------------------

/// Key of a falling heart: the session generation it was spawned in plus its
/// spawn timestamp. The generation keeps ids from a previous play-through from
/// ever matching a heart of the current one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeartId {
    generation: u32,
    spawned_at_ms: u64,
}

impl HeartId {
    pub fn new(generation: u32, spawned_at_ms: u64) -> Self {
        Self { generation, spawned_at_ms }
    }
    pub fn generation(&self) -> u32 {
        self.generation
    }
    pub fn spawned_at_ms(&self) -> u64 {
        self.spawned_at_ms
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FallingHeart {
    pub id: HeartId,
    pub x_percent: f64, // 10..90 of play-area width
    pub speed: f64,     // 0.5..1.0
    pub spawned_at: f64,
    fall_ms: f64,
}

impl FallingHeart {
    fn roll<R: Rng + ?Sized>(rng: &mut R, id: HeartId, now: f64, base_fall_secs: f64) -> Self {
        let x_percent = rng.gen_range(10.0..90.0);
        let speed = rng.gen_range(0.5..1.0);
        Self { id, x_percent, speed, spawned_at: now, fall_ms: base_fall_secs / speed * 1000.0 }
    }

    pub fn fall_duration_secs(&self) -> f64 {
        self.fall_ms / 1000.0
    }

    /// Linear fall progress in 0..=1.
    pub fn progress(&self, now: f64) -> f64 {
        ((now - self.spawned_at) / self.fall_ms).clamp(0.0, 1.0)
    }

    pub fn landed(&self, now: f64) -> bool {
        self.progress(now) >= 1.0
    }

    /// Center of the heart in play-area pixels.
    pub fn position(&self, now: f64, width: f64, height: f64) -> (f64, f64) {
        let top = -HEART_START_OFFSET_PX;
        let bottom = height * HEART_LANDING_FRACTION;
        let y = top + (bottom - top) * self.progress(now);
        (self.x_percent / 100.0 * width, y)
    }
}

// --- Session -----------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameState {
    Idle,
    Running,
    Ended,
}

/// Result of a countdown tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Session not running; the tick was ignored.
    Inactive,
    /// Seconds left after this tick.
    Counting(u32),
    /// This tick ran the clock out. Reported exactly once per session.
    Ended,
}

/// One play-through of the catch game, owned by its widget.
#[derive(Clone, Debug)]
pub struct GameSession {
    tuning: GameTuning,
    state: GameState,
    score: u32,
    time_remaining: u32,
    hearts: Vec<FallingHeart>,
    generation: u32,
    last_spawn_at: f64,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(GameTuning::default())
    }
}

impl GameSession {
    pub fn new(tuning: GameTuning) -> Self {
        Self {
            tuning,
            state: GameState::Idle,
            score: 0,
            time_remaining: tuning.duration_secs,
            hearts: Vec::new(),
            generation: 0,
            last_spawn_at: 0.0,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }
    pub fn is_running(&self) -> bool {
        self.state == GameState::Running
    }
    pub fn score(&self) -> u32 {
        self.score
    }
    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }
    pub fn hearts(&self) -> &[FallingHeart] {
        &self.hearts
    }
    pub fn generation(&self) -> u32 {
        self.generation
    }
    pub fn tuning(&self) -> &GameTuning {
        &self.tuning
    }

    /// Start (or restart) a play-through. Valid from any state.
    pub fn start(&mut self, now: f64) {
        self.generation = self.generation.wrapping_add(1);
        self.state = GameState::Running;
        self.score = 0;
        self.time_remaining = self.tuning.duration_secs;
        self.hearts.clear();
        self.last_spawn_at = now;
        tracing::info!(generation = self.generation, "catch game started");
    }

    /// Player caught `id`. Returns true if it was live and scored; stale,
    /// already-caught and already-landed ids are ignored.
    pub fn catch(&mut self, id: HeartId) -> bool {
        if !self.is_running() || !self.remove(id) {
            return false;
        }
        self.score += 1;
        tracing::debug!(score = self.score, "heart caught");
        true
    }

    /// Heart `id` finished falling uncaught. Same idempotent removal as `catch`.
    pub fn expire(&mut self, id: HeartId) -> bool {
        self.is_running() && self.remove(id)
    }

    fn remove(&mut self, id: HeartId) -> bool {
        match self.hearts.iter().position(|h| h.id == id) {
            Some(idx) => {
                self.hearts.remove(idx);
                true
            }
            None => false,
        }
    }

    /// One-second countdown step.
    pub fn tick(&mut self) -> Tick {
        if !self.is_running() {
            return Tick::Inactive;
        }
        if self.time_remaining <= 1 {
            self.time_remaining = 0;
            self.state = GameState::Ended;
            self.hearts.clear();
            tracing::info!(score = self.score, generation = self.generation, "catch game ended");
            return Tick::Ended;
        }
        self.time_remaining -= 1;
        Tick::Counting(self.time_remaining)
    }

    /// Append one heart keyed by `now`. Returns None if not running or a heart
    /// with the same key is still live (two spawns within one millisecond).
    pub fn spawn_tick<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) -> Option<HeartId> {
        if !self.is_running() {
            return None;
        }
        let id = HeartId::new(self.generation, now.max(0.0) as u64);
        if self.hearts.iter().any(|h| h.id == id) {
            return None;
        }
        self.hearts.push(FallingHeart::roll(rng, id, now, self.tuning.base_fall_secs));
        Some(id)
    }

    /// Frame hook: spawns at most one heart once the spawn interval has elapsed.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, now: f64) -> Option<HeartId> {
        if !self.is_running() || now - self.last_spawn_at < self.tuning.spawn_interval_ms {
            return None;
        }
        self.last_spawn_at = now;
        self.spawn_tick(rng, now)
    }

    /// Hearts whose fall has completed at `now`. The renderer turns each into
    /// an `expire` event.
    pub fn landed(&self, now: f64) -> Vec<HeartId> {
        self.hearts.iter().filter(|h| h.landed(now)).map(|h| h.id).collect()
    }

    /// Topmost heart under a pointer at (`px`, `py`) in a play area of the given size.
    pub fn heart_at(&self, px: f64, py: f64, now: f64, width: f64, height: f64) -> Option<HeartId> {
        // Later spawns are drawn on top, so search back to front.
        self.hearts.iter().rev().find_map(|h| {
            let (hx, hy) = h.position(now, width, height);
            let (dx, dy) = (px - hx, py - hy);
            (dx * dx + dy * dy <= HEART_HIT_RADIUS_PX * HEART_HIT_RADIUS_PX).then_some(h.id)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded_rng;

    fn running(now: f64) -> GameSession {
        let mut s = GameSession::default();
        s.start(now);
        s
    }

    #[test]
    fn test_new_session_is_idle() {
        let s = GameSession::default();
        assert_eq!(s.state(), GameState::Idle);
        assert_eq!(s.time_remaining(), GAME_DURATION_SECS);
        assert!(s.hearts().is_empty());
    }

    #[test]
    fn test_idle_session_ignores_events() {
        let mut rng = seeded_rng(1);
        let mut s = GameSession::default();
        assert_eq!(s.tick(), Tick::Inactive);
        assert_eq!(s.advance(&mut rng, 5_000.0), None);
        assert_eq!(s.spawn_tick(&mut rng, 5_000.0), None);
        assert!(!s.catch(HeartId::new(0, 5_000)));
        assert_eq!(s.time_remaining(), GAME_DURATION_SECS);
    }

    #[test]
    fn test_advance_gates_on_spawn_interval() {
        let mut rng = seeded_rng(2);
        let mut s = running(1_000.0);
        assert_eq!(s.advance(&mut rng, 1_016.0), None);
        assert_eq!(s.advance(&mut rng, 1_799.0), None);
        let id = s.advance(&mut rng, 1_800.0).expect("spawn at 800ms");
        assert_eq!(id.spawned_at_ms(), 1_800);
        // spawn clock reset
        assert_eq!(s.advance(&mut rng, 2_000.0), None);
        assert!(s.advance(&mut rng, 2_600.0).is_some());
        assert_eq!(s.hearts().len(), 2);
    }

    #[test]
    fn test_spawned_heart_parameters_in_range() {
        let mut rng = seeded_rng(3);
        let mut s = running(0.0);
        for i in 0..200 {
            s.spawn_tick(&mut rng, i as f64 * 10.0);
        }
        assert_eq!(s.hearts().len(), 200);
        for h in s.hearts() {
            assert!((10.0..90.0).contains(&h.x_percent));
            assert!((0.5..1.0).contains(&h.speed));
            let d = h.fall_duration_secs();
            assert!(d > 4.0 - 1e-9 && d <= 8.0, "fall duration {d}");
        }
    }

    #[test]
    fn test_same_millisecond_spawn_keeps_one_entry() {
        let mut rng = seeded_rng(4);
        let mut s = running(0.0);
        assert!(s.spawn_tick(&mut rng, 900.4).is_some());
        assert_eq!(s.spawn_tick(&mut rng, 900.7), None);
        assert_eq!(s.hearts().len(), 1);
    }

    #[test]
    fn test_catch_then_expire_is_single_effect() {
        let mut rng = seeded_rng(5);
        let mut s = running(0.0);
        let id = s.spawn_tick(&mut rng, 800.0).unwrap();
        assert!(s.catch(id));
        assert!(!s.expire(id));
        assert!(!s.catch(id));
        assert_eq!(s.score(), 1);
    }

    #[test]
    fn test_landed_reports_completed_falls() {
        let mut rng = seeded_rng(6);
        let mut s = running(0.0);
        let id = s.spawn_tick(&mut rng, 0.0).unwrap();
        let fall_ms = s.hearts()[0].fall_duration_secs() * 1000.0;
        assert!(s.landed(fall_ms - 1.0).is_empty());
        assert_eq!(s.landed(fall_ms + 1.0), vec![id]);
    }

    #[test]
    fn test_heart_position_and_hit_test() {
        let mut rng = seeded_rng(7);
        let mut s = running(0.0);
        let id = s.spawn_tick(&mut rng, 0.0).unwrap();
        let h = s.hearts()[0];
        let (x0, y0) = h.position(0.0, 400.0, 400.0);
        assert!((y0 + HEART_START_OFFSET_PX).abs() < 1e-9);
        assert!((x0 - h.x_percent * 4.0).abs() < 1e-9);
        let half = h.fall_duration_secs() * 500.0;
        let (x, y) = h.position(half, 400.0, 400.0);
        assert_eq!(s.heart_at(x + 5.0, y - 5.0, half, 400.0, 400.0), Some(id));
        assert_eq!(s.heart_at(x + 40.0, y, half, 400.0, 400.0), None);
    }

    #[test]
    fn test_tick_ends_exactly_once() {
        let mut s = GameSession::new(GameTuning { duration_secs: 3, ..GameTuning::default() });
        s.start(0.0);
        assert_eq!(s.tick(), Tick::Counting(2));
        assert_eq!(s.tick(), Tick::Counting(1));
        assert_eq!(s.tick(), Tick::Ended);
        assert_eq!(s.tick(), Tick::Inactive);
        assert_eq!(s.time_remaining(), 0);
        assert_eq!(s.state(), GameState::Ended);
    }

    #[test]
    fn test_restart_bumps_generation() {
        let mut rng = seeded_rng(8);
        let mut s = running(0.0);
        let old = s.spawn_tick(&mut rng, 800.0).unwrap();
        s.start(800.0);
        assert_ne!(old.generation(), s.generation());
        // The new session spawns at the same timestamp; the stale id still misses.
        let fresh = s.spawn_tick(&mut rng, 800.0).unwrap();
        assert_ne!(old, fresh);
        assert!(!s.catch(old));
        assert!(!s.expire(old));
        assert_eq!(s.hearts().len(), 1);
        assert_eq!(s.score(), 0);
    }
}
