//! Sling Sweeper - a slingshot minesweeper
//!
//! Lob probes onto a minefield in a ballistic arc. Core modules:
//! - `sim`: Deterministic simulation (grid, ballistics, aim assist, game state)
//! - `board`: Screen-space grid layout (the hit-test collaborator)
//! - `session`: Game state + leaderboard wiring behind an injected score store
//! - `leaderboard` / `settings`: LocalStorage-backed persistence
//! - `advice`: Optional advisory-text fetch with a local fallback

pub mod advice;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod board;
pub mod leaderboard;
pub mod session;
pub mod settings;
pub mod sim;

pub use board::BoardLayout;
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use session::Session;
pub use settings::Settings;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz - the ballistic constants are per-tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Downward acceleration on projectile altitude, per tick
    pub const GRAVITY: f32 = 0.5;
    /// Multiplicative drag on ground-plane speed, per tick
    pub const DRAG: f32 = 0.995;
    /// Pull-to-horizontal-velocity coefficient
    pub const POWER: f32 = 0.15;
    /// Pull-to-vertical-velocity coefficient
    pub const Z_POWER: f32 = 0.15;
    /// Maximum pull magnitude the slingshot accepts from a drag
    pub const MAX_PULL: f32 = 250.0;
    /// Pulls shorter than this are treated as no aim at all
    pub const MIN_PULL: f32 = 20.0;
    /// Upper bracket for the inverse pull solver (aim assist may exceed MAX_PULL)
    pub const SOLVER_MAX_PULL: f32 = 3000.0;
    /// Bisection iterations for the inverse pull solver
    pub const SOLVER_ITERATIONS: u32 = 30;
    /// Flight integration cap so degenerate launches still terminate
    pub const FLIGHT_STEP_CAP: u32 = 800;
    /// Margin around the view before an airborne shot counts as out of bounds
    pub const OOB_MARGIN: f32 = 200.0;

    /// Grid sizes run 5..=30 in steps of 5 as levels progress
    pub const MIN_GRID_SIZE: usize = 5;
    pub const MAX_GRID_SIZE: usize = 30;
    /// Mine density curve: min(0.10 + 0.01 * level, 0.20) of grid cells
    pub const BASE_MINE_DENSITY: f32 = 0.10;
    pub const MINE_DENSITY_PER_LEVEL: f32 = 0.01;
    pub const MAX_MINE_DENSITY: f32 = 0.20;
}

/// Axis-aligned screen-space rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec2,
    pub max: Vec2,
}

impl Bounds {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Bounds covering a view of the given size, origin at top-left
    pub fn view(width: f32, height: f32) -> Self {
        Self {
            min: Vec2::ZERO,
            max: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    /// Grow the rectangle by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(margin),
            max: self.max + Vec2::splat(margin),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let b = Bounds::view(800.0, 600.0);
        assert!(b.contains(Vec2::new(0.0, 0.0)));
        assert!(b.contains(Vec2::new(400.0, 599.0)));
        assert!(!b.contains(Vec2::new(-1.0, 300.0)));
        assert!(!b.contains(Vec2::new(400.0, 601.0)));
    }

    #[test]
    fn test_bounds_inflate() {
        let b = Bounds::view(100.0, 100.0).inflate(50.0);
        assert!(b.contains(Vec2::new(-40.0, -40.0)));
        assert!(!b.contains(Vec2::new(-60.0, 0.0)));
    }
}
