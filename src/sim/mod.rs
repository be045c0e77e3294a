//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only (visual particles use hashes, not the RNG streams)
//! - No rendering or platform dependencies (the presentation layer is reached
//!   only through the `Playfield` trait)

pub mod aim;
pub mod ballistics;
pub mod demo;
pub mod grid;
pub mod projectile;
pub mod state;
pub mod tick;

pub use aim::{AimSnapshot, Playfield, aim_at, launch_for_release};
pub use ballistics::{
    FlightSample, LaunchParams, flight_path, launch_from_pull, predict_landing, simulate_range,
    solve_pull_for_range,
};
pub use demo::{DEMO_SCRIPT, DemoAction, DemoDriver, DemoStep};
pub use grid::{Cell, CellStatus, FlagOutcome, Grid, GridError, RevealOutcome};
pub use projectile::{Projectile, Resolution, ShotKind, ShotSlot, TrailPoint};
pub use state::{
    ATTRACT_LEVEL, GameEvent, GamePhase, GameState, LevelSession, MAX_PARTICLES, Particle,
    ParticleKind, RngState, grid_size_for_level, mine_count_for_level,
};
pub use tick::{TickInput, tick};
