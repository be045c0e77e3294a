//! Game state and core simulation types
//!
//! One owned state object, mutated only inside `sim::tick`. The browser
//! shell reads it for rendering and drains `events` each frame.

use glam::Vec2;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::aim::AimSnapshot;
use super::demo::DemoDriver;
use super::grid::Grid;
use super::projectile::{ShotKind, ShotSlot};
use crate::consts::*;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Title screen; the attract-mode demo plays here
    Menu,
    /// Active gameplay
    Playing,
    /// Frozen mid-level; in-flight state is preserved
    Paused,
    /// Board cleared - advance or record the run
    Won,
    /// Probed a mine - retry or record the run
    Lost,
    /// Entering a name for the leaderboard
    Recording,
}

/// Per-level bookkeeping. `total_probes` is a lifetime counter for the run,
/// reset only when entering level 1.
#[derive(Debug, Clone)]
pub struct LevelSession {
    pub level: u32,
    pub grid_size: usize,
    pub mine_count: usize,
    pub flags_used: u32,
    pub total_probes: u32,
    pub has_first_probe: bool,
}

/// Grid size for a level: 5 at level 1, +5 per level, capped at 30
pub fn grid_size_for_level(level: u32) -> usize {
    (MIN_GRID_SIZE + (level.saturating_sub(1) as usize) * 5).min(MAX_GRID_SIZE)
}

/// Mine count for a level: floor(density * area), density capped at 0.20
pub fn mine_count_for_level(level: u32, grid_size: usize) -> usize {
    let density =
        (BASE_MINE_DENSITY + MINE_DENSITY_PER_LEVEL * level as f32).min(MAX_MINE_DENSITY);
    ((grid_size * grid_size) as f32 * density).floor() as usize
}

impl LevelSession {
    /// Session for level `level`, carrying the run's probe counter forward.
    /// Level 1 starts the counter over.
    pub fn for_level(level: u32, carried_probes: u32) -> Self {
        let grid_size = grid_size_for_level(level);
        Self {
            level,
            grid_size,
            mine_count: mine_count_for_level(level, grid_size),
            flags_used: 0,
            total_probes: if level == 1 { 0 } else { carried_probes },
            has_first_probe: false,
        }
    }

    pub fn mines_left(&self) -> i32 {
        self.mine_count as i32 - self.flags_used as i32
    }
}

/// Visual particle classes (color lookup in the shell)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParticleKind {
    /// Landing dust
    Dust,
    /// Explosion debris
    Debris,
    /// Launch sparks
    Spark,
    /// Win confetti
    Confetti,
}

/// A particle for visual effects (never gameplay-affecting)
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub kind: ParticleKind,
    pub life: f32, // 0-1, decreases over time
    pub size: f32,
}

/// Hard cap on live particles
pub const MAX_PARTICLES: usize = 256;

/// Seeded RNG handle. Each consumer draws a fresh stream so placement is
/// reproducible per (seed, stream) without sharing cursor state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    /// Hand out an independent generator and advance the stream counter
    pub fn next_rng(&mut self) -> Pcg32 {
        let rng = Pcg32::new(self.seed, self.stream);
        self.stream += 1;
        rng
    }
}

/// Per-tick events drained by the shell (audio cues, HUD flashes, advice)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    LevelStarted,
    Launched(ShotKind),
    /// A shot resolved (landed or left bounds)
    Landed,
    Revealed { cells: u32 },
    Flagged { placed: bool },
    Exploded,
    LevelWon,
    LevelLost,
    ScoreRecorded { rank: usize },
}

/// Complete simulation state
#[derive(Debug, Clone)]
pub struct GameState {
    pub seed: u64,
    pub rng: RngState,
    pub phase: GamePhase,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub session: LevelSession,
    pub grid: Grid,
    pub shot: ShotSlot,
    /// Drag in progress, if any
    pub aim: Option<AimSnapshot>,
    /// Next launch is a flag shot instead of a probe
    pub flag_mode: bool,
    /// Snap-to-cell assist (settings knob, default on)
    pub aim_assist: bool,
    /// Particle cap from settings (0 disables spawning)
    pub max_particles: usize,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// 0-1, decays each tick
    pub screen_shake: f32,
    /// 0-1, decays each tick; set on level win
    pub win_flash: f32,
    pub events: Vec<GameEvent>,
    pub demo: DemoDriver,
}

/// Level the attract-mode demo plays on (10x10 board)
pub const ATTRACT_LEVEL: u32 = 2;

impl GameState {
    /// Fresh state in the Menu phase with an attract board ready for the demo
    pub fn new(seed: u64) -> Self {
        let session = LevelSession::for_level(ATTRACT_LEVEL, 0);
        let grid = Grid::new(session.grid_size);
        Self {
            seed,
            rng: RngState::new(seed),
            phase: GamePhase::Menu,
            time_ticks: 0,
            session,
            grid,
            shot: ShotSlot::default(),
            aim: None,
            flag_mode: false,
            aim_assist: true,
            max_particles: MAX_PARTICLES,
            particles: Vec::new(),
            screen_shake: 0.0,
            win_flash: 0.0,
            events: Vec::new(),
            demo: DemoDriver::default(),
        }
    }

    /// Tear down the current board and start the given level
    pub fn start_level(&mut self, level: u32) {
        self.session = LevelSession::for_level(level, self.session.total_probes);
        self.grid = Grid::new(self.session.grid_size);
        self.shot.clear();
        self.aim = None;
        self.flag_mode = false;
        self.particles.clear();
        self.screen_shake = 0.0;
        self.win_flash = 0.0;
        self.phase = GamePhase::Playing;
        self.events.push(GameEvent::LevelStarted);
        log::info!(
            "level {} started: {}x{} grid, {} mines",
            level,
            self.session.grid_size,
            self.session.grid_size,
            self.session.mine_count
        );
    }

    /// Rebuild the attract board (demo script Reset action)
    pub fn reset_attract_board(&mut self) {
        self.session = LevelSession::for_level(ATTRACT_LEVEL, 0);
        self.grid = Grid::new(self.session.grid_size);
        self.shot.clear();
        self.aim = None;
        self.flag_mode = false;
    }

    /// Drain this tick's events (shell calls once per frame)
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn test_level_curve() {
        assert_eq!(grid_size_for_level(1), 5);
        assert_eq!(grid_size_for_level(2), 10);
        assert_eq!(grid_size_for_level(5), 25);
        assert_eq!(grid_size_for_level(6), 30);
        assert_eq!(grid_size_for_level(12), 30);

        // level 1: floor(25 * 0.11) = 2
        assert_eq!(mine_count_for_level(1, 5), 2);
        // level 6: floor(900 * 0.16) = 144
        assert_eq!(mine_count_for_level(6, 30), 144);
        // density caps at 0.20
        assert_eq!(mine_count_for_level(50, 30), 180);
    }

    #[test]
    fn test_total_probes_reset_only_at_level_one() {
        let carried = LevelSession::for_level(3, 17);
        assert_eq!(carried.total_probes, 17);
        let fresh = LevelSession::for_level(1, 17);
        assert_eq!(fresh.total_probes, 0);
    }

    #[test]
    fn test_rng_streams_are_independent_and_reproducible() {
        let mut a = RngState::new(42);
        let mut b = RngState::new(42);

        let first_a: u32 = a.next_rng().random();
        let first_b: u32 = b.next_rng().random();
        assert_eq!(first_a, first_b);

        // Next stream draws differently than the first
        let second_a: u32 = a.next_rng().random();
        assert_ne!(first_a, second_a);
        assert_eq!(a.stream, 2);
    }

    #[test]
    fn test_start_level_resets_board_state() {
        let mut state = GameState::new(1);
        state.screen_shake = 0.7;
        state.flag_mode = true;
        state.start_level(1);

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.grid.size(), 5);
        assert_eq!(state.session.mine_count, 2);
        assert!(!state.flag_mode);
        assert_eq!(state.screen_shake, 0.0);
        assert!(state.events.contains(&GameEvent::LevelStarted));
    }
}
