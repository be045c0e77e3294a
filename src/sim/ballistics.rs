//! Ballistic flight math
//!
//! A projectile lives on a 2D ground plane with a separate altitude axis.
//! Integration is per-tick (not dt-scaled): altitude feels constant gravity,
//! ground-plane speed feels multiplicative drag, and the update order is
//! fixed - position, altitude, vertical speed, drag.

use glam::Vec2;

use crate::consts::*;

/// Launch parameters derived from a pull vector
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaunchParams {
    /// Ground-plane velocity per tick
    pub velocity: Vec2,
    /// Vertical launch speed per tick
    pub vz: f32,
}

/// One integration sample, for trajectory previews
#[derive(Debug, Clone, Copy)]
pub struct FlightSample {
    pub pos: Vec2,
    pub z: f32,
}

/// Derive launch parameters from a (clamped) pull vector. Pull direction sets
/// the ground-plane direction; total pull magnitude alone sets altitude gain.
pub fn launch_from_pull(pull: Vec2) -> LaunchParams {
    LaunchParams {
        velocity: pull * POWER,
        vz: pull.length() * Z_POWER,
    }
}

/// Apply one integration tick in place
#[inline]
pub fn step(pos: &mut Vec2, z: &mut f32, vel: &mut Vec2, vz: &mut f32) {
    *pos += *vel;
    *z += *vz;
    *vz -= GRAVITY;
    *vel *= DRAG;
}

/// Ground position where a launch from `origin` comes down (z <= 0 after a
/// tick), capped at [`FLIGHT_STEP_CAP`] steps for degenerate inputs.
pub fn predict_landing(origin: Vec2, launch: &LaunchParams) -> Vec2 {
    let mut pos = origin;
    let mut z = 0.0;
    let mut vel = launch.velocity;
    let mut vz = launch.vz;

    for _ in 0..FLIGHT_STEP_CAP {
        step(&mut pos, &mut z, &mut vel, &mut vz);
        if z <= 0.0 {
            break;
        }
    }
    pos
}

/// Per-tick samples of the whole arc, for the aim preview
pub fn flight_path(origin: Vec2, launch: &LaunchParams) -> Vec<FlightSample> {
    let mut pos = origin;
    let mut z = 0.0;
    let mut vel = launch.velocity;
    let mut vz = launch.vz;
    let mut samples = Vec::new();

    for _ in 0..FLIGHT_STEP_CAP {
        step(&mut pos, &mut z, &mut vel, &mut vz);
        samples.push(FlightSample { pos, z: z.max(0.0) });
        if z <= 0.0 {
            break;
        }
    }
    samples
}

/// Straight-line horizontal range for a pull of the given magnitude. This is
/// the 1D core of the inverse solver - lateral direction is ignored.
pub fn simulate_range(pull_magnitude: f32) -> f32 {
    let mut d = 0.0;
    let mut h = 0.0;
    let mut vh = pull_magnitude * POWER;
    let mut vz = pull_magnitude * Z_POWER;

    for _ in 0..FLIGHT_STEP_CAP {
        d += vh;
        h += vz;
        vz -= GRAVITY;
        vh *= DRAG;
        if h <= 0.0 {
            break;
        }
    }
    d
}

/// Bisect over pull magnitude for the pull whose range matches
/// `target_distance`. Relies on range being non-decreasing in pull magnitude,
/// which holds for the shipped constants.
pub fn solve_pull_for_range(target_distance: f32) -> f32 {
    let mut lo = 0.0f32;
    let mut hi = SOLVER_MAX_PULL;

    for _ in 0..SOLVER_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        if simulate_range(mid) < target_distance {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    (lo + hi) / 2.0
}
