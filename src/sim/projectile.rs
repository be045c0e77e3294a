//! In-flight projectile slot
//!
//! At most one shot is airborne at a time; the tick gates launches on
//! `in_flight()`. Resolution is exactly-once by construction: resolving
//! takes the projectile out of the slot, so there is nothing left to
//! resolve twice.

use glam::Vec2;

use super::ballistics::{self, LaunchParams};
use crate::Bounds;
use crate::consts::OOB_MARGIN;

/// What a shot does when it comes down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShotKind {
    /// Reveals the cell it lands on
    Probe,
    /// Toggles a flag marker on the cell it lands on
    Flag,
}

/// Trail point for rendering (newest first)
#[derive(Debug, Clone, Copy)]
pub struct TrailPoint {
    pub pos: Vec2,
    pub z: f32,
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 24;

/// An airborne shot
#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: u32,
    pub kind: ShotKind,
    /// Ground-plane position
    pub pos: Vec2,
    /// Altitude above the ground plane
    pub z: f32,
    pub vel: Vec2,
    pub vz: f32,
    /// Trail history for rendering (newest first)
    pub trail: Vec<TrailPoint>,
}

impl Projectile {
    fn record_trail(&mut self) {
        self.trail.insert(0, TrailPoint {
            pos: self.pos,
            z: self.z,
        });
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }
}

/// The single notification emitted when a shot stops flying
#[derive(Debug, Clone, Copy)]
pub struct Resolution {
    pub kind: ShotKind,
    /// Final ground position (landing point, or exit point when out of bounds)
    pub impact: Vec2,
    pub out_of_bounds: bool,
}

/// The active-shot slot
#[derive(Debug, Clone, Default)]
pub struct ShotSlot {
    projectile: Option<Projectile>,
    next_id: u32,
}

impl ShotSlot {
    pub fn in_flight(&self) -> bool {
        self.projectile.is_some()
    }

    pub fn active(&self) -> Option<&Projectile> {
        self.projectile.as_ref()
    }

    /// Fill the slot. Single occupancy is the caller's responsibility; a
    /// launch over an active shot would drop it unresolved, so debug-assert.
    pub fn launch(&mut self, kind: ShotKind, origin: Vec2, launch: &LaunchParams) -> u32 {
        debug_assert!(self.projectile.is_none(), "launch while a shot is in flight");
        self.next_id += 1;
        let id = self.next_id;
        self.projectile = Some(Projectile {
            id,
            kind,
            pos: origin,
            z: 0.0,
            vel: launch.velocity,
            vz: launch.vz,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        });
        id
    }

    /// Drop any in-flight shot without resolving it (level teardown only)
    pub fn clear(&mut self) {
        self.projectile = None;
    }

    /// One integration tick. Returns the resolution when the shot lands
    /// (z <= 0 after the update) or exits the inflated view bounds.
    pub fn tick(&mut self, bounds: &Bounds) -> Option<Resolution> {
        let shot = self.projectile.as_mut()?;

        ballistics::step(&mut shot.pos, &mut shot.z, &mut shot.vel, &mut shot.vz);
        shot.record_trail();

        let landed = shot.z <= 0.0;
        if landed {
            shot.z = 0.0;
        }
        let out_of_bounds = !landed && !bounds.inflate(OOB_MARGIN).contains(shot.pos);

        if landed || out_of_bounds {
            let shot = self.projectile.take()?;
            return Some(Resolution {
                kind: shot.kind,
                impact: shot.pos,
                out_of_bounds,
            });
        }

        None
    }
}
