//! Slingshot aiming and snap-to-cell assist
//!
//! The presentation layer answers two geometric questions through the
//! [`Playfield`] trait; everything else here is pure. The assist re-solves a
//! raw drag-derived shot so its predicted landing sits exactly on the cell
//! the raw parabola would have hit.

use glam::Vec2;

use super::ballistics::{self, LaunchParams};
use crate::Bounds;
use crate::consts::*;

/// Presentation seam: screen-space queries the simulation needs.
///
/// `cell_at_point` and `cell_center` must agree - a point inside a cell's hit
/// region maps back to that cell's center.
pub trait Playfield {
    fn cell_at_point(&self, point: Vec2) -> Option<(usize, usize)>;
    fn cell_center(&self, row: usize, col: usize) -> Vec2;
    /// Slingshot anchor (launch origin)
    fn anchor(&self) -> Vec2;
    /// Visible view bounds, for out-of-bounds detection
    fn bounds(&self) -> Bounds;
}

/// Transient state of a drag in progress
#[derive(Debug, Clone, Copy)]
pub struct AimSnapshot {
    /// Clamped pull vector (anchor - drag point)
    pub pull: Vec2,
    /// Launch parameters the shot will use (snapped if a cell was detected)
    pub launch: LaunchParams,
    /// Predicted landing point for `launch`
    pub landing: Vec2,
    /// Cell the assist locked onto, if any
    pub snapped_cell: Option<(usize, usize)>,
}

/// Pull vector for a drag point, clamped to [`MAX_PULL`]. `None` when the
/// drag is too short to mean anything (also the launch-cancel rule).
pub fn clamped_pull(anchor: Vec2, drag_point: Vec2) -> Option<Vec2> {
    let pull = anchor - drag_point;
    if pull.length() < MIN_PULL {
        return None;
    }
    Some(pull.clamp_length_max(MAX_PULL))
}

/// Per-drag-update aiming. Returns `None` for a sub-threshold drag (callers
/// clear any held snapshot). With `assist` on, a raw landing that hit-tests
/// to a cell is re-solved onto that cell's center.
pub fn aim_at(drag_point: Vec2, field: &dyn Playfield, assist: bool) -> Option<AimSnapshot> {
    let anchor = field.anchor();
    let pull = clamped_pull(anchor, drag_point)?;
    let raw = ballistics::launch_from_pull(pull);
    let raw_landing = ballistics::predict_landing(anchor, &raw);

    if assist {
        if let Some((row, col)) = field.cell_at_point(raw_landing) {
            let center = field.cell_center(row, col);
            let to_center = center - anchor;
            let distance = to_center.length();
            let solved_pull = ballistics::solve_pull_for_range(distance);
            let snapped_pull = to_center.normalize_or_zero() * solved_pull;
            let launch = ballistics::launch_from_pull(snapped_pull);

            return Some(AimSnapshot {
                pull,
                launch,
                landing: ballistics::predict_landing(anchor, &launch),
                snapped_cell: Some((row, col)),
            });
        }
    }

    Some(AimSnapshot {
        pull,
        launch: raw,
        landing: raw_landing,
        snapped_cell: None,
    })
}

/// Launch parameters for a release at `drag_point`. An active snap wins;
/// otherwise the raw params are recomputed from the release position with the
/// same sub-threshold cancel rule.
pub fn launch_for_release(
    snapshot: Option<&AimSnapshot>,
    drag_point: Vec2,
    field: &dyn Playfield,
) -> Option<(LaunchParams, Option<(usize, usize)>)> {
    if let Some(snap) = snapshot {
        if snap.snapped_cell.is_some() {
            return Some((snap.launch, snap.snapped_cell));
        }
    }
    let pull = clamped_pull(field.anchor(), drag_point)?;
    Some((ballistics::launch_from_pull(pull), None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardLayout;
    use proptest::prelude::*;

    fn field() -> BoardLayout {
        BoardLayout::new(800.0, 900.0, 10)
    }

    #[test]
    fn test_short_drag_is_no_aim() {
        let f = field();
        let anchor = f.anchor();
        assert!(aim_at(anchor + Vec2::new(5.0, 5.0), &f, true).is_none());
        assert!(clamped_pull(anchor, anchor + Vec2::new(0.0, 19.0)).is_none());
    }

    #[test]
    fn test_pull_is_clamped() {
        let f = field();
        let anchor = f.anchor();
        let snap = aim_at(anchor + Vec2::new(0.0, 900.0), &f, false).unwrap();
        assert!((snap.pull.length() - MAX_PULL).abs() < 1e-3);
    }

    #[test]
    fn test_off_grid_landing_keeps_raw_params() {
        let f = field();
        let anchor = f.anchor();
        // Pull sideways so the shot lands far off the board
        let snap = aim_at(anchor + Vec2::new(250.0, 0.0), &f, true).unwrap();
        assert!(snap.snapped_cell.is_none());
        assert_eq!(
            snap.launch,
            ballistics::launch_from_pull(snap.pull),
            "unsnapped aim must use the raw drag-derived launch"
        );
    }

    #[test]
    fn test_assist_disabled_never_snaps() {
        let f = field();
        let anchor = f.anchor();
        for dy in [120.0, 160.0, 200.0, 240.0] {
            if let Some(snap) = aim_at(anchor + Vec2::new(0.0, dy), &f, false) {
                assert!(snap.snapped_cell.is_none());
            }
        }
    }

    #[test]
    fn test_release_prefers_active_snap() {
        let f = field();
        let anchor = f.anchor();
        // Find a drag that snaps
        let drag = (60..=240)
            .map(|dy| anchor + Vec2::new(0.0, dy as f32))
            .find(|d| {
                aim_at(*d, &f, true)
                    .map(|s| s.snapped_cell.is_some())
                    .unwrap_or(false)
            })
            .expect("some straight-up drag should land on the board");
        let snap = aim_at(drag, &f, true).unwrap();

        // Released from a slightly different point, the snapped launch wins
        let (launch, cell) =
            launch_for_release(Some(&snap), drag + Vec2::new(15.0, 0.0), &f).unwrap();
        assert_eq!(launch, snap.launch);
        assert_eq!(cell, snap.snapped_cell);
    }

    #[test]
    fn test_release_without_snap_recomputes_from_release_point() {
        let f = field();
        let anchor = f.anchor();
        let release = anchor + Vec2::new(200.0, 30.0);
        let (launch, cell) = launch_for_release(None, release, &f).unwrap();
        assert!(cell.is_none());
        let expected = ballistics::launch_from_pull(clamped_pull(anchor, release).unwrap());
        assert_eq!(launch, expected);

        // Sub-threshold release cancels the launch outright
        assert!(launch_for_release(None, anchor + Vec2::new(3.0, 3.0), &f).is_none());
    }

    proptest! {
        #[test]
        fn prop_snapped_shot_lands_on_cell_center(dx in -120.0f32..120.0, dy in 40.0f32..250.0) {
            let f = field();
            let anchor = f.anchor();
            let Some(snap) = aim_at(anchor + Vec2::new(dx, dy), &f, true) else {
                return Ok(());
            };
            let Some((row, col)) = snap.snapped_cell else {
                return Ok(());
            };

            let center = f.cell_center(row, col);
            let landing = ballistics::predict_landing(anchor, &snap.launch);
            // Bounded by one final-tick step of horizontal travel
            let tolerance = snap.launch.velocity.length() + 1.0;
            prop_assert!(
                (landing - center).length() < tolerance,
                "snapped landing {:?} missed center {:?}",
                landing, center
            );
        }
    }
}
