//! Screen-space board layout
//!
//! Places the grid in the upper playfield and the slingshot anchor at the
//! bottom, and answers the two geometric queries the simulation needs. The
//! queries must agree: a point inside a cell's hit region maps back to that
//! cell, and the cell's center lies inside its hit region.

use glam::Vec2;

use crate::Bounds;
use crate::sim::Playfield;

/// Fraction of the view width the grid may occupy
const GRID_WIDTH_FRACTION: f32 = 0.85;
/// Fraction of the view height the grid may occupy
const GRID_HEIGHT_FRACTION: f32 = 0.58;
/// Top margin as a fraction of view height
const TOP_MARGIN_FRACTION: f32 = 0.06;
/// Anchor height as a fraction of view height
const ANCHOR_Y_FRACTION: f32 = 0.92;

/// Concrete playfield geometry for a view and grid size
#[derive(Debug, Clone)]
pub struct BoardLayout {
    view: Vec2,
    grid_size: usize,
    /// Side length of one square cell in pixels
    cell_px: f32,
    /// Top-left corner of the grid
    origin: Vec2,
    anchor: Vec2,
}

impl BoardLayout {
    pub fn new(view_w: f32, view_h: f32, grid_size: usize) -> Self {
        let cell_px = (view_w * GRID_WIDTH_FRACTION / grid_size as f32)
            .min(view_h * GRID_HEIGHT_FRACTION / grid_size as f32);
        let board_px = cell_px * grid_size as f32;
        let origin = Vec2::new((view_w - board_px) / 2.0, view_h * TOP_MARGIN_FRACTION);

        Self {
            view: Vec2::new(view_w, view_h),
            grid_size,
            cell_px,
            origin,
            anchor: Vec2::new(view_w / 2.0, view_h * ANCHOR_Y_FRACTION),
        }
    }

    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    #[inline]
    pub fn cell_px(&self) -> f32 {
        self.cell_px
    }

    /// Top-left corner of a cell (for rendering)
    pub fn cell_corner(&self, row: usize, col: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32, row as f32) * self.cell_px
    }
}

impl Playfield for BoardLayout {
    fn cell_at_point(&self, point: Vec2) -> Option<(usize, usize)> {
        let offset = point - self.origin;
        if offset.x < 0.0 || offset.y < 0.0 {
            return None;
        }
        let col = (offset.x / self.cell_px) as usize;
        let row = (offset.y / self.cell_px) as usize;
        (row < self.grid_size && col < self.grid_size).then_some((row, col))
    }

    fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        self.origin + Vec2::new(col as f32 + 0.5, row as f32 + 0.5) * self.cell_px
    }

    fn anchor(&self) -> Vec2 {
        self.anchor
    }

    fn bounds(&self) -> Bounds {
        Bounds::view(self.view.x, self.view.y)
    }
}
