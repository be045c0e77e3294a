//! Minesweeper grid engine
//!
//! Square N x N board, row-major. Mines are placed lazily on the first probe
//! so the opening cell and its 3x3 neighborhood are always safe.

use rand::Rng;
use thiserror::Error;

/// Grid configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GridError {
    /// Rejection sampling exhausted its attempt cap. Unreachable under the
    /// shipped density curve (<= 0.20); hitting this means a caller asked for
    /// more mines than the non-safe area can hold.
    #[error("could not place {requested} mines on a {size}x{size} grid ({placed} placed before giving up)")]
    UnplaceableMines {
        requested: usize,
        placed: usize,
        size: usize,
    },
}

/// Visible state of a single cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CellStatus {
    #[default]
    Hidden,
    Revealed,
    Flagged,
    Exploded,
}

/// One cell of the board. Position is implicit in the grid index.
#[derive(Debug, Clone, Copy, Default)]
pub struct Cell {
    pub is_mine: bool,
    pub status: CellStatus,
    /// Mines in the 8-neighborhood. Valid only after mine placement.
    pub neighbor_mines: u8,
}

/// Result of a reveal attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Target was not Hidden - nothing changed
    NoChange,
    /// Safe reveal; `cells` counts everything uncovered by the flood
    Revealed { cells: u32 },
    /// Target was a mine - it is now Exploded (no cascade)
    Exploded,
}

/// Result of a flag toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagOutcome {
    NoChange,
    Placed,
    Removed,
}

/// Square minesweeper board
#[derive(Debug, Clone)]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
    mine_count: usize,
}

impl Grid {
    /// Create an all-Hidden, mine-free board
    pub fn new(size: usize) -> Self {
        Self {
            size,
            cells: vec![Cell::default(); size * size],
            mine_count: 0,
        }
    }

    /// Test/scenario constructor: mines at fixed coordinates, counts computed
    pub fn with_mines(size: usize, mines: &[(usize, usize)]) -> Self {
        let mut grid = Self::new(size);
        for &(row, col) in mines {
            grid.cells[row * size + col].is_mine = true;
        }
        grid.mine_count = mines.len();
        grid.recount_neighbors();
        grid
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn mine_count(&self) -> usize {
        self.mine_count
    }

    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> &Cell {
        &self.cells[row * self.size + col]
    }

    #[inline]
    fn cell_mut(&mut self, row: usize, col: usize) -> &mut Cell {
        &mut self.cells[row * self.size + col]
    }

    /// In-range 8-neighborhood of a cell (edges simply have fewer neighbors)
    fn neighbors(&self, row: usize, col: usize) -> impl Iterator<Item = (usize, usize)> {
        let size = self.size as isize;
        let (row, col) = (row as isize, col as isize);
        (-1isize..=1).flat_map(move |dr| {
            (-1isize..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    return None;
                }
                let (r, c) = (row + dr, col + dc);
                (r >= 0 && r < size && c >= 0 && c < size).then_some((r as usize, c as usize))
            })
        })
    }

    /// Place `mine_count` mines by rejection sampling, keeping the 3x3 block
    /// around `(safe_row, safe_col)` clear, then recompute neighbor counts.
    ///
    /// Callers must keep density at or below the documented 0.20 ceiling; the
    /// attempt cap only turns a pathological request into an error instead of
    /// a spin.
    pub fn place_mines(
        &mut self,
        mine_count: usize,
        safe_row: usize,
        safe_col: usize,
        rng: &mut impl Rng,
    ) -> Result<(), GridError> {
        let attempt_cap = (self.size * self.size * 200).max(10_000);
        let mut placed = 0;
        let mut attempts = 0;

        while placed < mine_count {
            attempts += 1;
            if attempts > attempt_cap {
                return Err(GridError::UnplaceableMines {
                    requested: mine_count,
                    placed,
                    size: self.size,
                });
            }

            let row = rng.random_range(0..self.size);
            let col = rng.random_range(0..self.size);

            let in_safe_zone = row.abs_diff(safe_row) <= 1 && col.abs_diff(safe_col) <= 1;
            if in_safe_zone || self.cell(row, col).is_mine {
                continue;
            }

            self.cell_mut(row, col).is_mine = true;
            placed += 1;
        }

        self.mine_count = mine_count;
        self.recount_neighbors();
        log::info!(
            "placed {} mines on {}x{} grid (safe cell {},{})",
            mine_count,
            self.size,
            self.size,
            safe_row,
            safe_col
        );
        Ok(())
    }

    fn recount_neighbors(&mut self) {
        for row in 0..self.size {
            for col in 0..self.size {
                if self.cell(row, col).is_mine {
                    continue;
                }
                let count = self
                    .neighbors(row, col)
                    .filter(|&(r, c)| self.cell(r, c).is_mine)
                    .count() as u8;
                self.cell_mut(row, col).neighbor_mines = count;
            }
        }
    }

    /// Reveal a cell. Hidden mines explode in place; safe cells flood-fill
    /// through zero-neighbor regions. Anything not Hidden is a no-op.
    pub fn reveal(&mut self, row: usize, col: usize) -> RevealOutcome {
        if self.cell(row, col).status != CellStatus::Hidden {
            return RevealOutcome::NoChange;
        }

        if self.cell(row, col).is_mine {
            self.cell_mut(row, col).status = CellStatus::Exploded;
            return RevealOutcome::Exploded;
        }

        // Iterative flood fill. Candidates are filtered on pop (status
        // re-checked) so a cell is revealed at most once no matter how many
        // neighbors push it; the work-list order does not affect the result.
        let mut revealed = 0u32;
        let mut work = vec![(row, col)];
        while let Some((r, c)) = work.pop() {
            if self.cell(r, c).status != CellStatus::Hidden || self.cell(r, c).is_mine {
                continue;
            }
            self.cell_mut(r, c).status = CellStatus::Revealed;
            revealed += 1;

            if self.cell(r, c).neighbor_mines == 0 {
                work.extend(self.neighbors(r, c));
            }
        }

        RevealOutcome::Revealed { cells: revealed }
    }

    /// Toggle a flag marker. Revealed and Exploded cells are untouched.
    pub fn toggle_flag(&mut self, row: usize, col: usize) -> FlagOutcome {
        let cell = self.cell_mut(row, col);
        match cell.status {
            CellStatus::Hidden => {
                cell.status = CellStatus::Flagged;
                FlagOutcome::Placed
            }
            CellStatus::Flagged => {
                cell.status = CellStatus::Hidden;
                FlagOutcome::Removed
            }
            CellStatus::Revealed | CellStatus::Exploded => FlagOutcome::NoChange,
        }
    }

    /// Win check: every non-mine cell Revealed. Flags on mines are irrelevant.
    pub fn is_cleared(&self) -> bool {
        self.cells
            .iter()
            .all(|cell| cell.is_mine || cell.status == CellStatus::Revealed)
    }

    pub fn revealed_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.status == CellStatus::Revealed)
            .count()
    }

    pub fn flagged_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.status == CellStatus::Flagged)
            .count()
    }
}
