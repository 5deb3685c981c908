//! Warehouse grid geometry: cells, traversability, neighbor enumeration.
//!
//! # Data layout
//!
//! The grid is a row-major `Vec<bool>` (`true` = traversable) of shape
//! `height × width`.  Coordinates are `(y, x)` with `y ∈ [0, height)` and
//! `x ∈ [0, width)`.  A coordinate is *free* iff it is in bounds and
//! traversable.  The grid is immutable after construction — every planner
//! and oracle may hold shared references (or cheap clones) without
//! invalidation concerns.
//!
//! `Cell` uses `i32` components so one-step offsets off the grid edge are
//! representable and rejected by the bounds check rather than wrapping.

use std::fmt;

use crate::motion::Orientation;

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A grid coordinate in `(y, x)` order.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub y: i32,
    pub x: i32,
}

impl Cell {
    #[inline(always)]
    pub const fn new(y: i32, x: i32) -> Cell {
        Cell { y, x }
    }

    /// The cell one step away along `orientation`.
    #[inline]
    pub fn step(self, orientation: Orientation) -> Cell {
        let (dy, dx) = orientation.delta();
        Cell::new(self.y + dy, self.x + dx)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.y, self.x)
    }
}

/// One cell per agent — a joint configuration of the whole fleet.
pub type Configuration = Vec<Cell>;

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A rectangular boolean traversability map.
#[derive(Clone, Debug)]
pub struct Grid {
    height: u32,
    width: u32,
    /// Row-major; index = y * width + x.  `true` = traversable.
    cells: Vec<bool>,
}

impl Grid {
    /// A fully traversable `height × width` grid.
    pub fn open(height: u32, width: u32) -> Grid {
        Grid {
            height,
            width,
            cells: vec![true; (height * width) as usize],
        }
    }

    /// A grid with the listed cells blocked.  Out-of-bounds entries in
    /// `obstacles` are ignored.
    pub fn with_obstacles(height: u32, width: u32, obstacles: &[Cell]) -> Grid {
        let mut grid = Grid::open(height, width);
        for &cell in obstacles {
            if grid.contains(cell) {
                let idx = grid.idx(cell);
                grid.cells[idx] = false;
            }
        }
        grid
    }

    /// Build from a pre-computed row-major traversability vector.
    ///
    /// Returns `None` when `cells.len() != height * width`.
    pub fn from_cells(height: u32, width: u32, cells: Vec<bool>) -> Option<Grid> {
        if cells.len() != (height * width) as usize {
            return None;
        }
        Some(Grid { height, width, cells })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Total number of cells, traversable or not.
    #[inline]
    pub fn size(&self) -> usize {
        self.cells.len()
    }

    // ── Queries ───────────────────────────────────────────────────────────

    /// `true` iff `cell` is within the grid bounds (traversable or not).
    #[inline]
    pub fn contains(&self, cell: Cell) -> bool {
        cell.y >= 0 && cell.x >= 0 && (cell.y as u32) < self.height && (cell.x as u32) < self.width
    }

    /// `true` iff `cell` is in bounds and traversable.
    #[inline]
    pub fn is_free(&self, cell: Cell) -> bool {
        self.contains(cell) && self.cells[self.idx(cell)]
    }

    /// Traversable 4-neighbors of `cell`, enumerated in fixed N/E/S/W order.
    ///
    /// Yields nothing when `cell` itself is blocked or out of bounds.
    pub fn neighbors(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let origin_free = self.is_free(cell);
        Orientation::ALL.into_iter().filter_map(move |o| {
            if !origin_free {
                return None;
            }
            let next = cell.step(o);
            self.is_free(next).then_some(next)
        })
    }

    #[inline(always)]
    fn idx(&self, cell: Cell) -> usize {
        cell.y as usize * self.width as usize + cell.x as usize
    }
}
