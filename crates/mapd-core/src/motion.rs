//! Rotation-aware motion model.
//!
//! Agents face one of four compass orientations and move with four primitive
//! actions: forward, quarter-turn clockwise, quarter-turn counter-clockwise,
//! and wait.  A fixed-length sequence of actions is an [`Operation`]; playing
//! an operation from an oriented cell yields a [`Trajectory`] — the cell the
//! agent occupies at each subtime, plus its final heading.
//!
//! The tracer is total over rotations and waits; only a forward step into a
//! blocked or out-of-bounds cell rejects the whole operation.

use std::fmt;

use crate::grid::{Cell, Grid};

// ── Orientation ───────────────────────────────────────────────────────────────

/// Compass heading of an agent.  Discriminants follow the clockwise order
/// N=0, E=1, S=2, W=3 so quarter turns are index arithmetic mod 4.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum Orientation {
    North = 0,
    East = 1,
    South = 2,
    West = 3,
}

impl Orientation {
    /// All orientations in clockwise order, starting north.
    pub const ALL: [Orientation; 4] = [
        Orientation::North,
        Orientation::East,
        Orientation::South,
        Orientation::West,
    ];

    /// Build from an index, interpreted mod 4.
    #[inline]
    pub fn from_index(index: u8) -> Orientation {
        Orientation::ALL[(index % 4) as usize]
    }

    #[inline]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// One quarter-turn clockwise.
    #[inline]
    pub fn cw(self) -> Orientation {
        Orientation::from_index(self.index() + 1)
    }

    /// One quarter-turn counter-clockwise.
    #[inline]
    pub fn ccw(self) -> Orientation {
        Orientation::from_index(self.index() + 3)
    }

    /// Unit step `(dy, dx)` along this heading.
    #[inline]
    pub fn delta(self) -> (i32, i32) {
        match self {
            Orientation::North => (-1, 0),
            Orientation::East => (0, 1),
            Orientation::South => (1, 0),
            Orientation::West => (0, -1),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Orientation::North => "N",
            Orientation::East => "E",
            Orientation::South => "S",
            Orientation::West => "W",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A primitive agent action, one per subtime.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    /// Move one cell along the current orientation.
    Forward,
    /// Rotate a quarter-turn clockwise; the cell does not change.
    TurnCw,
    /// Rotate a quarter-turn counter-clockwise; the cell does not change.
    TurnCcw,
    /// Stay put, keep heading.
    #[default]
    Wait,
}

impl Action {
    /// Single-letter form used in logs and operation displays.
    pub fn as_char(self) -> char {
        match self {
            Action::Forward => 'F',
            Action::TurnCw => 'R',
            Action::TurnCcw => 'C',
            Action::Wait => 'W',
        }
    }

    /// `true` for either rotation direction.
    #[inline]
    pub fn is_rotation(self) -> bool {
        matches!(self, Action::TurnCw | Action::TurnCcw)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ── Operation ─────────────────────────────────────────────────────────────────

/// A fixed-length action sequence — the planner's unit of commitment.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Operation(Vec<Action>);

impl Operation {
    pub fn new(actions: Vec<Action>) -> Operation {
        Operation(actions)
    }

    /// The all-wait operation of the given length.
    pub fn all_wait(len: usize) -> Operation {
        Operation(vec![Action::Wait; len])
    }

    #[inline]
    pub fn actions(&self) -> &[Action] {
        &self.0
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The action executed this timestep (`Wait` for an empty operation).
    #[inline]
    pub fn first(&self) -> Action {
        self.0.first().copied().unwrap_or_default()
    }

    /// The operation carried into the next timestep: drop the executed head
    /// and pad with a trailing `Wait` to keep the length.
    pub fn advance(&self) -> Operation {
        let mut actions = Vec::with_capacity(self.0.len().max(1));
        actions.extend_from_slice(self.0.get(1..).unwrap_or(&[]));
        actions.push(Action::Wait);
        Operation(actions)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for action in &self.0 {
            write!(f, "{action}")?;
        }
        Ok(())
    }
}

// ── Trajectory ────────────────────────────────────────────────────────────────

/// The result of playing an operation: the occupied cell at each of the
/// `len + 1` subtimes, and the heading after the final action.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Trajectory {
    pub cells: Vec<Cell>,
    pub final_orientation: Orientation,
}

impl Trajectory {
    /// The stay-in-place trajectory of an operation horizon `len`: `len + 1`
    /// copies of `cell`, heading unchanged.
    pub fn hold(cell: Cell, orientation: Orientation, len: usize) -> Trajectory {
        Trajectory { cells: vec![cell; len + 1], final_orientation: orientation }
    }

    /// The cell occupied after the last action.
    #[inline]
    pub fn terminal(&self) -> Cell {
        self.cells[self.cells.len() - 1]
    }
}

/// Play `op` from `(start, orientation)` on `grid`.
///
/// Every action — including rotations and waits — appends the then-current
/// cell, so the result always holds exactly `op.len() + 1` cells.  Returns
/// `None` as soon as a forward step targets a non-free cell; the operation
/// is infeasible as a whole.
pub fn trace(grid: &Grid, start: Cell, orientation: Orientation, op: &Operation) -> Option<Trajectory> {
    let mut cells = Vec::with_capacity(op.len() + 1);
    cells.push(start);

    let mut cur = start;
    let mut heading = orientation;
    for &action in op.actions() {
        match action {
            Action::Forward => {
                let next = cur.step(heading);
                if !grid.is_free(next) {
                    return None;
                }
                cur = next;
            }
            Action::TurnCw => heading = heading.cw(),
            Action::TurnCcw => heading = heading.ccw(),
            Action::Wait => {}
        }
        cells.push(cur);
    }

    Some(Trajectory { cells, final_orientation: heading })
}
