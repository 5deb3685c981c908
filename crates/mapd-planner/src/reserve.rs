//! 3-D reservation table: `(subtime, y, x) → owning agent`.
//!
//! # Data layout
//!
//! One flat `Vec<AgentId>` of shape `(op_len + 1) × height × width`, indexed
//! `(t * height + y) * width + x`.  `AgentId::INVALID` marks a free slot.
//!
//! # Mutation discipline
//!
//! `unreserve` only clears slots whose current owner equals the caller.  The
//! EPIBT recursion interleaves reserve/unreserve calls from different stack
//! frames over overlapping cells; the equality guard makes clearing an older
//! frame's path a no-op wherever a newer frame has already claimed the slot,
//! which is what makes the save/restore rollback exact.

use mapd_core::{AgentId, Cell, Grid};

/// Per-subtime cell ownership for one planning step.
pub struct ReservationTable {
    height: usize,
    width: usize,
    horizon: usize,
    slots: Vec<AgentId>,
}

impl ReservationTable {
    /// A table spanning `op_len + 1` subtimes of `grid`, initially all free.
    pub fn new(grid: &Grid, op_len: usize) -> ReservationTable {
        let height = grid.height() as usize;
        let width = grid.width() as usize;
        let horizon = op_len + 1;
        ReservationTable {
            height,
            width,
            horizon,
            slots: vec![AgentId::INVALID; horizon * height * width],
        }
    }

    /// Number of subtimes covered (`op_len + 1`).
    #[inline]
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Free every slot.
    pub fn clear(&mut self) {
        self.slots.fill(AgentId::INVALID);
    }

    /// The agent holding `cell` at subtime `t`, or `AgentId::INVALID`.
    #[inline]
    pub fn owner(&self, t: usize, cell: Cell) -> AgentId {
        self.slots[self.idx(t, cell)]
    }

    /// Claim every `(t, path[t])` slot for `agent`.
    pub fn reserve(&mut self, agent: AgentId, path: &[Cell]) {
        for (t, &cell) in path.iter().enumerate() {
            let i = self.idx(t, cell);
            self.slots[i] = agent;
        }
    }

    /// Release every `(t, path[t])` slot currently owned by `agent`.
    ///
    /// Slots owned by anyone else are left untouched.
    pub fn unreserve(&mut self, agent: AgentId, path: &[Cell]) {
        for (t, &cell) in path.iter().enumerate() {
            let i = self.idx(t, cell);
            if self.slots[i] == agent {
                self.slots[i] = AgentId::INVALID;
            }
        }
    }

    /// All agents whose reservations conflict with `agent` following `path`.
    ///
    /// A *vertex* conflict is another owner of `(t, path[t])`.  An *edge*
    /// conflict at `t ≥ 1` is an agent sitting on `path[t]` at `t - 1` that
    /// moves onto `path[t - 1]` at `t` — the two would swap cells.
    pub fn conflicts(&self, agent: AgentId, path: &[Cell]) -> Vec<AgentId> {
        let mut found: Vec<AgentId> = Vec::new();

        for (t, &cell) in path.iter().enumerate() {
            let occupant = self.owner(t, cell);
            if occupant != AgentId::INVALID && occupant != agent && !found.contains(&occupant) {
                found.push(occupant);
            }

            if t > 0 && cell != path[t - 1] {
                let oncoming = self.owner(t - 1, cell);
                if oncoming != AgentId::INVALID
                    && oncoming != agent
                    && self.owner(t, path[t - 1]) == oncoming
                    && !found.contains(&oncoming)
                {
                    found.push(oncoming);
                }
            }
        }

        found
    }

    #[inline(always)]
    fn idx(&self, t: usize, cell: Cell) -> usize {
        debug_assert!(t < self.horizon);
        (t * self.height + cell.y as usize) * self.width + cell.x as usize
    }
}
