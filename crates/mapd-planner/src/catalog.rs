//! Pre-enumerated catalog of canonical multi-action operations.
//!
//! Every action sequence of the configured horizon is generated once and
//! filtered down to *canonical* form; the surviving list is agent-independent
//! and reused every timestep.  Three rules define canonicality:
//!
//! 1. No adjacent cancelling rotations (`RC` / `CR` subsequences).
//! 2. No wasteful rotation runs: a maximal run of consecutive rotations must
//!    be exactly the minimum number of quarter-turns realizing its net
//!    rotation mod 4.  This removes `RRR` (≡ `C`), `CCC` (≡ `R`), and any
//!    full-circle run.
//! 3. No trailing rotation: the final heading never changes the cell-path,
//!    so the equivalent wait-terminated operation already exists.
//!
//! Rule 1 forces every rotation run to be same-direction, which collapses
//! rule 2 to "no run of three or more" — the check below still uses the net
//! form so it holds for any horizon.

use mapd_core::{Action, Operation};

const ACTIONS: [Action; 4] = [Action::Forward, Action::TurnCw, Action::TurnCcw, Action::Wait];

/// The canonical operations of a fixed horizon.
pub struct OpCatalog {
    op_len: usize,
    ops: Vec<Operation>,
}

impl OpCatalog {
    /// Enumerate and prune all operations of length `op_len`.
    ///
    /// The result is a pure function of `op_len`; for the default horizon of
    /// 3 it holds 28 operations.
    pub fn new(op_len: usize) -> OpCatalog {
        let mut ops = Vec::new();
        let mut scratch = vec![Action::Wait; op_len];
        enumerate(&mut scratch, 0, &mut ops);
        OpCatalog { op_len, ops }
    }

    #[inline]
    pub fn op_len(&self) -> usize {
        self.op_len
    }

    #[inline]
    pub fn ops(&self) -> &[Operation] {
        &self.ops
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Depth-first cartesian product over `ACTIONS`, keeping canonical sequences.
fn enumerate(scratch: &mut [Action], depth: usize, out: &mut Vec<Operation>) {
    if depth == scratch.len() {
        if is_canonical(scratch) {
            out.push(Operation::new(scratch.to_vec()));
        }
        return;
    }
    for action in ACTIONS {
        scratch[depth] = action;
        enumerate(scratch, depth + 1, out);
    }
}

fn is_canonical(actions: &[Action]) -> bool {
    // Rule 3: trailing rotation.
    if actions.last().is_some_and(|a| a.is_rotation()) {
        return false;
    }

    let mut run_len: u32 = 0; // consecutive rotations so far
    let mut net: i32 = 0; // net quarter-turns of the current run, CW positive
    let mut prev: Option<Action> = None;

    for &action in actions {
        if action.is_rotation() {
            // Rule 1: adjacent opposite rotations cancel.
            if let Some(p) = prev {
                if p.is_rotation() && p != action {
                    return false;
                }
            }
            run_len += 1;
            net += if action == Action::TurnCw { 1 } else { -1 };

            // Rule 2: run length must stay minimal for its net rotation.
            let m = net.unsigned_abs() % 4;
            if run_len > m.min(4 - m) {
                return false;
            }
        } else {
            run_len = 0;
            net = 0;
        }
        prev = Some(action);
    }

    true
}
