//! Plan validation: continuity and collision-freedom of a configuration
//! sequence.
//!
//! The checker walks the plan timestep by timestep and reports the *first*
//! violation it finds; a plan that survives every check is a feasible
//! discrete MAPF solution.  [`validate_plan`] is the strict variant;
//! [`is_valid_plan`] collapses the diagnosis to a boolean for callers that
//! only gate on feasibility.

use thiserror::Error;

use crate::grid::{Cell, Configuration, Grid};
use crate::ids::AgentId;

/// The first violation found in a candidate plan.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("plan holds no configurations")]
    EmptyPlan,

    #[error("configuration at step {t} holds {got} agents, expected {expected}")]
    WidthMismatch { t: usize, expected: usize, got: usize },

    #[error("{agent} starts at {expected} but the plan begins at {got}")]
    StartMismatch { agent: AgentId, expected: Cell, got: Cell },

    #[error("{agent} must end at {expected} but the plan ends at {got}")]
    GoalMismatch { agent: AgentId, expected: Cell, got: Cell },

    #[error("{agent} jumps from {from} to {to} entering step {t}")]
    Discontinuity { t: usize, agent: AgentId, from: Cell, to: Cell },

    #[error("{a} and {b} both occupy {cell} at step {t}")]
    VertexCollision { t: usize, a: AgentId, b: AgentId, cell: Cell },

    #[error("{a} and {b} swap cells entering step {t}")]
    EdgeSwap { t: usize, a: AgentId, b: AgentId },
}

/// Check that `plan` is a feasible solution for `(grid, starts, goals)`.
///
/// Verifies, in order: the plan is non-empty and rectangular, begins at
/// `starts`, ends at `goals`, every per-step move is a stay or a traversable
/// 4-neighbor step, and no two agents ever collide on a vertex or swap along
/// an edge.
pub fn validate_plan(
    grid: &Grid,
    starts: &[Cell],
    goals: &[Cell],
    plan: &[Configuration],
) -> Result<(), ValidationError> {
    let first = plan.first().ok_or(ValidationError::EmptyPlan)?;
    let n = starts.len();

    for (t, config) in plan.iter().enumerate() {
        if config.len() != n {
            return Err(ValidationError::WidthMismatch { t, expected: n, got: config.len() });
        }
    }

    for (i, (&expected, &got)) in starts.iter().zip(first).enumerate() {
        if expected != got {
            return Err(ValidationError::StartMismatch { agent: AgentId(i as u32), expected, got });
        }
    }

    let last = &plan[plan.len() - 1];
    for (i, (&expected, &got)) in goals.iter().zip(last).enumerate() {
        if expected != got {
            return Err(ValidationError::GoalMismatch { agent: AgentId(i as u32), expected, got });
        }
    }

    for t in 1..plan.len() {
        let prev = &plan[t - 1];
        let now = &plan[t];

        for i in 0..n {
            let stayed = now[i] == prev[i];
            if !stayed && !grid.neighbors(prev[i]).any(|c| c == now[i]) {
                return Err(ValidationError::Discontinuity {
                    t,
                    agent: AgentId(i as u32),
                    from: prev[i],
                    to: now[i],
                });
            }
        }

        for i in 0..n {
            for j in (i + 1)..n {
                if now[i] == now[j] {
                    return Err(ValidationError::VertexCollision {
                        t,
                        a: AgentId(i as u32),
                        b: AgentId(j as u32),
                        cell: now[i],
                    });
                }
                if now[i] == prev[j] && prev[i] == now[j] {
                    return Err(ValidationError::EdgeSwap {
                        t,
                        a: AgentId(i as u32),
                        b: AgentId(j as u32),
                    });
                }
            }
        }
    }

    // A single-configuration plan can still collide at t = 0.
    for i in 0..n {
        for j in (i + 1)..n {
            if first[i] == first[j] {
                return Err(ValidationError::VertexCollision {
                    t: 0,
                    a: AgentId(i as u32),
                    b: AgentId(j as u32),
                    cell: first[i],
                });
            }
        }
    }

    Ok(())
}

/// Boolean convenience over [`validate_plan`].
pub fn is_valid_plan(grid: &Grid, starts: &[Cell], goals: &[Cell], plan: &[Configuration]) -> bool {
    validate_plan(grid, starts, goals, plan).is_ok()
}
