//! `mapd-core` — foundational types for the `rust_mapd` warehouse engine.
//!
//! This crate is a dependency of every other `mapd-*` crate.  It intentionally
//! has no `mapd-*` dependencies and minimal external ones (only `rand` and
//! `thiserror`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module       | Contents                                                |
//! |--------------|---------------------------------------------------------|
//! | [`ids`]      | `AgentId`, `TaskId`                                     |
//! | [`grid`]     | `Cell`, `Grid`, 4-neighbor enumeration                  |
//! | [`motion`]   | `Orientation`, `Action`, `Operation`, trajectory tracer |
//! | [`rng`]      | `SeedRng` deterministic RNG wrapper                     |
//! | [`validate`] | plan continuity / collision checker                     |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod grid;
pub mod ids;
pub mod motion;
pub mod rng;
pub mod validate;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use grid::{Cell, Configuration, Grid};
pub use ids::{AgentId, TaskId};
pub use motion::{Action, Operation, Orientation, Trajectory, trace};
pub use rng::SeedRng;
pub use validate::{ValidationError, is_valid_plan, validate_plan};
