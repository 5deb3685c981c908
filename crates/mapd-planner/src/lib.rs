//! `mapd-planner` — the EPIBT planner and its supporting structures.
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`dist`]    | `DistTable` — per-goal lazy BFS distance oracle           |
//! | [`catalog`] | `OpCatalog` — pruned multi-action operation enumeration   |
//! | [`reserve`] | `ReservationTable` — (subtime, y, x) → owning agent       |
//! | [`planner`] | `Planner` — per-timestep EPIBT selection, step/run facade |
//!
//! The planner is single-threaded and deterministic: given the same grid,
//! endpoints, seed, and tuning, `step` and `run` reproduce bit-identical
//! configuration sequences.

pub mod catalog;
pub mod dist;
pub mod planner;
pub mod reserve;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use catalog::OpCatalog;
pub use dist::{DistTable, UNREACHED};
pub use planner::{PlanError, Planner, PlannerConfig};
pub use reserve::ReservationTable;
