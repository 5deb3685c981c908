//! `mapd-io` — benchmark file formats for the `rust_mapd` engine.
//!
//! # What lives here
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`map`]      | MovingAI `.map` → [`mapd_core::Grid`]                 |
//! | [`scenario`] | MovingAI `.scen` → start/goal configurations          |
//! | [`plan`]     | visualizer plan writer (`t:(x,y),…,` lines)           |
//! | [`task_log`] | completed-task CSV export                             |
//!
//! All parsers work on in-memory strings (with `load_*` path conveniences)
//! so tests never need fixture files on disk.

pub mod map;
pub mod plan;
pub mod scenario;
pub mod task_log;

mod error;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::IoError;
pub use map::{load_map, parse_map};
pub use plan::{save_plan, write_plan};
pub use scenario::{load_scenario, parse_scenario};
pub use task_log::{TaskLogRow, save_task_log, write_task_log};
