//! Completed-task CSV export.
//!
//! One row per task with its stations, lifecycle timestamps, and assignee.
//! Unset timestamps (a task logged mid-flight) serialize as empty fields.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use mapd_dispatch::Task;

use crate::IoError;

/// Flat CSV row for one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskLogRow {
    pub task_id: u32,
    pub pickup_y: i32,
    pub pickup_x: i32,
    pub delivery_y: i32,
    pub delivery_x: i32,
    pub created_at: u64,
    pub assigned_to: Option<u32>,
    pub picked_up_at: Option<u64>,
    pub delivered_at: Option<u64>,
}

impl From<&Task> for TaskLogRow {
    fn from(task: &Task) -> TaskLogRow {
        TaskLogRow {
            task_id: task.task_id.0,
            pickup_y: task.pickup.y,
            pickup_x: task.pickup.x,
            delivery_y: task.delivery.y,
            delivery_x: task.delivery.x,
            created_at: task.created_at,
            assigned_to: task.assigned_to.map(|a| a.0),
            picked_up_at: task.picked_up_at,
            delivered_at: task.delivered_at,
        }
    }
}

/// Serialize `tasks` as CSV (header row included) into `writer`.
pub fn write_task_log<W: Write>(writer: W, tasks: &[Task]) -> Result<(), IoError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for task in tasks {
        csv_writer.serialize(TaskLogRow::from(task))?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Create (or truncate) `path` and write the task log there.
pub fn save_task_log(path: &Path, tasks: &[Task]) -> Result<(), IoError> {
    write_task_log(BufWriter::new(File::create(path)?), tasks)
}
