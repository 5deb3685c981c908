//! Task model and per-agent job state.

use std::fmt;

use mapd_core::{AgentId, Cell, TaskId};

// ── Task ──────────────────────────────────────────────────────────────────────

/// One pickup-and-delivery job.
///
/// A task lives in exactly one of the dispatcher's queues — pending, active,
/// or completed — and is referenced from its assignee by [`TaskId`].  The
/// timestamps are monotone whenever set:
/// `created_at ≤ picked_up_at ≤ delivered_at`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Task {
    pub task_id: TaskId,
    pub pickup: Cell,
    pub delivery: Cell,
    /// Tick the task entered the pending queue.
    pub created_at: u64,
    /// At most one agent ever holds a task.
    pub assigned_to: Option<AgentId>,
    pub picked_up_at: Option<u64>,
    pub delivered_at: Option<u64>,
}

impl Task {
    pub(crate) fn new(task_id: TaskId, pickup: Cell, delivery: Cell, created_at: u64) -> Task {
        Task {
            task_id,
            pickup,
            delivery,
            created_at,
            assigned_to: None,
            picked_up_at: None,
            delivered_at: None,
        }
    }

    /// Ticks from creation to delivery, once delivered.
    pub fn service_time(&self) -> Option<u64> {
        Some(self.delivered_at? - self.created_at)
    }
}

// ── JobState ──────────────────────────────────────────────────────────────────

/// What an agent is currently doing.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub enum JobState {
    /// No task; the agent's goal is wherever it stands.
    #[default]
    Idle,
    /// Assigned; heading for the task's pickup cell.
    ToPickup,
    /// Loaded; heading for the task's delivery cell.
    ToDelivery,
}

impl JobState {
    #[inline]
    pub fn is_idle(self) -> bool {
        matches!(self, JobState::Idle)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobState::Idle => "idle",
            JobState::ToPickup => "to_pickup",
            JobState::ToDelivery => "to_delivery",
        }
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── AgentJob ──────────────────────────────────────────────────────────────────

/// Per-agent dispatch state.
///
/// Invariant: `state` is `Idle` exactly when `task` is `None`.
#[derive(Copy, Clone, Debug, Default)]
pub struct AgentJob {
    pub state: JobState,
    pub task: Option<TaskId>,
}
