//! The MAPD dispatcher and its tick loop.
//!
//! # One `tick`, five phases
//!
//! 1. **Arrivals**: draw `k ~ Poisson(task_frequency)` and append `k` new
//!    tasks to the pending queue, pickup and delivery drawn uniformly from
//!    the configured station sets.
//! 2. **Arrival check**: agents standing on their current target transition —
//!    pickup reached stamps `picked_up_at` and retargets the planner at the
//!    delivery; delivery reached stamps `delivered_at`, moves the task to the
//!    completed list, and parks the now-idle agent on its own cell.
//! 3. **Assignment**: walk pending tasks in FIFO order and hand each to the
//!    idle agent with the smallest *BFS* distance from the task's pickup —
//!    Manhattan distance is arbitrarily wrong around warehouse shelving, so
//!    assignment reuses a per-pickup lazy oracle instead.  Tasks whose pickup
//!    no idle agent can reach stay pending.
//! 4. **Priority aging**: agents off their goal gain 1 priority; agents on
//!    it keep only the fractional part.
//! 5. **Plan**: one EPIBT step produces the next joint configuration.

use rand_distr::Poisson;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use mapd_core::{AgentId, Cell, Configuration, Grid, SeedRng, TaskId};
use mapd_planner::{DistTable, PlanError, Planner, PlannerConfig, UNREACHED};

use crate::task::{AgentJob, JobState, Task};

// ── Configuration ─────────────────────────────────────────────────────────────

/// Dispatcher tuning knobs.
#[derive(Clone, Debug)]
pub struct DispatchConfig {
    /// Fleet size; agents are placed on distinct free non-station cells.
    pub num_agents: usize,
    /// Mean of the Poisson task-arrival process, in tasks per tick.
    pub task_frequency: f64,
    /// Seeds the dispatcher RNG; the planner RNG is seeded independently
    /// from the same value.
    pub seed: u64,
    /// Planner operation horizon.
    pub op_len: usize,
    /// Planner per-agent revisit cap.
    pub max_revisits: u32,
}

impl DispatchConfig {
    /// A config with the default planner tuning (horizon 3, 10 revisits).
    pub fn new(num_agents: usize, task_frequency: f64, seed: u64) -> DispatchConfig {
        DispatchConfig { num_agents, task_frequency, seed, op_len: 3, max_revisits: 10 }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Construction-time rejection of an unusable warehouse instance.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no pickup stations or no delivery stations configured")]
    NoStations,

    #[error("station cell {cell} is blocked or out of bounds")]
    BlockedStation { cell: Cell },

    #[error("{requested} agents requested but only {available} free non-station cells exist")]
    TooManyAgents { requested: usize, available: usize },

    #[error("task frequency must be finite and non-negative, got {0}")]
    InvalidTaskFrequency(f64),

    #[error(transparent)]
    Plan(#[from] PlanError),
}

// ── Dispatcher ────────────────────────────────────────────────────────────────

/// Lifelong MAPD coordinator: generates tasks, assigns them to agents,
/// tracks pickup/delivery progress, and steps the planner once per tick.
pub struct Dispatcher {
    grid: Grid,
    rng: SeedRng,
    /// `None` when `task_frequency` is zero — no tasks ever arrive.
    arrivals: Option<Poisson<f64>>,
    pickup_locations: Vec<Cell>,
    delivery_locations: Vec<Cell>,
    planner: Planner,

    agents: Vec<AgentJob>,
    priorities: Vec<f64>,

    task_counter: u32,
    pending: Vec<Task>,
    active: Vec<Task>,
    completed: Vec<Task>,

    /// One lazy BFS oracle per distinct pickup station, reused across every
    /// assignment round.
    pickup_dist: FxHashMap<Cell, DistTable>,

    current: Configuration,
    timestep: u64,
}

impl Dispatcher {
    /// Validate the instance, place the fleet, and build the planner.
    ///
    /// Starts are drawn without replacement from the free non-station cells
    /// using the dispatcher RNG; initial goals equal starts, so the whole
    /// fleet begins idle and parked.
    pub fn new(
        grid: Grid,
        pickup_locations: Vec<Cell>,
        delivery_locations: Vec<Cell>,
        config: &DispatchConfig,
    ) -> Result<Dispatcher, DispatchError> {
        if pickup_locations.is_empty() || delivery_locations.is_empty() {
            return Err(DispatchError::NoStations);
        }
        for &cell in pickup_locations.iter().chain(delivery_locations.iter()) {
            if !grid.is_free(cell) {
                return Err(DispatchError::BlockedStation { cell });
            }
        }
        if !config.task_frequency.is_finite() || config.task_frequency < 0.0 {
            return Err(DispatchError::InvalidTaskFrequency(config.task_frequency));
        }
        let arrivals = if config.task_frequency > 0.0 {
            Some(
                Poisson::new(config.task_frequency)
                    .map_err(|_| DispatchError::InvalidTaskFrequency(config.task_frequency))?,
            )
        } else {
            None
        };

        // ── Fleet placement ───────────────────────────────────────────────
        let stations: FxHashSet<Cell> = pickup_locations
            .iter()
            .chain(delivery_locations.iter())
            .copied()
            .collect();
        let mut available: Vec<Cell> = Vec::new();
        for y in 0..grid.height() as i32 {
            for x in 0..grid.width() as i32 {
                let cell = Cell::new(y, x);
                if grid.is_free(cell) && !stations.contains(&cell) {
                    available.push(cell);
                }
            }
        }
        if config.num_agents > available.len() {
            return Err(DispatchError::TooManyAgents {
                requested: config.num_agents,
                available: available.len(),
            });
        }

        let mut rng = SeedRng::new(config.seed);
        let picks = rand::seq::index::sample(rng.inner(), available.len(), config.num_agents);
        let starts: Vec<Cell> = picks.iter().map(|i| available[i]).collect();

        let planner = Planner::new(
            grid.clone(),
            starts.clone(),
            starts.clone(),
            &PlannerConfig {
                seed: config.seed,
                op_len: config.op_len,
                max_revisits: config.max_revisits,
            },
        )?;

        let pickup_dist: FxHashMap<Cell, DistTable> = pickup_locations
            .iter()
            .map(|&cell| (cell, DistTable::new(&grid, cell)))
            .collect();

        Ok(Dispatcher {
            rng,
            arrivals,
            pickup_locations,
            delivery_locations,
            planner,
            agents: vec![AgentJob::default(); config.num_agents],
            priorities: vec![0.0; config.num_agents],
            task_counter: 0,
            pending: Vec::new(),
            active: Vec::new(),
            completed: Vec::new(),
            pickup_dist,
            current: starts,
            timestep: 0,
            grid,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn current_config(&self) -> &[Cell] {
        &self.current
    }

    #[inline]
    pub fn pending_tasks(&self) -> &[Task] {
        &self.pending
    }

    #[inline]
    pub fn active_tasks(&self) -> &[Task] {
        &self.active
    }

    #[inline]
    pub fn completed_tasks(&self) -> &[Task] {
        &self.completed
    }

    #[inline]
    pub fn agents(&self) -> &[AgentJob] {
        &self.agents
    }

    #[inline]
    pub fn timestep(&self) -> u64 {
        self.timestep
    }

    /// Read-only view of the underlying planner (goals, grid).
    #[inline]
    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    // ── Ticking ───────────────────────────────────────────────────────────

    /// Advance the simulation one timestep and return the fleet's new joint
    /// configuration.
    pub fn tick(&mut self) -> Configuration {
        self.timestep += 1;

        self.generate_tasks();
        self.check_arrivals();
        self.assign_tasks();
        self.age_priorities();

        let next = self.planner.step(&self.current, &self.priorities);
        self.current.clone_from(&next);
        next
    }

    // ── Phase 1: task arrivals ────────────────────────────────────────────

    fn generate_tasks(&mut self) {
        let Some(arrivals) = self.arrivals else {
            return;
        };
        let count = self.rng.sample(arrivals) as u64;
        for _ in 0..count {
            let pickup = self.pickup_locations[self.rng.gen_range(0..self.pickup_locations.len())];
            let delivery =
                self.delivery_locations[self.rng.gen_range(0..self.delivery_locations.len())];
            let task = Task::new(TaskId(self.task_counter), pickup, delivery, self.timestep);
            self.task_counter += 1;
            self.pending.push(task);
        }
    }

    // ── Phase 2: pickup / delivery transitions ────────────────────────────

    fn check_arrivals(&mut self) {
        for i in 0..self.agents.len() {
            let Some(task_id) = self.agents[i].task else {
                continue;
            };
            let Some(slot) = self.active.iter().position(|t| t.task_id == task_id) else {
                debug_assert!(false, "assigned task missing from active list");
                continue;
            };
            let pos = self.current[i];

            match self.agents[i].state {
                JobState::ToPickup if pos == self.active[slot].pickup => {
                    self.active[slot].picked_up_at = Some(self.timestep);
                    self.agents[i].state = JobState::ToDelivery;
                    let delivery = self.active[slot].delivery;
                    self.planner.update_goal(AgentId(i as u32), delivery);
                }
                JobState::ToDelivery if pos == self.active[slot].delivery => {
                    let mut task = self.active.remove(slot);
                    task.delivered_at = Some(self.timestep);
                    self.completed.push(task);
                    self.agents[i] = AgentJob::default();
                    // Park the idle agent where it stands.
                    self.planner.update_goal(AgentId(i as u32), pos);
                }
                _ => {}
            }
        }
    }

    // ── Phase 3: greedy assignment ────────────────────────────────────────

    fn assign_tasks(&mut self) {
        let mut idle: Vec<usize> = self
            .agents
            .iter()
            .enumerate()
            .filter(|(_, job)| job.state.is_idle())
            .map(|(i, _)| i)
            .collect();

        // Pending-queue indices bound this round, in FIFO order.
        let mut assigned: Vec<usize> = Vec::new();

        for ti in 0..self.pending.len() {
            if idle.is_empty() {
                break;
            }
            let pickup = self.pending[ti].pickup;

            let grid = &self.grid;
            let current = &self.current;
            let oracle = self
                .pickup_dist
                .entry(pickup)
                .or_insert_with(|| DistTable::new(grid, pickup));

            // Nearest idle agent by true path distance; first wins ties.
            let mut best: Option<(usize, u32)> = None;
            for (slot, &agent) in idle.iter().enumerate() {
                let d = oracle.get(grid, current[agent]);
                if d == UNREACHED {
                    continue;
                }
                if best.is_none_or(|(_, best_d)| d < best_d) {
                    best = Some((slot, d));
                }
            }
            // Pickup unreachable from every idle agent: leave the task
            // pending and move on.
            let Some((slot, _)) = best else {
                continue;
            };

            let agent = idle.remove(slot);
            self.pending[ti].assigned_to = Some(AgentId(agent as u32));
            self.agents[agent] =
                AgentJob { state: JobState::ToPickup, task: Some(self.pending[ti].task_id) };
            self.planner.update_goal(AgentId(agent as u32), pickup);
            assigned.push(ti);
        }

        // Move bound tasks pending → active, preserving FIFO order.
        for (removed, &ti) in assigned.iter().enumerate() {
            let task = self.pending.remove(ti - removed);
            self.active.push(task);
        }
    }

    // ── Phase 4: priority aging ───────────────────────────────────────────

    fn age_priorities(&mut self) {
        let goals = self.planner.goals();
        for i in 0..self.agents.len() {
            if self.current[i] != goals[i] {
                self.priorities[i] += 1.0;
            } else {
                self.priorities[i] -= self.priorities[i].floor();
            }
        }
    }
}
