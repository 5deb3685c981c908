//! The EPIBT planner: per-timestep priority-inherited operation selection.
//!
//! # One `step`, four phases
//!
//! 1. **Seed**: clear the reservation table, trace every agent's inherited
//!    operation from its current oriented cell (falling back to an all-wait
//!    hold when the inherited plan no longer traces), and reserve all the
//!    provisional trajectories.
//! 2. **Order**: sort agents by priority descending, ties broken by
//!    ascending index.
//! 3. **Select**: for each not-yet-visited agent, release its provisional
//!    reservation and run the recursive selection below; on failure the
//!    fallback trajectory it left behind is re-reserved.
//! 4. **Emit**: execute only the *first* action of every committed
//!    operation, update headings, and shift each operation into next step's
//!    inherited form (head dropped, wait appended).
//!
//! # Recursive selection
//!
//! `select(k, p)` walks agent `k`'s ranked candidates.  A conflict-free
//! candidate commits immediately.  A candidate conflicting with exactly one
//! agent `l` of lower priority than `p` *pushes* `l`: `l`'s reservation is
//! lifted, `k` commits tentatively, and `l` reselects under the inherited
//! priority `p`.  If the push fails, the table and `l`'s commitment are
//! restored to the exact pre-push state before the next candidate is tried.
//! The `hit` flags stop the recursion from re-entering an agent already on
//! the current branch, and each agent's visits per step are capped, so the
//! search is a bounded DFS through the conflict graph.
//!
//! `step` is total: it cannot fail, and the reservation-table discipline
//! makes every emitted joint configuration collision-free by construction.
//! Deadlock-shaped instances simply produce wait-heavy plans until priority
//! aging breaks the standoff.

use rustc_hash::FxHashMap;
use thiserror::Error;

use mapd_core::{
    Action, AgentId, Cell, Configuration, Grid, Operation, Orientation, SeedRng, Trajectory, trace,
};

use crate::catalog::OpCatalog;
use crate::dist::{DistTable, UNREACHED};
use crate::reserve::ReservationTable;

// ── Configuration ─────────────────────────────────────────────────────────────

/// Planner tuning knobs.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Seeds the planner's private RNG (initial headings, tie-break shuffles).
    pub seed: u64,
    /// Operation horizon L: actions per operation, cells per trajectory - 1.
    pub op_len: usize,
    /// Per-agent cap on selection visits within one step.
    pub max_revisits: u32,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig { seed: 0, op_len: 3, max_revisits: 10 }
    }
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// Construction-time rejection of an unusable problem instance.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("{starts} starts but {goals} goals")]
    LengthMismatch { starts: usize, goals: usize },

    #[error("{agent} start {cell} is blocked or out of bounds")]
    BlockedStart { agent: AgentId, cell: Cell },

    #[error("{agent} goal {cell} is blocked or out of bounds")]
    BlockedGoal { agent: AgentId, cell: Cell },

    #[error("operation horizon must be at least 1")]
    ZeroHorizon,
}

// ── Candidate ─────────────────────────────────────────────────────────────────

/// One ranked option for an agent: a catalog operation, its trajectory from
/// the agent's current oriented cell, and its selection weight.
struct Candidate {
    op_idx: usize,
    path: Vec<Cell>,
    weight: u64,
}

// ── Planner ───────────────────────────────────────────────────────────────────

/// The EPIBT planner.  Owns agent headings, inherited operations, per-agent
/// distance oracles, the operation catalog, and the reservation table; the
/// caller owns positions and priorities and feeds them into [`step`].
///
/// [`step`]: Planner::step
pub struct Planner {
    grid: Grid,
    starts: Vec<Cell>,
    goals: Vec<Cell>,
    op_len: usize,
    max_revisits: u32,
    catalog: OpCatalog,
    dist: Vec<DistTable>,
    rng: SeedRng,
    orientations: Vec<Orientation>,
    inherited: Vec<Operation>,
    reserved: ReservationTable,

    // ── Per-step scratch, reused across calls ─────────────────────────────
    q_from: Vec<Cell>,
    priorities: Vec<f64>,
    visit_count: Vec<u32>,
    hit: Vec<bool>,
    ops: Vec<Operation>,
    paths: Vec<Vec<Cell>>,
}

impl Planner {
    /// Validate the instance and build a planner over it.
    ///
    /// Initial headings are drawn uniformly from the seeded RNG; inherited
    /// operations start as all-wait.
    pub fn new(
        grid: Grid,
        starts: Vec<Cell>,
        goals: Vec<Cell>,
        config: &PlannerConfig,
    ) -> Result<Planner, PlanError> {
        if config.op_len == 0 {
            return Err(PlanError::ZeroHorizon);
        }
        if starts.len() != goals.len() {
            return Err(PlanError::LengthMismatch { starts: starts.len(), goals: goals.len() });
        }
        for (i, &cell) in starts.iter().enumerate() {
            if !grid.is_free(cell) {
                return Err(PlanError::BlockedStart { agent: AgentId(i as u32), cell });
            }
        }
        for (i, &cell) in goals.iter().enumerate() {
            if !grid.is_free(cell) {
                return Err(PlanError::BlockedGoal { agent: AgentId(i as u32), cell });
            }
        }

        let n = starts.len();
        let mut rng = SeedRng::new(config.seed);
        let orientations: Vec<Orientation> =
            (0..n).map(|_| Orientation::from_index(rng.gen_range(0..4u8))).collect();
        let dist: Vec<DistTable> = goals.iter().map(|&g| DistTable::new(&grid, g)).collect();
        let catalog = OpCatalog::new(config.op_len);
        let reserved = ReservationTable::new(&grid, config.op_len);

        Ok(Planner {
            starts,
            goals,
            op_len: config.op_len,
            max_revisits: config.max_revisits,
            catalog,
            dist,
            rng,
            orientations,
            inherited: vec![Operation::all_wait(config.op_len); n],
            reserved,
            q_from: Vec::with_capacity(n),
            priorities: Vec::with_capacity(n),
            visit_count: vec![0; n],
            hit: vec![false; n],
            ops: vec![Operation::all_wait(config.op_len); n],
            paths: vec![Vec::new(); n],
            grid,
        })
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn num_agents(&self) -> usize {
        self.starts.len()
    }

    #[inline]
    pub fn goals(&self) -> &[Cell] {
        &self.goals
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[cfg(test)]
    pub(crate) fn reservations(&self) -> &ReservationTable {
        &self.reserved
    }

    // ── Goal updates ──────────────────────────────────────────────────────

    /// Retarget one agent, discarding its distance oracle.
    ///
    /// Creation is O(1); the replacement oracle fills lazily as future steps
    /// query it.  An unreachable (or blocked) goal is not an error — the
    /// agent will find every candidate terminal `UNREACHED` and keep
    /// waiting in place.
    pub fn update_goal(&mut self, agent: AgentId, goal: Cell) {
        self.goals[agent.index()] = goal;
        self.dist[agent.index()] = DistTable::new(&self.grid, goal);
    }

    // ── Stepping ──────────────────────────────────────────────────────────

    /// Plan one timestep: from joint configuration `q_from` under
    /// `priorities`, produce the next joint configuration.
    ///
    /// Always succeeds; agents that cannot make progress wait in place.
    pub fn step(&mut self, q_from: &[Cell], priorities: &[f64]) -> Configuration {
        let n = self.num_agents();
        debug_assert_eq!(q_from.len(), n);
        debug_assert_eq!(priorities.len(), n);

        // ── Phase 1: seed the table with inherited trajectories ───────────
        self.q_from.clear();
        self.q_from.extend_from_slice(q_from);
        self.priorities.clear();
        self.priorities.extend_from_slice(priorities);
        self.visit_count.fill(0);
        self.hit.fill(false);
        self.ops.clone_from(&self.inherited);

        self.reserved.clear();
        for i in 0..n {
            match trace(&self.grid, q_from[i], self.orientations[i], &self.inherited[i]) {
                Some(traj) => self.paths[i] = traj.cells,
                None => {
                    // The inherited plan no longer traces (a forward now hits
                    // a wall it didn't when committed).  Hold position.
                    self.paths[i] =
                        Trajectory::hold(q_from[i], self.orientations[i], self.op_len).cells;
                    self.ops[i] = Operation::all_wait(self.op_len);
                }
            }
            self.reserved.reserve(AgentId(i as u32), &self.paths[i]);
        }

        // ── Phase 2: priority order ───────────────────────────────────────
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| priorities[b].total_cmp(&priorities[a]).then(a.cmp(&b)));

        // ── Phase 3: selection ────────────────────────────────────────────
        for k in order {
            if self.visit_count[k] != 0 {
                continue;
            }
            let provisional = std::mem::take(&mut self.paths[k]);
            self.reserved.unreserve(AgentId(k as u32), &provisional);

            if !self.select(k, priorities[k]) {
                // `select` left the fallback trajectory in `paths[k]`; give
                // it back its slots.
                self.reserved.reserve(AgentId(k as u32), &self.paths[k]);
            }
        }

        // ── Phase 4: emit first actions ───────────────────────────────────
        let mut q_to = Vec::with_capacity(n);
        for i in 0..n {
            let mut pos = q_from[i];
            let mut heading = self.orientations[i];
            match self.ops[i].first() {
                Action::Forward => {
                    let next = pos.step(heading);
                    // Committed operations only contain feasible forwards;
                    // hold position if that somehow no longer holds.
                    if self.grid.is_free(next) {
                        pos = next;
                    }
                }
                Action::TurnCw => heading = heading.cw(),
                Action::TurnCcw => heading = heading.ccw(),
                Action::Wait => {}
            }
            q_to.push(pos);
            self.orientations[i] = heading;
            self.inherited[i] = self.ops[i].advance();
        }

        q_to
    }

    /// Solve a one-shot MAPF instance: iterate [`step`] until every agent
    /// stands on its goal or `max_timestep` steps have been taken, managing
    /// priorities internally (off-goal agents age by one per step; agents on
    /// their goal keep only the fractional part).
    ///
    /// Returns the full configuration sequence, starting with the starts.
    ///
    /// [`step`]: Planner::step
    pub fn run(&mut self, max_timestep: usize) -> Vec<Configuration> {
        let n = self.num_agents();
        let size = self.grid.size() as f64;

        let mut priorities = Vec::with_capacity(n);
        for i in 0..n {
            let d = self.dist[i].get(&self.grid, self.starts[i]);
            priorities.push(if d == UNREACHED { 0.0 } else { f64::from(d) / size });
        }

        let mut plan = vec![self.starts.clone()];
        while plan.len() <= max_timestep {
            let current = plan[plan.len() - 1].clone();
            let next = self.step(&current, &priorities);

            let mut all_done = true;
            for i in 0..n {
                if next[i] != self.goals[i] {
                    all_done = false;
                    priorities[i] += 1.0;
                } else {
                    priorities[i] -= priorities[i].floor();
                }
            }
            plan.push(next);
            if all_done {
                break;
            }
        }

        plan
    }

    // ── Candidate ranking ─────────────────────────────────────────────────

    /// All feasible catalog operations for agent `k` from its current
    /// oriented cell, deduplicated by trajectory and sorted by weight.
    ///
    /// Weight is `h · α + β`: `h` the oracle distance of the terminal cell,
    /// `α = height · width · 10` so any distance difference dominates, and
    /// `β` the per-action tie-break penalty (forward 0, rotation 1, wait 2).
    /// Among equal trajectories only the lightest operation survives; a
    /// seeded shuffle before the stable sort randomizes order among equal
    /// weights reproducibly.
    fn ranked_candidates(&mut self, k: usize) -> Vec<Candidate> {
        let cell = self.q_from[k];
        let heading = self.orientations[k];

        // Disjoint field borrows: the catalog and grid are read-only while
        // the oracle advances its BFS.
        let grid = &self.grid;
        let catalog = &self.catalog;
        let oracle = &mut self.dist[k];
        let alpha = grid.size() as u64 * 10;

        let mut candidates: Vec<Candidate> = Vec::with_capacity(catalog.len());
        let mut slot_by_path: FxHashMap<Vec<Cell>, usize> = FxHashMap::default();

        for (op_idx, op) in catalog.ops().iter().enumerate() {
            let Some(traj) = trace(grid, cell, heading, op) else {
                continue;
            };
            let h = oracle.get(grid, traj.terminal());
            if h == UNREACHED {
                continue;
            }
            let weight = u64::from(h) * alpha + beta(op);

            match slot_by_path.get(&traj.cells) {
                Some(&slot) => {
                    if weight < candidates[slot].weight {
                        candidates[slot] = Candidate { op_idx, path: traj.cells, weight };
                    }
                }
                None => {
                    slot_by_path.insert(traj.cells.clone(), candidates.len());
                    candidates.push(Candidate { op_idx, path: traj.cells, weight });
                }
            }
        }

        self.rng.shuffle(&mut candidates);
        candidates.sort_by_key(|c| c.weight); // stable: keeps shuffled order on ties
        candidates
    }

    // ── Recursive selection ───────────────────────────────────────────────

    /// Try to commit an operation for agent `k` under inherited priority `p`.
    ///
    /// On success the committed operation and trajectory sit in
    /// `ops[k]`/`paths[k]` with their reservation in place.  On failure the
    /// inherited fallback sits there *unreserved* — the caller decides
    /// whether to re-reserve it (top level) or overwrite it (rollback).
    fn select(&mut self, k: usize, p: f64) -> bool {
        let candidates = self.ranked_candidates(k);
        let id = AgentId(k as u32);

        self.visit_count[k] += 1;
        self.hit[k] = true;

        for cand in &candidates {
            let conflicts = self.reserved.conflicts(id, &cand.path);

            if conflicts.is_empty() {
                self.ops[k] = self.catalog.ops()[cand.op_idx].clone();
                self.paths[k] = cand.path.clone();
                self.reserved.reserve(id, &cand.path);
                self.hit[k] = false;
                return true;
            }

            // Pushing more than one agent at once is not attempted.
            if conflicts.len() > 1 {
                continue;
            }

            let l = conflicts[0].index();
            if self.hit[l] || self.visit_count[l] >= self.max_revisits || self.priorities[l] >= p {
                continue;
            }

            // Tentatively claim the candidate and push `l` out of the way.
            let saved_op = self.ops[l].clone();
            let saved_path = std::mem::take(&mut self.paths[l]);
            self.reserved.unreserve(AgentId(l as u32), &saved_path);
            self.ops[k] = self.catalog.ops()[cand.op_idx].clone();
            self.paths[k] = cand.path.clone();
            self.reserved.reserve(id, &cand.path);

            if self.select(l, p) {
                self.hit[k] = false;
                return true;
            }

            // Push failed — restore the exact pre-push state.
            self.reserved.unreserve(id, &cand.path);
            self.ops[l] = saved_op;
            self.reserved.reserve(AgentId(l as u32), &saved_path);
            self.paths[l] = saved_path;
        }

        // Exhausted: fall back to the inherited operation (or hold position
        // when it no longer traces).  Not reserved here — see contract above.
        self.ops[k] = self.inherited[k].clone();
        self.paths[k] = match trace(&self.grid, self.q_from[k], self.orientations[k], &self.inherited[k]) {
            Some(traj) => traj.cells,
            None => Trajectory::hold(self.q_from[k], self.orientations[k], self.op_len).cells,
        };
        self.hit[k] = false;
        false
    }
}

/// Per-action tie-break penalty summed over an operation: forwards are free,
/// rotations cost 1, waits cost 2.
fn beta(op: &Operation) -> u64 {
    op.actions()
        .iter()
        .map(|a| match a {
            Action::Forward => 0,
            Action::TurnCw | Action::TurnCcw => 1,
            Action::Wait => 2,
        })
        .sum()
}
