//! Unit and end-to-end tests for mapd-dispatch.

#[cfg(test)]
mod helpers {
    use mapd_core::{Cell, Grid};

    /// The benchmark warehouse: 20×20 open floor, five pickup stations on the
    /// west wall and five delivery stations on the east wall.
    pub fn warehouse() -> (Grid, Vec<Cell>, Vec<Cell>) {
        let grid = Grid::open(20, 20);
        let pickups: Vec<Cell> = [1, 5, 9, 13, 17].iter().map(|&y| Cell::new(y, 0)).collect();
        let deliveries: Vec<Cell> = [1, 5, 9, 13, 17].iter().map(|&y| Cell::new(y, 19)).collect();
        (grid, pickups, deliveries)
    }
}

// ── Construction ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod construction {
    use super::helpers::warehouse;
    use crate::{DispatchConfig, DispatchError, Dispatcher, JobState};
    use mapd_core::{Cell, Grid};

    #[test]
    fn fleet_starts_idle_and_parked() {
        let (grid, pickups, deliveries) = warehouse();
        let d = Dispatcher::new(grid, pickups, deliveries, &DispatchConfig::new(8, 0.2, 42))
            .unwrap();

        assert_eq!(d.num_agents(), 8);
        assert_eq!(d.timestep(), 0);
        assert!(d.pending_tasks().is_empty());
        assert!(d.active_tasks().is_empty());
        assert!(d.completed_tasks().is_empty());
        for job in d.agents() {
            assert_eq!(job.state, JobState::Idle);
            assert!(job.task.is_none());
        }
        // Parked: each agent's goal is its own start.
        assert_eq!(d.planner().goals(), d.current_config());
    }

    #[test]
    fn starts_avoid_stations_and_each_other() {
        let (grid, pickups, deliveries) = warehouse();
        let d = Dispatcher::new(
            grid,
            pickups.clone(),
            deliveries.clone(),
            &DispatchConfig::new(30, 0.2, 7),
        )
        .unwrap();

        let config = d.current_config();
        for (i, &cell) in config.iter().enumerate() {
            assert!(!pickups.contains(&cell) && !deliveries.contains(&cell));
            for &other in &config[i + 1..] {
                assert_ne!(cell, other);
            }
        }
    }

    #[test]
    fn rejects_blocked_station() {
        let grid = Grid::with_obstacles(5, 5, &[Cell::new(2, 0)]);
        let err = Dispatcher::new(
            grid,
            vec![Cell::new(2, 0)],
            vec![Cell::new(2, 4)],
            &DispatchConfig::new(2, 0.2, 0),
        );
        assert!(matches!(err, Err(DispatchError::BlockedStation { .. })));
    }

    #[test]
    fn rejects_missing_stations() {
        let err = Dispatcher::new(
            Grid::open(5, 5),
            vec![],
            vec![Cell::new(2, 4)],
            &DispatchConfig::new(2, 0.2, 0),
        );
        assert!(matches!(err, Err(DispatchError::NoStations)));
    }

    #[test]
    fn rejects_oversized_fleet() {
        // 3×3 grid with two stations leaves 7 free cells.
        let err = Dispatcher::new(
            Grid::open(3, 3),
            vec![Cell::new(0, 0)],
            vec![Cell::new(2, 2)],
            &DispatchConfig::new(8, 0.2, 0),
        );
        assert!(matches!(err, Err(DispatchError::TooManyAgents { available: 7, .. })));
    }

    #[test]
    fn rejects_negative_frequency() {
        let (grid, pickups, deliveries) = warehouse();
        let err = Dispatcher::new(grid, pickups, deliveries, &DispatchConfig::new(2, -1.0, 0));
        assert!(matches!(err, Err(DispatchError::InvalidTaskFrequency(_))));
    }
}

// ── Task stream determinism ───────────────────────────────────────────────────

#[cfg(test)]
mod determinism {
    use super::helpers::warehouse;
    use crate::{DispatchConfig, Dispatcher, Task};
    use mapd_core::Cell;

    /// Every task the dispatcher has ever seen, in creation order.
    fn all_tasks(d: &Dispatcher) -> Vec<Task> {
        let mut tasks: Vec<Task> = d
            .pending_tasks()
            .iter()
            .chain(d.active_tasks())
            .chain(d.completed_tasks())
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.task_id);
        tasks
    }

    /// Seed 42, frequency 2, 100 ticks: the generated task list is a pure
    /// function of the seed — reruns reproduce it bit for bit.
    #[test]
    fn poisson_task_stream_reproduces() {
        let (grid, pickups, deliveries) = warehouse();
        let config = DispatchConfig::new(8, 2.0, 42);

        let mut a = Dispatcher::new(grid.clone(), pickups.clone(), deliveries.clone(), &config)
            .unwrap();
        let mut b = Dispatcher::new(grid, pickups, deliveries, &config).unwrap();
        for _ in 0..100 {
            a.tick();
            b.tick();
        }

        let tasks_a = all_tasks(&a);
        let tasks_b = all_tasks(&b);
        assert!(!tasks_a.is_empty());
        assert_eq!(tasks_a.len(), tasks_b.len());
        for (ta, tb) in tasks_a.iter().zip(&tasks_b) {
            assert_eq!((ta.pickup, ta.delivery, ta.created_at), (tb.pickup, tb.delivery, tb.created_at));
        }
        assert_eq!(a.current_config(), b.current_config());
    }

    #[test]
    fn zero_frequency_generates_nothing_and_fleet_parks() {
        let (grid, pickups, deliveries) = warehouse();
        let mut d =
            Dispatcher::new(grid, pickups, deliveries, &DispatchConfig::new(4, 0.0, 1)).unwrap();
        let parked: Vec<Cell> = d.current_config().to_vec();

        for _ in 0..20 {
            let config = d.tick();
            assert_eq!(config, parked);
        }
        assert!(d.pending_tasks().is_empty());
        assert_eq!(d.timestep(), 20);
    }
}

// ── Lifelong warehouse run ────────────────────────────────────────────────────

#[cfg(test)]
mod lifelong {
    use super::helpers::warehouse;
    use crate::{DispatchConfig, Dispatcher, JobState};
    use mapd_core::{Cell, Configuration, Grid, is_valid_plan};

    /// The benchmark instance: 1000 ticks of seed-42 traffic.  Completions
    /// only ever grow, job-state invariants hold throughout, and the emitted
    /// configuration stream validates end to end.
    #[test]
    fn warehouse_thousand_ticks() {
        let (grid, pickups, deliveries) = warehouse();
        let mut d = Dispatcher::new(
            grid.clone(),
            pickups.clone(),
            deliveries.clone(),
            &DispatchConfig::new(8, 0.2, 42),
        )
        .unwrap();

        let mut stream: Vec<Configuration> = vec![d.current_config().to_vec()];
        let mut completed_so_far = 0usize;

        for _ in 0..1000 {
            stream.push(d.tick());

            assert!(d.completed_tasks().len() >= completed_so_far);
            completed_so_far = d.completed_tasks().len();

            for job in d.agents() {
                assert_eq!(job.state.is_idle(), job.task.is_none());
            }
        }

        assert!(completed_so_far > 0, "no task completed in 1000 ticks");
        for task in d.completed_tasks() {
            let picked = task.picked_up_at.unwrap();
            let delivered = task.delivered_at.unwrap();
            assert!(task.created_at <= picked && picked <= delivered);
            assert!(task.assigned_to.is_some());
            assert!(pickups.contains(&task.pickup));
            assert!(deliveries.contains(&task.delivery));
        }

        let starts = stream[0].clone();
        let ends = stream[stream.len() - 1].clone();
        assert!(is_valid_plan(&grid, &starts, &ends, &stream));
    }

    /// A pickup sealed behind walls is never assigned: the task stays
    /// pending, nobody moves toward it, and nothing crashes.
    #[test]
    fn unreachable_pickup_stays_pending() {
        // Seal (2,0) behind a wall; the rest of the 6×6 floor stays open.
        let grid = Grid::with_obstacles(
            6,
            6,
            &[Cell::new(1, 0), Cell::new(1, 1), Cell::new(2, 1), Cell::new(3, 1), Cell::new(3, 0)],
        );
        let mut d = Dispatcher::new(
            grid,
            vec![Cell::new(2, 0)],
            vec![Cell::new(2, 5)],
            &DispatchConfig::new(2, 1.0, 3),
        )
        .unwrap();

        for _ in 0..50 {
            d.tick();
        }

        assert!(!d.pending_tasks().is_empty());
        assert!(d.active_tasks().is_empty());
        assert!(d.completed_tasks().is_empty());
        for task in d.pending_tasks() {
            assert!(task.assigned_to.is_none());
        }
        for job in d.agents() {
            assert_eq!(job.state, JobState::Idle);
        }
    }

    /// Dense traffic shakes out the full pickup → delivery → idle cycle.
    #[test]
    fn tasks_flow_through_the_state_machine() {
        let (grid, pickups, deliveries) = warehouse();
        let mut d = Dispatcher::new(
            grid,
            pickups,
            deliveries,
            &DispatchConfig::new(6, 1.0, 11),
        )
        .unwrap();

        for _ in 0..300 {
            d.tick();
        }

        assert!(!d.completed_tasks().is_empty());
        // Active tasks are always assigned and stamped consistently.
        for task in d.active_tasks() {
            assert!(task.assigned_to.is_some());
            assert!(task.delivered_at.is_none());
        }
        // Agents en route to a delivery have their goal on the east wall.
        for (i, job) in d.agents().iter().enumerate() {
            if job.state == JobState::ToDelivery {
                assert_eq!(d.planner().goals()[i].x, 19);
            }
        }
    }
}
