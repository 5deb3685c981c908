//! warehouse — lifelong MAPD demo for the rust_mapd engine.
//!
//! Runs a 20×20 warehouse floor with pickup stations along the west wall and
//! delivery stations along the east wall, streams Poisson task traffic at a
//! fleet of 8 agents for 1000 ticks, validates the emitted configuration
//! stream, and writes the visualizer plan plus a task-log CSV to `out/`.

use std::path::Path;

use anyhow::{Result, ensure};

use mapd_core::{Cell, Configuration, Grid, is_valid_plan};
use mapd_dispatch::{DispatchConfig, Dispatcher};
use mapd_io::{save_plan, save_task_log};

// ── Constants ─────────────────────────────────────────────────────────────────

const HEIGHT: u32 = 20;
const WIDTH: u32 = 20;
const AGENT_COUNT: usize = 8;
const TASK_FREQUENCY: f64 = 0.2;
const SEED: u64 = 42;
const TICKS: u64 = 1_000;
/// Rows carrying a pickup station (west wall) and a delivery station (east
/// wall).
const STATION_ROWS: [i32; 5] = [1, 5, 9, 13, 17];

fn main() -> Result<()> {
    // ── Instance ──────────────────────────────────────────────────────────
    let grid = Grid::open(HEIGHT, WIDTH);
    let pickups: Vec<Cell> = STATION_ROWS.iter().map(|&y| Cell::new(y, 0)).collect();
    let deliveries: Vec<Cell> =
        STATION_ROWS.iter().map(|&y| Cell::new(y, WIDTH as i32 - 1)).collect();

    let config = DispatchConfig::new(AGENT_COUNT, TASK_FREQUENCY, SEED);
    let mut dispatcher = Dispatcher::new(grid.clone(), pickups, deliveries, &config)?;

    println!(
        "warehouse {HEIGHT}x{WIDTH}, {AGENT_COUNT} agents, lambda {TASK_FREQUENCY}, seed {SEED}"
    );

    // ── Simulation ────────────────────────────────────────────────────────
    let mut stream: Vec<Configuration> = vec![dispatcher.current_config().to_vec()];
    for _ in 0..TICKS {
        stream.push(dispatcher.tick());
    }

    // ── Feasibility of the whole emitted stream ───────────────────────────
    let starts = stream[0].clone();
    let ends = stream[stream.len() - 1].clone();
    ensure!(
        is_valid_plan(&grid, &starts, &ends, &stream),
        "emitted configuration stream failed validation"
    );

    // ── Summary ───────────────────────────────────────────────────────────
    let completed = dispatcher.completed_tasks();
    let generated =
        dispatcher.pending_tasks().len() + dispatcher.active_tasks().len() + completed.len();
    println!("ticks:     {TICKS}");
    println!("generated: {generated} tasks");
    println!(
        "completed: {} ({} pending, {} active)",
        completed.len(),
        dispatcher.pending_tasks().len(),
        dispatcher.active_tasks().len()
    );
    let service_times: Vec<u64> = completed.iter().filter_map(|t| t.service_time()).collect();
    if !service_times.is_empty() {
        let mean = service_times.iter().sum::<u64>() as f64 / service_times.len() as f64;
        println!("mean service time: {mean:.1} ticks");
    }

    // ── Artifacts ─────────────────────────────────────────────────────────
    let out = Path::new("out");
    std::fs::create_dir_all(out)?;
    save_plan(&out.join("plan.txt"), &stream)?;
    save_task_log(&out.join("tasks.csv"), completed)?;
    println!("wrote out/plan.txt and out/tasks.csv");

    Ok(())
}
