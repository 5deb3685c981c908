//! oneshot — one-shot MAPF benchmark runner.
//!
//! Usage: `oneshot <map-file> <scen-file> <num-agents> [max-timestep]`
//!
//! Loads a MovingAI instance, plans with the default EPIBT tuning, reports
//! feasibility and makespan, and writes the visualizer plan to `plan.txt`.

use std::path::Path;

use anyhow::{Context, Result, bail};

use mapd_core::is_valid_plan;
use mapd_io::{load_map, load_scenario, save_plan};
use mapd_planner::{Planner, PlannerConfig};

const DEFAULT_MAX_TIMESTEP: usize = 1_000;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let [map_path, scen_path, num_agents, rest @ ..] = args.as_slice() else {
        bail!("usage: oneshot <map-file> <scen-file> <num-agents> [max-timestep]");
    };
    let num_agents: usize = num_agents.parse().context("num-agents must be an integer")?;
    let max_timestep: usize = match rest {
        [] => DEFAULT_MAX_TIMESTEP,
        [t, ..] => t.parse().context("max-timestep must be an integer")?,
    };

    let grid = load_map(Path::new(map_path)).context("loading map")?;
    let (starts, goals) =
        load_scenario(Path::new(scen_path), num_agents).context("loading scenario")?;

    let mut planner =
        Planner::new(grid.clone(), starts.clone(), goals.clone(), &PlannerConfig::default())?;
    let plan = planner.run(max_timestep);

    let solved = is_valid_plan(&grid, &starts, &goals, &plan);
    println!("solved: {solved}");
    println!("makespan: {}", plan.len() - 1);

    save_plan(Path::new("plan.txt"), &plan)?;
    println!("wrote plan.txt");

    Ok(())
}
