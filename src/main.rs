//! Grid Physics headless runner
//!
//! Spawns a random scene, runs it for a fixed number of ticks and prints the
//! final particle snapshot as JSON. Drawing is left to whatever consumes it.
//!
//! Usage: `grid-physics [config.json|-] [particles] [ticks] [seed]`

use std::process::ExitCode;
use std::str::FromStr;

use grid_physics::sim::{RandomSpawn, Simulation, TickStats};
use grid_physics::{PhysicsError, Result, SimConfig};

const DEFAULT_PARTICLES: usize = 100;
const DEFAULT_TICKS: u32 = 1000;
const DEFAULT_SEED: u64 = 12345;

struct Args {
    config: Option<String>,
    particles: usize,
    ticks: u32,
    seed: u64,
}

fn parse_or<T: FromStr>(arg: Option<String>, name: &str, default: T) -> Result<T> {
    match arg {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| PhysicsError::InvalidConfiguration(format!("bad {name}: {s}"))),
    }
}

fn parse_args() -> Result<Args> {
    let mut args = std::env::args().skip(1);
    let config = args.next().filter(|s| s != "-");
    Ok(Args {
        config,
        particles: parse_or(args.next(), "particle count", DEFAULT_PARTICLES)?,
        ticks: parse_or(args.next(), "tick count", DEFAULT_TICKS)?,
        seed: parse_or(args.next(), "seed", DEFAULT_SEED)?,
    })
}

fn run() -> Result<()> {
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    log::debug!("Config:\n{}", config.to_json_pretty()?);

    let dt = config.max_substep;
    let mut sim = Simulation::new(config)?;
    sim.spawn_random(args.particles, args.seed, RandomSpawn::default())?;

    let mut totals = TickStats::default();
    for _ in 0..args.ticks {
        let stats = sim.step(dt)?;
        totals.boundary_contacts += stats.boundary_contacts;
        totals.candidate_pairs += stats.candidate_pairs;
        totals.resolved_pairs += stats.resolved_pairs;
        totals.degenerate_pairs += stats.degenerate_pairs;
    }
    sim.check_grid_consistency()?;

    log::info!(
        "Ran {} ticks with {} particles: {} boundary contacts, {} of {} candidate pairs resolved, {} degenerate",
        sim.tick_count(),
        sim.particles().len(),
        totals.boundary_contacts,
        totals.resolved_pairs,
        totals.candidate_pairs,
        totals.degenerate_pairs
    );
    log::info!(
        "Final kinetic energy {:.3}, {} occupied cells",
        sim.kinetic_energy(),
        sim.grid().occupied_cells()
    );

    println!("{}", serde_json::to_string_pretty(&sim.snapshot())?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Grid Physics (headless) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
