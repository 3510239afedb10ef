//! Swarm demo — headless particle simulation driven by the spatial grid.
//!
//! Runs `clear → add_object × N → find × N` every tick and logs broad-phase
//! statistics.
//!
//! ```text
//! swarm-demo [config.json]
//!
//! SWARM_PARTICLES  particle count (default 20000)
//! SWARM_TICKS      ticks to run   (default 600)
//! SWARM_SEED       rng seed       (default 1)
//! RUST_LOG         log filter     (e.g. info, debug)
//! ```

mod state;

use log::{info, warn};
use std::time::{Duration, Instant};
use swarm_grid::GridConfig;

use state::SimState;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            warn!("Ignoring {key}={raw:?}: not a valid value");
            default
        }),
        Err(_) => default,
    }
}

/// Mean duration of one tick; zero ticks count as one.
fn per_tick(elapsed: Duration, ticks: u64) -> Duration {
    elapsed.div_f64(ticks.max(1) as f64)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = match std::env::args().nth(1) {
        Some(path) => GridConfig::load(&path)?,
        None => {
            info!("No config file given, using defaults");
            GridConfig::default()
        }
    };
    let particles: usize = env_or("SWARM_PARTICLES", 20_000);
    let ticks: u64 = env_or("SWARM_TICKS", 600);
    let seed: u64 = env_or("SWARM_SEED", 1);

    info!("Starting swarm demo: {particles} particles, {ticks} ticks");
    let mut sim = SimState::new(&config, particles, seed)?;

    let started = Instant::now();
    let mut window = Instant::now();
    let mut dropped_total = 0usize;

    for tick in 1..=ticks {
        let stats = sim.step()?;
        dropped_total += stats.dropped;

        if stats.dropped > 0 {
            log::debug!("Tick {tick}: {} inserts dropped by full cells", stats.dropped);
        }
        if tick % 60 == 0 {
            let mean = per_tick(window.elapsed(), 60);
            window = Instant::now();
            info!(
                "Tick {tick}: {mean:?}/tick, {} candidates, {} close pairs, {} cells occupied, largest cell {}",
                stats.candidates,
                stats.close_pairs,
                stats.occupied_cells,
                stats.largest_cell
            );
        }
    }

    let elapsed = started.elapsed();
    info!(
        "Finished {ticks} ticks in {elapsed:?} ({:?}/tick)",
        per_tick(elapsed, ticks)
    );
    if dropped_total > 0 {
        warn!(
            "{dropped_total} inserts were dropped; raise cell_capacity (currently {})",
            config.cell_capacity
        );
    }
    Ok(())
}
