//! hydro-dispatch CLI
//!
//! Runs the fleet simulation until Ctrl-C.

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

use hydro_dispatch::config::{FleetConfig, UnitCounts, DEFAULT_TICK_INTERVAL_MS};
use hydro_dispatch::generation::{GenerationBand, MAX_GENERATION, MIN_GENERATION};
use hydro_dispatch::logging::{init_logging, DEFAULT_LOG_LEVEL};
use hydro_dispatch::models::RainProbabilities;
use hydro_dispatch::simulation::Simulation;

#[derive(Parser)]
#[command(name = "hydro-dispatch")]
#[command(about = "Simulate a rain-fed hydroelectric fleet under band dispatch", long_about = None)]
struct Args {
    /// Probability of no rain on a draw
    prob_a: f64,

    /// Probability of an aguacero (+2.0 for 10 ticks)
    prob_b: f64,

    /// Probability of a diluvio (+4.0 for 5 ticks)
    prob_c: f64,

    /// Number of H1 units (15.0 capacity)
    h1: usize,

    /// Number of H2 units (5.0 capacity)
    h2: usize,

    /// Number of H3 units (2.0 capacity)
    h3: usize,

    /// Milliseconds between unit ticks
    #[arg(long, default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Seed for reproducible rain
    #[arg(long)]
    seed: Option<u64>,

    /// Lower bound of the generation band
    #[arg(long, default_value_t = MIN_GENERATION)]
    min_generation: f64,

    /// Upper bound of the generation band
    #[arg(long, default_value_t = MAX_GENERATION)]
    max_generation: f64,

    /// Log level used when RUST_LOG is unset
    #[arg(long, default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

impl Args {
    fn config(&self) -> FleetConfig {
        let config = FleetConfig::new(
            RainProbabilities::new(self.prob_a, self.prob_b, self.prob_c),
            UnitCounts::new(self.h1, self.h2, self.h3),
        )
        .with_band(GenerationBand::new(self.min_generation, self.max_generation))
        .with_tick_interval_ms(self.tick_ms);

        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("Error initializing logging: {}", e);
    }

    let sim = match Simulation::new(args.config()) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let stop = sim.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Stop requested");
        }
        stop.stop();
    });

    match sim.run().await {
        Ok(summary) => {
            info!(
                passes = summary.stats.dispatch_passes,
                fallbacks = summary.stats.fallback_passes,
                infeasible = summary.stats.infeasible_passes,
                resorts = summary.stats.resorts,
                total = summary.kpi.total_generation,
                active = summary.kpi.active_units,
                "Final fleet state"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Simulation failed");
            ExitCode::FAILURE
        }
    }
}
