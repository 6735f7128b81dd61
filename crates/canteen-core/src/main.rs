//! Canteen Simulation
//!
//! Runs a facility against the headless host and writes the event stream,
//! a final snapshot and run statistics.

use clap::Parser;
use std::path::{Path, PathBuf};

use canteen_core::{
    write_snapshot, write_stats, CanteenConfig, EventLogger, Facility, HeadlessWorld,
    DEFAULT_CONFIG_PATH,
};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "canteen")]
#[command(about = "Headless canteen customer simulation")]
struct Args {
    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Configuration file (defaults to canteen.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 7200)]
    ticks: u64,

    /// Seconds per tick
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Extra arrivals queued before the first tick
    #[arg(long, default_value_t = 0)]
    customers: u32,

    /// Seconds the kitchen takes to serve an order
    #[arg(long, default_value_t = 8.0)]
    serve_delay: f32,

    /// Run without a kitchen; nobody gets served
    #[arg(long)]
    no_kitchen: bool,

    /// Write events as JSONL to this file
    #[arg(long)]
    events: Option<PathBuf>,

    /// Write the final facility snapshot to this file
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Write run statistics to this file
    #[arg(long)]
    stats: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> Result<CanteenConfig, canteen_core::ConfigError> {
    match path {
        Some(path) => CanteenConfig::from_file(path),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            CanteenConfig::from_file(Path::new(DEFAULT_CONFIG_PATH))
        }
        None => Ok(CanteenConfig::default()),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    println!("Canteen Simulation");
    println!("==================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {} x {:.4}s", args.ticks, args.dt);
    println!();

    let mut host = HeadlessWorld::from_layout(&config.layout);
    if !args.no_kitchen {
        host = host.with_kitchen(args.serve_delay);
    }
    let mut facility = Facility::new(&config, host, args.seed)?;

    if let Some(path) = &args.events {
        facility.install_logger(EventLogger::new(path)?);
    }
    for _ in 0..args.customers {
        if facility.spawn_customer().is_none() {
            eprintln!("Warning: arrival queue full, skipping remaining extra customers");
            break;
        }
    }

    for tick in 0..args.ticks {
        facility.step(args.dt);
        facility.world_port_mut().integrate(args.dt);

        if tick > 0 && tick % 600 == 0 {
            let outcomes = facility.outcomes();
            println!(
                "[Tick {:>6}] inside: {:>2}, queued: {:>2}, satisfied: {}, gave up: {}",
                tick,
                facility.customers().len(),
                facility.queue().len(),
                outcomes.successes,
                outcomes.failures
            );
        }
    }

    if let Err(e) = facility.flush_events() {
        eprintln!("Warning: Could not write events: {}", e);
    }
    if let Some(path) = &args.snapshot {
        let snapshot = facility.snapshot();
        if let Err(e) = write_snapshot(&snapshot, path) {
            eprintln!("Warning: Could not write snapshot: {}", e);
        } else {
            println!("Wrote {}", path.display());
        }
    }

    let stats = facility.stats();
    if let Some(path) = &args.stats {
        if let Err(e) = write_stats(&stats, path) {
            eprintln!("Warning: Could not write stats: {}", e);
        } else {
            println!("Wrote {}", path.display());
        }
    }

    println!();
    println!(
        "Simulation complete. {} satisfied, {} gave up, {} events over {:.1}s.",
        stats.outcomes.successes, stats.outcomes.failures, stats.total_events, stats.elapsed_seconds
    );
    println!("Kitchen served {} dishes.", facility.world_port().served());
    Ok(())
}
