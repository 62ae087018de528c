//! # Flowgate Bridge Binary
//!
//! Mirrors digital inputs onto digital outputs through the label flow gate.
//!
//! # Usage
//!
//! ```bash
//! # Run with the configured driver
//! flowgate --config config/flowgate.toml
//!
//! # Force the simulation driver, verbose logging
//! flowgate --config config/flowgate.toml -s -v
//!
//! # JSON logs
//! flowgate --config config/flowgate.toml --json
//! ```

use clap::Parser;
use flowgate_common::config::{ConfigLoader, LogLevel};
use flowgate_common::consts::DEFAULT_CONFIG_PATH;
use flowgate_common::gpio::config::FlowgateConfig;
use flowgate_gpio::bridge::{Bridge, build_context};
use flowgate_gpio::driver_registry::DriverRegistry;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Flowgate - label-checked GPIO bridge
#[derive(Parser, Debug)]
#[command(name = "flowgate")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Mirror GPIO inputs onto outputs through an information-flow policy")]
#[command(long_about = None)]
struct Args {
    /// Path to the service configuration (flowgate.toml)
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Use this driver instead of the configured one
    #[arg(short, long)]
    driver: Option<String>,

    /// Force simulation driver
    #[arg(short = 's', long, conflicts_with = "driver")]
    simulate: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("Flowgate startup failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = FlowgateConfig::load(&args.config);
    let level = match &config {
        Ok(config) => config.shared.log_level,
        Err(_) => LogLevel::Info,
    };
    setup_tracing(&args, level);

    info!("Flowgate v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Loading configuration from {:?}", args.config);
    let config = config?;
    config.validate()?;

    let driver_override = if args.simulate {
        info!("Simulation mode enabled");
        Some("simulation")
    } else {
        args.driver.as_deref()
    };

    let registry = DriverRegistry::with_builtin_drivers();
    let ctx = build_context(&config.gpio, &registry, driver_override)?;
    let mut bridge = Bridge::from_config(&config, &ctx)?;

    let running = bridge.running_flag();
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    bridge.run();
    bridge.shutdown();

    let stats = bridge.stats();
    info!(
        "Flowgate shutdown complete ({} forwarded, {} denied, {} failed)",
        stats.forwarded, stats.violations, stats.failures
    );
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments and configured level.
fn setup_tracing(args: &Args, level: LogLevel) {
    let directive = if args.verbose {
        "debug"
    } else {
        level.as_directive()
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
