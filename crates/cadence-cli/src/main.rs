//! Cadence CLI - run phase scheduler scenarios from the command line

mod commands;
mod demo;
mod scenario;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{config, init, simulate};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Deferred-mutation update scheduler simulator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example scenario file
    Init {
        /// Path of the scenario file to create
        #[arg(default_value = "scenario.toml")]
        path: String,
    },

    /// Run a scenario for a number of frames
    Simulate {
        /// Path to scenario file
        scenario: String,

        /// Number of frames to run
        #[arg(long, default_value = "600")]
        frames: u64,

        /// Seconds per frame
        #[arg(long, default_value = "0.016", value_parser = parse_dt)]
        dt: f64,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Print the default runtime configuration
    Config,
}

fn parse_dt(s: &str) -> Result<f64, String> {
    let dt: f64 = s.trim().parse().map_err(|e| format!("invalid dt: {}", e))?;
    if !dt.is_finite() || dt < 0.0 {
        return Err(format!("dt must be a non-negative number, got {}", s));
    }
    Ok(dt)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("cadence=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => init::run(&path),
        Commands::Simulate {
            scenario,
            frames,
            dt,
            format,
        } => simulate::run(simulate::SimulateArgs {
            scenario,
            frames,
            dt,
            format,
        }),
        Commands::Config => config::run(),
    }
}
