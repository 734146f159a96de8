//! smartcab CLI - Train and test a tabular driving agent in a grid world
//!
//! This CLI provides:
//! - Simulation runs (training trials until exploration fades, then testing)
//! - A listing of the agent's state space

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "smartcab")]
#[command(version, about = "Tabular learning agent for a grid-world driving simulation", long_about = None)]
struct Cli {
    /// Log debug output (RUST_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the agent, then run testing trials
    Run(Box<smartcab::cli::commands::run::RunArgs>),

    /// List every driving state
    States(smartcab::cli::commands::states::StatesArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "smartcab=debug"
        } else {
            "smartcab=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    match cli.command {
        Commands::Run(args) => smartcab::cli::commands::run::execute(*args),
        Commands::States(args) => smartcab::cli::commands::states::execute(args),
    }
}
