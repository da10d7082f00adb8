//! Ritardo CLI - offline driver for the ritardo delay engine.

mod commands;
mod preset;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ritardo")]
#[command(author, version, about = "Tempo-synchronizable feedback delay", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a WAV file through the delay
    Process(commands::process::ProcessArgs),

    /// Print the engine's parameters and modes
    Info(commands::info::InfoArgs),

    /// Write a preset file with the default parameters
    Preset(commands::preset_cmd::PresetArgs),
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Process(args) => commands::process::run(args),
        Commands::Info(args) => commands::info::run(args),
        Commands::Preset(args) => commands::preset_cmd::run(args),
    }
}
