mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::helpers::ConfigArgs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "eyebreak")]
#[command(about = "Reminds you to take breaks based on whether your eyes are on the screen", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Monitor live detector verdicts read from stdin (one per line)
    Run {
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Replay a recorded trace of `<seconds> <verdict>` lines
    Replay {
        /// Trace file
        file: PathBuf,
        #[command(flatten)]
        config: ConfigArgs,
    },
    /// Show the effective configuration
    Config {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .target(env_logger::Target::Stderr)
        .init();

    match cli.command {
        Commands::Run { config } => commands::run::run_command(&config).await,
        Commands::Replay { file, config } => commands::replay::replay_command(&file, &config),
        Commands::Config { config } => commands::config::show_config(&config),
    }
}
