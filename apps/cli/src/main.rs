//! Atelier CLI - train simulated image classifiers and manage their stored
//! artifact bundles.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(
    name = "atelier",
    version,
    about = "Train simulated image classifiers and manage their artifact bundles"
)]
struct Args {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    /// Model store root directory
    #[arg(short, long, default_value = "models", global = true)]
    store: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Train a model from a directory of class subfolders
    Train {
        /// Dataset root: one subdirectory of images per class
        data: PathBuf,

        /// Model name recorded in the bundle metadata
        #[arg(short, long)]
        name: Option<String>,

        /// Seed for reproducible metrics and weights
        #[arg(long)]
        seed: Option<u64>,

        /// TOML file overriding validation thresholds
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// List stored models, newest first
    List,

    /// Export a stored model as a downloadable archive
    Export {
        id: String,

        /// Output path (defaults to <id>.zip)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a stored model
    Delete { id: String },

    /// Show storage statistics
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level)?;

    match args.command {
        Command::Train { data, name, seed, config } => {
            commands::train(&args.store, &data, name, seed, config.as_deref()).await
        }
        Command::List => commands::list(&args.store),
        Command::Export { id, output } => commands::export(&args.store, &id, output),
        Command::Delete { id } => commands::delete(&args.store, &id),
        Command::Stats => commands::stats(&args.store),
    }
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let level = level
        .parse::<Level>()
        .map_err(|_| anyhow::anyhow!("invalid log level: {level}"))?;
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
