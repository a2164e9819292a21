//! Planwatch CLI - Command line interface for the price monitor
//!
//! Periodically scrapes a tariff page, tracks price changes over time and
//! renders notification messages from the recorded changes.

mod commands;
mod fetch;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use planwatch_core::Config;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use commands::{MessageArgs, MonitorArgs, StatusArgs};

/// Planwatch: mobile-plan price monitoring
#[derive(Parser, Debug)]
#[command(name = "planwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to a config file (instead of ~/.config/planwatch/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Tariff page to monitor (overrides config and env)
    #[arg(long, global = true, env = "PLANWATCH_BASE_URL")]
    base_url: Option<String>,

    /// Data directory for history and snapshot files (overrides config and env)
    #[arg(long, global = true, env = "PLANWATCH_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show version information
    Version,

    /// Run one monitoring pass: fetch, extract, diff and persist
    #[command(visible_alias = "m")]
    Monitor(MonitorArgs),

    /// Render a notification message from a change-log file
    #[command(visible_alias = "msg")]
    Message(MessageArgs),

    /// Show current prices and history summary
    Status(StatusArgs),

    /// Show current configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    if cli.verbose {
        tracing::info!("Verbose mode enabled");
    }

    // Load configuration with overrides
    let config = Config::load_with_overrides(
        cli.config.clone(),
        cli.base_url.clone(),
        cli.data_dir.clone(),
    )?;

    if cli.verbose {
        tracing::info!(
            base_url = %config.monitor.base_url,
            data_dir = %config.storage.data_dir.display(),
            "Configuration loaded"
        );
    }

    match cli.command {
        Some(Commands::Version) => {
            println!("planwatch {}", env!("CARGO_PKG_VERSION"));
        }
        Some(Commands::Monitor(args)) => {
            args.execute(&config).await?;
        }
        Some(Commands::Message(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Status(args)) => {
            args.execute(&config)?;
        }
        Some(Commands::Config) => {
            println!("Planwatch Configuration");
            println!("=======================");
            println!();
            println!("Monitor Settings:");
            println!("  base_url: {}", config.monitor.base_url);
            println!("  timeout_secs: {}", config.monitor.timeout_secs);
            println!();
            println!("Storage Settings:");
            println!("  data_dir: {}", config.storage.data_dir.display());
            println!("  history_filename: {}", config.storage.history_filename);
            println!("  latest_filename: {}", config.storage.latest_filename);
            println!();
            if let Some(path) = Config::default_config_path() {
                println!("Config file: {}", path.display());
                if path.exists() {
                    println!("  (exists)");
                } else {
                    println!("  (not found - using defaults)");
                }
            }
        }
        None => {
            println!("Planwatch - mobile-plan price monitoring");
            println!();
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
