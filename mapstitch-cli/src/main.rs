//! MapStitch CLI - Command-line interface
//!
//! - `mapstitch stitch`: write a stitched image for an extent at a zoom
//! - `mapstitch serve`: serve stitched images over HTTP

mod commands;
mod error;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mapstitch::logging::{default_log_dir, default_log_file, init_logging};

use commands::common::load_config;
use commands::serve::ServeArgs;
use commands::stitch::StitchArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "mapstitch")]
#[command(version, about = "Stitch web-mercator map tiles into a single image", long_about = None)]
struct Cli {
    /// Config file (default: ~/.mapstitch/config.ini)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory for the log file (default: ~/.mapstitch/logs)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stitch an extent at a fixed zoom into an image file
    Stitch(StitchArgs),

    /// Serve stitched images over HTTP
    Serve(ServeArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        e.exit();
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let log_dir = cli.log_dir.unwrap_or_else(default_log_dir);
    let _logging_guard = init_logging(&log_dir, default_log_file())
        .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Stitch(args) => commands::stitch::run(args, &config).await,
        Commands::Serve(args) => commands::serve::run(args, &config).await,
    }
}
