//! Lumen CLI - Thumbnail derivation and caching for self-hosted photo libraries.
//!
//! Lumen produces a fixed catalog of resized and cropped JPEG derivatives for
//! every original and keeps them in a content-addressed cache, so repeated
//! requests are served from disk instead of being recomputed.
//!
//! # Usage
//!
//! ```bash
//! # Pre-generate thumbnails for a library
//! lumen thumbs ./photos/ --output report.jsonl
//!
//! # Serve a single size on demand
//! lumen thumb photo.jpg fit_720
//!
//! # List the size catalog
//! lumen sizes
//!
//! # View configuration
//! lumen config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Lumen - Thumbnail derivation and caching for self-hosted photo libraries.
#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate all cache-eligible thumbnails for a file or directory
    Thumbs(cli::thumbs::ThumbsArgs),

    /// Get a single thumbnail size, generating it if needed
    Thumb(cli::thumb::ThumbArgs),

    /// List the thumbnail size catalog
    Sizes(cli::sizes::SizesArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match lumen_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `lumen config path`."
            );
            lumen_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Lumen v{}", lumen_core::VERSION);

    match cli.command {
        Commands::Thumbs(args) => cli::thumbs::execute(args).await,
        Commands::Thumb(args) => cli::thumb::execute(args).await,
        Commands::Sizes(args) => cli::sizes::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
