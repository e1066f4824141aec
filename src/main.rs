use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ccdc::config::Config;

mod commands;

#[derive(Parser)]
#[command(
    name = "ccdc",
    version,
    about = "Rate-limited listing crawler: discover object ids, then ingest object details",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML); defaults to config/default.toml when present
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json)
    #[arg(long, global = true, default_value = "text")]
    log_format: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape object ids from the given listing url
    ObjectIds {
        /// Listing url to fetch object ids from
        url: String,

        /// Target file path; must not exist yet
        #[arg(short, long, default_value = "object-ids.txt")]
        output: PathBuf,
    },

    /// Scrape object data
    Objects {
        /// Base url used to build each object's url as <base_url>/<id>/
        base_url: String,

        /// Object id source path
        #[arg(short, long, default_value = "object-ids.txt")]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing/logging
    setup_tracing(&cli.log_format, cli.verbose)?;

    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(config = ?config, "Configuration loaded");

    let result = match cli.command {
        Commands::ObjectIds { url, output } => {
            tracing::info!(
                url = %url,
                output = %output.display(),
                "Start scraping object ids"
            );
            commands::object_ids(&config, &url, &output).await
        }

        Commands::Objects { base_url, input } => {
            tracing::info!(
                base_url = %base_url,
                input = %input.display(),
                "Start scraping objects"
            );
            commands::objects(&config, &base_url, &input).await
        }
    };

    if let Err(err) = &result {
        commands::report_failure(err);
    }

    result
}

fn setup_tracing(format: &str, verbose: bool) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("ccdc=debug,info")
        } else {
            tracing_subscriber::EnvFilter::new("ccdc=info,warn")
        }
    });

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        "text" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
        other => anyhow::bail!("Unknown log format: {other}. Valid: text, json"),
    }

    Ok(())
}
