//! metals-feed – poll spot metal prices into InfluxDB
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;

use metals_feed::config::{commented_config_template, Config};
use metals_feed::utils::init_logging;
use metals_feed::IngestionLoop;

#[derive(Debug, Parser)]
#[command(name = "metals-feed", author, version, about = "Poll spot metal prices into InfluxDB", long_about = None)]
struct Args {
    /// Path to the configuration file (TOML). Defaults to ./metals-feed.toml,
    /// then the user config dir, then built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the default configuration to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Run a single polling round and exit
    #[arg(long, conflicts_with = "iterations")]
    once: bool,

    /// Stop after this many polling rounds
    #[arg(long, value_name = "N")]
    iterations: Option<u64>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", commented_config_template());
        return Ok(());
    }

    dotenv::dotenv().ok();
    init_logging(&args.log_level);

    let config = match &args.config {
        | Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        | None => Config::load().context("loading config")?,
    };
    config.validate().context("invalid configuration")?;

    let mut feed = IngestionLoop::from_config(&config).context("building ingestion loop")?;
    feed.setup()
        .await
        .with_context(|| format!("preparing database {} at {}", config.influx.database, config.influx.url()))?;

    let max_iterations = if args.once { Some(1) } else { args.iterations };

    tokio::select! {
        res = feed.run_for(max_iterations) => {
            let completed = res.context("ingestion loop stopped")?;
            info!("Finished after {} iterations", completed);
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
        }
    }
    Ok(())
}
