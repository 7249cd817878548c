//! budgetview main entry point

use anyhow::Context;
use budgetview_api::start_server;
use budgetview_config::{Config, ConfigError};
use budgetview_core::{TransactionView, ViewOptions, ViewRuntime};
use budgetview_store::MemoryStore;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "budgetview")]
#[command(version = "0.1.0")]
#[command(about = "Envelope transaction table with paging, sorting and filtering", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print the default configuration and exit
    #[arg(long)]
    print_default_config: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    let loaded = Config::load(args.config.clone());
    let level = loaded
        .as_ref()
        .map(|c| c.logging.level.clone())
        .unwrap_or_else(|_| "info".to_string());
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = match loaded {
        Ok(config) => config,
        Err(ConfigError::FileNotFound { path }) => {
            log::warn!("Config file {} not found, using defaults", path);
            Config::default()
        }
        Err(e) => {
            log::error!("{}", e.to_details());
            return Err(e).context("Failed to load configuration");
        }
    };

    log::info!(
        "Config loaded: data file={}, user={}",
        config.source.data_file.display(),
        config.source.user_id
    );

    let store = MemoryStore::load(&config.source.data_file)
        .await
        .with_context(|| format!("Failed to load {}", config.source.data_file.display()))?
        .with_latency(Duration::from_millis(config.source.latency_ms));
    let store = Arc::new(store);

    let options = ViewOptions::from_config(&config)?;
    let view = TransactionView::new(options)?;
    let (runtime, handle) = ViewRuntime::new(view, store.clone());
    tokio::spawn(runtime.run());

    start_server(config, handle, store).await?;
    Ok(())
}
