mod check;
mod commands;

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use salewatch_core::{load_app_config, load_stores, AppConfig};
use salewatch_detector::HttpFetcher;
use salewatch_notify::channels_from_config;
use salewatch_state::SaleStateStore;

#[derive(Debug, Parser)]
#[command(name = "salewatch")]
#[command(about = "Watch Stockholm fashion stores for sales and get notified")]
struct Cli {
    /// Print one progress line per store
    #[arg(short, long)]
    verbose: bool,

    /// Check stores and update state, but send no notifications
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Send a test notification through every configured channel and exit
    #[arg(long, conflicts_with_all = ["store", "list"])]
    test_notify: bool,

    /// Check a single store by name and print the verdict (no state, no notifications)
    #[arg(short, long, value_name = "NAME")]
    store: Option<String>,

    /// State file path [default: $SALEWATCH_STATE_FILE or sale_state.json]
    #[arg(long, value_name = "PATH")]
    state_file: Option<PathBuf>,

    /// Store catalog path [default: $SALEWATCH_STORES_PATH or ./config/stores.yaml]
    #[arg(long, value_name = "PATH")]
    stores: Option<PathBuf>,

    /// Print the store catalog and exit
    #[arg(long, conflicts_with = "store")]
    list: bool,
}

impl Cli {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.stores {
            config.stores_path.clone_from(path);
        }
        if let Some(path) = &self.state_file {
            config.state_file.clone_from(path);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = load_app_config()?;
    cli.apply_overrides(&mut config);

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, stores = %config.stores_path.display(), "configuration loaded");

    if cli.test_notify {
        return commands::test_notify(&config).await;
    }

    let catalog = load_stores(&config.stores_path)?;

    if cli.list {
        commands::list_stores(&catalog);
        return Ok(());
    }

    let fetcher = HttpFetcher::from_config(&config)
        .map_err(|e| anyhow::anyhow!("failed to build HTTP client: {e}"))?;

    if let Some(name) = cli.store.as_deref() {
        return commands::check_single_store(&fetcher, &catalog, name).await;
    }

    let mut state = SaleStateStore::load(&config.state_file)?;
    let channels = if cli.dry_run {
        Vec::new()
    } else {
        channels_from_config(&config)?
    };

    let options = check::RunOptions {
        verbose: cli.verbose,
        dry_run: cli.dry_run,
        max_concurrent: config.max_concurrent_stores,
    };
    let report = check::run_check(
        &fetcher,
        &catalog,
        &mut state,
        &channels,
        &options,
        chrono::Utc::now(),
    )
    .await;
    tracing::info!(
        checked = report.observations.len(),
        new_sales = report.new_sales.len(),
        channels_attempted = report.notifications.len(),
        "check run complete"
    );

    state.save()?;
    println!("\n💾 State saved to {}", config.state_file.display());
    Ok(())
}

#[cfg(test)]
mod tests;
