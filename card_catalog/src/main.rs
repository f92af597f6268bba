//! Card Catalog - TCG collection catalog service
//!
//! Loads the per-set datasets, keeps prices current and serves the HTTP API.

use card_catalog::pricing::RetryPolicy;
use card_catalog::{CatalogService, Config};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// TCG card catalog server - unified card data, live prices and deck imports
#[derive(Parser, Debug)]
#[command(name = "card_catalog")]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory with the per-set dataset CSVs (and optional sets.json)
    #[arg(short, long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for downloaded card images
    #[arg(long, default_value_t = default_image_dir())]
    image_dir: String,

    /// Port for the HTTP API
    #[arg(short, long, default_value_t = 3001)]
    port: u16,

    /// Hours a loaded catalog is served before it is rebuilt
    #[arg(long, default_value_t = 24)]
    cache_hours: i64,

    /// Retries per price feed after a failed download
    #[arg(long, default_value_t = 2)]
    fetch_retries: u32,

    /// Parallel downloads for the bulk image download
    #[arg(long, default_value_t = 8)]
    download_concurrency: usize,

    /// Load the catalog once, print a summary and exit
    #[arg(long, default_value_t = false)]
    check: bool,
}

fn default_image_dir() -> String {
    card_catalog::config::default_image_dir()
        .to_string_lossy()
        .to_string()
}

impl Args {
    fn into_config(self) -> Config {
        Config {
            data_dir: self.data_dir,
            image_dir: PathBuf::from(self.image_dir),
            port: self.port,
            cache_ttl: chrono::Duration::hours(self.cache_hours.max(0)),
            retry: RetryPolicy {
                retries: self.fetch_retries,
                initial_backoff: Duration::from_millis(500),
            },
            download_concurrency: self.download_concurrency.max(1),
        }
    }
}

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let check = args.check;
    let config = args.into_config();

    log::info!("Starting card_catalog...");
    log::info!("Data directory: {}", config.data_dir.display());

    if check {
        run_check(&config).await;
        return;
    }

    if let Err(e) = card_catalog::web::serve(&config).await {
        log::error!("Web server error: {}", e);
        std::process::exit(1);
    }
}

/// Load the catalog once and report what was found
async fn run_check(config: &Config) {
    let service = match CatalogService::from_config(config, reqwest::Client::new()) {
        Ok(service) => service,
        Err(e) => {
            log::error!("Failed to read set registry: {}", e);
            std::process::exit(1);
        }
    };

    match service.reload().await {
        Ok(report) => {
            log::info!(
                "{} records from {} files, {} prices updated, {} unmatched price rows",
                report.records,
                report.files_loaded,
                report.prices.updated,
                report.prices.skipped
            );
            for file in &report.files_skipped {
                log::warn!("Dataset not loaded: {}", file);
            }
            for file in &report.prices.failed_feeds {
                log::warn!("Price feed failed: {}", file);
            }
        }
        Err(e) => {
            log::error!("Failed to load catalog: {}", e);
            std::process::exit(1);
        }
    }
}
