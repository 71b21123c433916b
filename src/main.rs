//! # RIA Harvest
//!
//! A daily pipeline that collects the articles ria.ru published today and
//! loads the new ones into SQLite.
//!
//! ## Usage
//!
//! ```sh
//! ria_harvest --database-url sqlite://news.db --create-table
//! ```
//!
//! Run it once a day from cron or any other scheduler; the binary performs a
//! single pass and retries failed stages itself.
//!
//! ## Architecture
//!
//! 1. **Entrypoint**: build today's index URL, `https://ria.ru/<YYYYMMDD>/`
//! 2. **Extraction**: discover article links, fetch and parse each article
//!    (concurrently, failed articles are skipped)
//! 3. **Snapshot** (optional): write the batch as JSON
//! 4. **Load**: insert the batch in one transaction, skipping known URLs

use chrono::Local;
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

use ria_harvest::cli::Cli;
use ria_harvest::http::HttpFetcher;
use ria_harvest::pipeline;
use ria_harvest::storage::NewsStore;
use ria_harvest::utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("ria_harvest starting up");

    let args = Cli::parse();
    let config = args.harvest_config();
    debug!(?config, json_output_dir = ?args.json_output_dir, "Parsed CLI arguments");

    // Fail before any network traffic if the snapshot dir is unusable.
    if let Some(dir) = &args.json_output_dir {
        if let Err(e) = ensure_writable_dir(dir).await {
            error!(
                path = %dir,
                error = %e,
                "JSON output directory is not writable (fix perms or choose a different path)"
            );
            return Err(e.into());
        }
    }

    let store = NewsStore::connect(&args.database_url).await?;
    if args.create_table {
        store.create_table().await?;
        info!("Ensured news_items table exists");
    }

    let fetcher = HttpFetcher::new(&config)?;
    let today = Local::now().date_naive();

    match pipeline::run_daily(fetcher, store, &config, today, args.json_output_dir.as_deref()).await {
        Ok(summary) => {
            info!(
                index_url = %summary.index_url,
                discovered = summary.discovered,
                extracted = summary.extracted,
                failed = summary.failed,
                inserted = summary.inserted,
                secs = summary.elapsed.as_secs(),
                millis = summary.elapsed.subsec_millis(),
                "Execution complete"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = %e, "Daily harvest failed");
            Err(e.into())
        }
    }
}
