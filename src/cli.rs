//! Command-line interface definitions.
//!
//! Every option can also come from an environment variable, which is how a
//! cron entry or container usually supplies them.

use crate::config::{DEFAULT_BASE_URL, DEFAULT_USER_AGENT, HarvestConfig, RetryPolicy};
use clap::Parser;
use std::time::Duration;

/// Harvest today's ria.ru articles into SQLite.
///
/// ```sh
/// # One daily pass against a local database file
/// ria_harvest --database-url sqlite://news.db --create-table
///
/// # Keep a JSON snapshot of each day's batch
/// ria_harvest --database-url sqlite://news.db -j ./batches
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// SQLite database URL, e.g. sqlite://news.db
    #[arg(short, long, env = "DATABASE_URL")]
    pub database_url: String,

    /// Site root; the index page is <base-url>/<YYYYMMDD>/
    #[arg(long, env = "RIA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// User-Agent header sent with every request
    #[arg(long, env = "RIA_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Maximum number of article pages fetched at once
    #[arg(long, default_value_t = 8)]
    pub concurrency: usize,

    /// How many times a failed stage is re-run
    #[arg(long, default_value_t = 3)]
    pub retries: usize,

    /// Seconds to wait before re-running a failed stage
    #[arg(long, default_value_t = 300)]
    pub retry_delay_secs: u64,

    /// Directory for a dated JSON snapshot of the extracted batch
    #[arg(short, long, env = "JSON_OUTPUT_DIR")]
    pub json_output_dir: Option<String>,

    /// Create the news_items table if it does not exist
    #[arg(long)]
    pub create_table: bool,
}

impl Cli {
    pub fn harvest_config(&self) -> HarvestConfig {
        HarvestConfig {
            base_url: self.base_url.clone(),
            user_agent: self.user_agent.clone(),
            fetch_timeout: Duration::from_secs(self.timeout_secs),
            concurrency: self.concurrency,
            retry: RetryPolicy {
                max_retries: self.retries,
                delay: Duration::from_secs(self.retry_delay_secs),
            },
        }
    }
}
