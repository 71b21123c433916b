//! Extract and load stages, and the daily run that chains them.
//!
//! # Architecture
//!
//! - [`Stage`]: one unit of work with a typed input and output
//! - [`ExtractionStage`]: index page → [`HarvestBatch`]
//! - [`LoadStage`]: batch → rows inserted
//! - [`RetryStage`]: decorator that re-runs a failed stage as a whole
//!
//! The batch moves from extraction to load in memory. When only the load
//! fails, retrying it reuses the batch instead of scraping again.

use crate::config::{HarvestConfig, RetryPolicy};
use crate::entrypoint::entrypoint_for;
use crate::error::Result;
use crate::http::Fetcher;
use crate::models::{HarvestBatch, NewsItem};
use crate::outputs::json;
use crate::scrapers::ria::RiaScraper;
use crate::storage::NewsStore;
use chrono::NaiveDate;
use std::fmt;
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};

/// One orchestrated unit of work.
#[allow(async_fn_in_trait)]
pub trait Stage {
    type Input: ?Sized;
    type Output;

    fn name(&self) -> &'static str;

    async fn run(&self, input: &Self::Input) -> Result<Self::Output>;
}

/// Discover today's URLs, then extract every article.
///
/// A failed index fetch fails the stage before any article is requested.
/// Failed article fetches are recorded in the batch and skipped.
pub struct ExtractionStage<F> {
    scraper: RiaScraper<F>,
}

impl<F: Fetcher> ExtractionStage<F> {
    pub fn new(fetcher: F, config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            scraper: RiaScraper::new(fetcher, config)?,
        })
    }
}

impl<F> fmt::Debug for ExtractionStage<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionStage").finish_non_exhaustive()
    }
}

impl<F: Fetcher> Stage for ExtractionStage<F> {
    type Input = str;
    type Output = HarvestBatch;

    fn name(&self) -> &'static str {
        "extract"
    }

    #[instrument(level = "info", skip(self))]
    async fn run(&self, index_url: &str) -> Result<HarvestBatch> {
        let urls = self.scraper.index_articles(index_url).await?;
        self.scraper.fetch_articles(urls).await
    }
}

/// Persist a batch, skipping URLs that are already stored.
#[derive(Debug)]
pub struct LoadStage {
    store: NewsStore,
}

impl LoadStage {
    pub fn new(store: NewsStore) -> Self {
        Self { store }
    }
}

impl Stage for LoadStage {
    type Input = [NewsItem];
    type Output = u64;

    fn name(&self) -> &'static str {
        "load"
    }

    #[instrument(level = "info", skip_all, fields(items = items.len()))]
    async fn run(&self, items: &[NewsItem]) -> Result<u64> {
        self.store.insert_batch(items).await
    }
}

/// Re-runs the wrapped stage on failure, with a fixed pause between attempts.
///
/// ```text
/// attempts = 1 + max_retries
/// ```
pub struct RetryStage<S> {
    inner: S,
    policy: RetryPolicy,
}

impl<S: Stage> RetryStage<S> {
    pub fn new(inner: S, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

impl<S> fmt::Debug for RetryStage<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryStage")
            .field("max_retries", &self.policy.max_retries)
            .field("delay", &self.policy.delay)
            .finish()
    }
}

impl<S: Stage> Stage for RetryStage<S> {
    type Input = S::Input;
    type Output = S::Output;

    fn name(&self) -> &'static str {
        self.inner.name()
    }

    #[instrument(level = "info", skip_all, fields(stage = self.inner.name()))]
    async fn run(&self, input: &Self::Input) -> Result<Self::Output> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.run(input).await {
                Ok(output) => return Ok(output),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.policy.max_retries {
                        error!(
                            attempt,
                            max = self.policy.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "Stage exhausted retries"
                        );
                        return Err(e);
                    }

                    warn!(
                        attempt,
                        max = self.policy.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        delay = ?self.policy.delay,
                        error = %e,
                        "Stage attempt failed; retrying"
                    );
                    sleep(self.policy.delay).await;
                }
            }
        }
    }
}

/// Counts reported at the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub index_url: String,
    pub discovered: usize,
    pub extracted: usize,
    pub failed: usize,
    pub inserted: u64,
    pub elapsed: Duration,
}

/// One daily pass: extract → (snapshot) → load, each stage retried on its own.
///
/// `json_output_dir`, when set, receives the extracted batch before loading;
/// a failed snapshot write is logged and does not stop the load.
#[instrument(level = "info", skip(fetcher, store, config))]
pub async fn run_daily<F: Fetcher>(
    fetcher: F,
    store: NewsStore,
    config: &HarvestConfig,
    date: NaiveDate,
    json_output_dir: Option<&str>,
) -> Result<RunSummary> {
    let t0 = Instant::now();
    let index_url = entrypoint_for(&config.base_url, date);
    info!(%index_url, "Starting daily harvest");

    let extract = RetryStage::new(ExtractionStage::new(fetcher, config)?, config.retry);
    let batch = extract.run(index_url.as_str()).await?;
    for failure in &batch.failures {
        warn!(url = %failure.url, reason = %failure.reason, "Article left out of batch");
    }

    if let Some(dir) = json_output_dir {
        if let Err(e) = json::write_batch(&batch.items, dir, date).await {
            error!(error = %e, dir, "Failed to write batch snapshot");
        }
    }

    let load = RetryStage::new(LoadStage::new(store), config.retry);
    let inserted = load.run(batch.items.as_slice()).await?;

    let summary = RunSummary {
        index_url,
        discovered: batch.discovered,
        extracted: batch.items.len(),
        failed: batch.failures.len(),
        inserted,
        elapsed: t0.elapsed(),
    };
    info!(
        discovered = summary.discovered,
        extracted = summary.extracted,
        failed = summary.failed,
        inserted = summary.inserted,
        secs = summary.elapsed.as_secs(),
        "Daily harvest complete"
    );
    Ok(summary)
}
