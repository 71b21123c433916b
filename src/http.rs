//! Page fetching.
//!
//! [`Fetcher`] is the only thing the scraper needs from the network: a GET
//! that returns the body of a `200 OK` response. [`HttpFetcher`] is the
//! reqwest-backed implementation used by the binary.

use crate::config::HarvestConfig;
use crate::error::{Error, Result};
use reqwest::{Client, StatusCode};
use std::time::Instant;
use tracing::{debug, instrument, warn};

/// Fetch a page body over HTTP GET.
///
/// Implementations must fail with [`Error::Fetch`] for any status other than
/// `200 OK`, and with [`Error::Transport`] when no response arrives.
#[allow(async_fn_in_trait)]
pub trait Fetcher {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// reqwest client with a fixed User-Agent and a per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HarvestConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.fetch_timeout)
            .build()
            .map_err(Error::HttpClient)?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| Error::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(%url, %status, "Non-success status");
            return Err(Error::Fetch {
                url: url.to_string(),
                status,
            });
        }

        let body = response.text().await.map_err(|source| Error::Transport {
            url: url.to_string(),
            source,
        })?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis(),
            "Fetched page"
        );
        Ok(body)
    }
}
