//! Runtime configuration handed to every component at construction.
//!
//! Nothing here is global: the binary builds one [`HarvestConfig`] from the
//! command line and passes it down.

use std::time::Duration;

/// Root of the ria.ru site; the daily index lives at `<base>/<YYYYMMDD>/`.
pub const DEFAULT_BASE_URL: &str = "https://ria.ru";

/// Browser-like User-Agent sent with every request.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_1) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/39.0.2171.95 Safari/537.36";

#[derive(Debug, Clone)]
pub struct HarvestConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Upper bound for a single request, including reading the body.
    pub fetch_timeout: Duration,
    /// How many article pages may be in flight at once.
    pub concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: Duration::from_secs(30),
            concurrency: 8,
            retry: RetryPolicy::default(),
        }
    }
}

/// Stage-level retry: a failed stage is re-run as a whole.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` disables retrying.
    pub max_retries: usize,
    /// Fixed pause between attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_secs(5 * 60),
        }
    }
}
