//! Error taxonomy for the harvest pipeline.
//!
//! Fetch-kind errors ([`Error::Fetch`] and [`Error::Transport`]) are the only
//! ones the extraction stage isolates per article. Everything else, storage
//! failures in particular, is fatal to the stage that raised it.
//!
//! Missing markup is never an error: absent fields take their defaults.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The server answered, but not with `200 OK`.
    #[error("fetching {url} failed with status {status}")]
    Fetch { url: String, status: StatusCode },

    /// The request never produced a usable response (DNS, TLS, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid selector `{selector}`: {reason}")]
    Selector { selector: String, reason: String },

    #[error("storage error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures of a single page fetch, which callers may skip over.
    pub fn is_fetch(&self) -> bool {
        matches!(self, Error::Fetch { .. } | Error::Transport { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_is_isolatable() {
        let err = Error::Fetch {
            url: "https://ria.ru/20220511/".to_string(),
            status: StatusCode::NOT_FOUND,
        };
        assert!(err.is_fetch());
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn test_store_error_is_not_isolatable() {
        let err = Error::Store(sqlx::Error::PoolClosed);
        assert!(!err.is_fetch());
    }
}
