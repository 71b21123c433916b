//! Daily ria.ru harvest: discover today's articles, extract their fields and
//! load new ones into SQLite.
//!
//! The pieces are usable on their own:
//!
//! - [`entrypoint`]: the dated index page address
//! - [`scrapers::ria`]: link discovery and article extraction over any [`http::Fetcher`]
//! - [`storage`]: conflict-skipping batch insert
//! - [`pipeline`]: the extract and load stages, stage retry, and the daily run

pub mod cli;
pub mod config;
pub mod entrypoint;
pub mod error;
pub mod extract;
pub mod http;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod scrapers;
pub mod storage;
pub mod utils;

pub use error::{Error, Result};
pub use models::NewsItem;
