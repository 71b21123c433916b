//! Data models for harvested articles.
//!
//! - [`NewsItem`]: the structured record extracted from one article page
//! - [`NewsRow`]: the fixed column order used by the storage table
//! - [`HarvestBatch`]: everything one extraction pass produced, handed to the load stage

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One article as extracted from its page.
///
/// Every field is always present: missing markup yields an empty string or
/// `None`, never a missing key. `url` is the natural key and is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    /// The article's second title (lead paragraph).
    #[serde(rename = "abstract")]
    pub abstract_text: String,
    pub image_src: String,
    /// Text blocks joined by `\n`.
    pub content: String,
    /// Local wall-clock time printed on the page.
    pub published_at: Option<NaiveDateTime>,
    pub url: String,
}

impl NewsItem {
    /// A record with every optional field at its default.
    pub fn empty(url: impl Into<String>) -> Self {
        Self {
            title: String::new(),
            abstract_text: String::new(),
            image_src: String::new(),
            content: String::new(),
            published_at: None,
            url: url.into(),
        }
    }
}

/// Storage row, in the column order
/// `(abstract, content, title, image_src, published_at, url)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsRow {
    pub abstract_text: String,
    pub content: String,
    pub title: String,
    pub image_src: String,
    pub published_at: Option<NaiveDateTime>,
    pub url: String,
}

impl From<NewsItem> for NewsRow {
    fn from(item: NewsItem) -> Self {
        Self {
            abstract_text: item.abstract_text,
            content: item.content,
            title: item.title,
            image_src: item.image_src,
            published_at: item.published_at,
            url: item.url,
        }
    }
}

impl From<&NewsItem> for NewsRow {
    fn from(item: &NewsItem) -> Self {
        NewsRow::from(item.clone())
    }
}

impl From<NewsRow> for NewsItem {
    fn from(row: NewsRow) -> Self {
        Self {
            title: row.title,
            abstract_text: row.abstract_text,
            image_src: row.image_src,
            content: row.content,
            published_at: row.published_at,
            url: row.url,
        }
    }
}

/// An article that was discovered but could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleFailure {
    pub url: String,
    pub reason: String,
}

/// Output of one extraction pass.
///
/// `items` keeps discovery order. `discovered` counts every URL found on the
/// index page, including the ones listed in `failures`.
#[derive(Debug, Clone, Default)]
pub struct HarvestBatch {
    pub discovered: usize,
    pub items: Vec<NewsItem>,
    pub failures: Vec<ArticleFailure>,
}
