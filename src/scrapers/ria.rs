//! RIA Novosti (ria.ru) scraper.
//!
//! # URL Pattern
//!
//! Each calendar day has an index page at `https://ria.ru/<YYYYMMDD>/`
//! listing that day's articles as `a.list-item__title` anchors with absolute
//! links.
//!
//! # Article Layout
//!
//! | Field | Selector |
//! |-------|----------|
//! | title | `div.article__title` |
//! | abstract | `h1.article__second-title` |
//! | image | `div.photoview__open img` (`src`) |
//! | content | every `div.article__block[data-type="text"]` |
//! | published_at | `div.article__info-date` (`HH:MM DD.MM.YYYY`) |

use crate::config::HarvestConfig;
use crate::error::Result;
use crate::extract::{Extraction, Field, FieldRule, FieldTable, compile_selector};
use crate::http::Fetcher;
use crate::models::{ArticleFailure, HarvestBatch, NewsItem};
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

const LIST_ITEM_TITLE: &str = "a.list-item__title";

const ARTICLE_FIELDS: &[FieldRule] = &[
    FieldRule {
        field: Field::Title,
        selector: "div.article__title",
        extraction: Extraction::Text,
    },
    FieldRule {
        field: Field::Abstract,
        selector: "h1.article__second-title",
        extraction: Extraction::Text,
    },
    FieldRule {
        field: Field::ImageSrc,
        selector: "div.photoview__open img",
        extraction: Extraction::Attribute("src"),
    },
    FieldRule {
        field: Field::Content,
        selector: r#"div.article__block[data-type="text"]"#,
        extraction: Extraction::AllText,
    },
    FieldRule {
        field: Field::PublishedAt,
        selector: "div.article__info-date",
        extraction: Extraction::Timestamp,
    },
];

pub struct RiaScraper<F> {
    fetcher: F,
    list_item: Selector,
    fields: FieldTable,
    concurrency: usize,
}

impl<F: Fetcher> RiaScraper<F> {
    pub fn new(fetcher: F, config: &HarvestConfig) -> Result<Self> {
        Ok(Self {
            fetcher,
            list_item: compile_selector(LIST_ITEM_TITLE)?,
            fields: FieldTable::compile(ARTICLE_FIELDS)?,
            concurrency: config.concurrency.max(1),
        })
    }

    /// Fetch the index page and return the absolute article links on it.
    ///
    /// Links keep document order; duplicates are left in place.
    #[instrument(level = "info", skip(self))]
    pub async fn index_articles(&self, index_url: &str) -> Result<Vec<String>> {
        let html = self.fetcher.fetch(index_url).await?;
        let article_urls = self.parse_index(&html);

        info!(
            count = article_urls.len(),
            source = index_url,
            "Indexed RIA article URLs"
        );
        debug!(urls = ?article_urls, "RIA URLs");

        Ok(article_urls)
    }

    /// Fetch one article page and extract its fields.
    ///
    /// Only the fetch can fail; missing markup leaves fields at their defaults.
    #[instrument(level = "info", skip(self))]
    pub async fn fetch_article(&self, url: &str) -> Result<NewsItem> {
        let body = self.fetcher.fetch(url).await?;
        let item = self.parse_article(&body, url);

        debug!(
            title = %truncate_for_log(&item.title, 80),
            content_bytes = item.content.len(),
            has_timestamp = item.published_at.is_some(),
            "Parsed RIA article"
        );
        Ok(item)
    }

    /// Fetch every article, at most `concurrency` at a time.
    ///
    /// A failed fetch is logged and recorded in `failures`; the rest of the
    /// batch carries on. Items keep the order of `urls`.
    #[instrument(level = "info", skip_all, fields(urls = urls.len()))]
    pub async fn fetch_articles(&self, urls: Vec<String>) -> Result<HarvestBatch> {
        let discovered = urls.len();
        let results: Vec<(String, Result<NewsItem>)> = stream::iter(urls)
            .map(move |url| async move {
                let result = self.fetch_article(&url).await;
                (url, result)
            })
            .buffered(self.concurrency)
            .collect()
            .await;

        let mut batch = HarvestBatch {
            discovered,
            ..HarvestBatch::default()
        };
        for (url, result) in results {
            match result {
                Ok(item) => batch.items.push(item),
                Err(e) if e.is_fetch() => {
                    error!(error = %e, %url, "RIA fetch failed; skipping article");
                    batch.failures.push(ArticleFailure {
                        url,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }

        if !batch.failures.is_empty() {
            warn!(
                failed = batch.failures.len(),
                fetched = batch.items.len(),
                "Some RIA articles could not be fetched"
            );
        }
        info!(count = batch.items.len(), "Fetched RIA article contents");
        Ok(batch)
    }

    fn parse_index(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.list_item)
            .filter_map(|element| element.value().attr("href"))
            .map(str::trim)
            .filter(|href| is_absolute_link(href))
            .map(str::to_string)
            .collect()
    }

    fn parse_article(&self, html: &str, url: &str) -> NewsItem {
        let document = Html::parse_document(html);
        self.fields.extract(&document, url)
    }
}

/// Non-empty `http`/`https` URL with a host.
fn is_absolute_link(href: &str) -> bool {
    match Url::parse(href) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
