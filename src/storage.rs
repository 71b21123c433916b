//! SQLite-backed article store.
//!
//! Rows are keyed by `url`. Inserting a batch never updates an existing row:
//! conflicting rows are skipped by `ON CONFLICT (url) DO NOTHING`.

use crate::error::Result;
use crate::models::{NewsItem, NewsRow};
use chrono::NaiveDateTime;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::str::FromStr;
use tracing::{debug, info, instrument};

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS news_items (
        abstract TEXT NOT NULL,
        content TEXT NOT NULL,
        title TEXT NOT NULL,
        image_src TEXT NOT NULL,
        published_at TEXT,
        url TEXT NOT NULL,
        CONSTRAINT news_items_url_key UNIQUE (url)
    )
"#;

const INSERT_NEWS_ITEM: &str = r#"
    INSERT INTO news_items (abstract, content, title, image_src, published_at, url)
    VALUES (?, ?, ?, ?, ?, ?)
    ON CONFLICT (url) DO NOTHING
"#;

#[derive(Debug, Clone)]
pub struct NewsStore {
    pool: SqlitePool,
}

impl NewsStore {
    /// Open (creating the file if needed) the database at `database_url`,
    /// e.g. `sqlite://news.db`.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }

    /// Create `news_items` if it does not exist yet.
    pub async fn create_table(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert `items` in one transaction and return how many rows were new.
    ///
    /// Any failure rolls back the whole batch: the transaction is dropped
    /// without commit on every early return.
    #[instrument(level = "info", skip_all, fields(items = items.len()))]
    pub async fn insert_batch(&self, items: &[NewsItem]) -> Result<u64> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0u64;

        for row in items.iter().map(NewsRow::from) {
            let result = sqlx::query(INSERT_NEWS_ITEM)
                .bind(&row.abstract_text)
                .bind(&row.content)
                .bind(&row.title)
                .bind(&row.image_src)
                .bind(row.published_at)
                .bind(&row.url)
                .execute(&mut *tx)
                .await?;
            if result.rows_affected() == 0 {
                debug!(url = %row.url, "Already stored; skipped");
            }
            inserted += result.rows_affected();
        }

        tx.commit().await?;
        info!(
            inserted,
            skipped = items.len() as u64 - inserted,
            "Committed news batch"
        );
        Ok(inserted)
    }

    pub async fn find_by_url(&self, url: &str) -> Result<Option<NewsItem>> {
        let row = sqlx::query(
            r#"
            SELECT abstract, content, title, image_src, published_at, url
            FROM news_items
            WHERE url = ?
            "#,
        )
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| {
            Ok(NewsItem::from(NewsRow {
                abstract_text: row.try_get("abstract")?,
                content: row.try_get("content")?,
                title: row.try_get("title")?,
                image_src: row.try_get("image_src")?,
                published_at: row.try_get::<Option<NaiveDateTime>, _>("published_at")?,
                url: row.try_get("url")?,
            }))
        })
        .transpose()
    }

    pub async fn count(&self) -> Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM news_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    /// Private in-memory database with the table already created.
    #[cfg(test)]
    pub async fn in_memory() -> Result<Self> {
        // One connection, kept for the pool's lifetime: each new connection
        // to `:memory:` would see an empty database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.create_table().await?;
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    fn item(url: &str) -> NewsItem {
        NewsItem {
            title: format!("title of {url}"),
            abstract_text: "abstract".to_string(),
            image_src: String::new(),
            content: "line one\nline two".to_string(),
            published_at: NaiveDate::from_ymd_opt(2022, 5, 11)
                .unwrap()
                .and_hms_opt(14, 32, 0),
            url: url.to_string(),
        }
    }

    #[tokio::test]
    async fn test_insert_batch_counts_new_rows() {
        let store = NewsStore::in_memory().await.unwrap();
        let batch = vec![item("https://ria.ru/a"), item("https://ria.ru/b")];
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 2);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_insert_batch_is_idempotent() {
        let store = NewsStore::in_memory().await.unwrap();
        let batch = vec![item("https://ria.ru/a"), item("https://ria.ru/b")];
        store.insert_batch(&batch).await.unwrap();
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_existing_url_is_skipped_not_replaced() {
        let store = NewsStore::in_memory().await.unwrap();
        let original = item("https://ria.ru/a");
        store.insert_batch(std::slice::from_ref(&original)).await.unwrap();

        let mut changed = item("https://ria.ru/a");
        changed.title = "rewritten".to_string();
        let batch = vec![changed, item("https://ria.ru/b")];

        assert_eq!(store.insert_batch(&batch).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 2);
        let stored = store.find_by_url("https://ria.ru/a").await.unwrap().unwrap();
        assert_eq!(stored.title, original.title);
        assert!(store.find_by_url("https://ria.ru/b").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_duplicates_within_one_batch_collapse() {
        let store = NewsStore::in_memory().await.unwrap();
        let batch = vec![item("https://ria.ru/a"), item("https://ria.ru/a")];
        assert_eq!(store.insert_batch(&batch).await.unwrap(), 1);
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_stored_row_round_trips_all_fields() {
        let store = NewsStore::in_memory().await.unwrap();
        let with_date = item("https://ria.ru/a");
        let without_date = NewsItem::empty("https://ria.ru/b");
        store
            .insert_batch(&[with_date.clone(), without_date.clone()])
            .await
            .unwrap();

        assert_eq!(store.find_by_url(&with_date.url).await.unwrap(), Some(with_date));
        assert_eq!(store.find_by_url(&without_date.url).await.unwrap(), Some(without_date));
        assert_eq!(store.find_by_url("https://ria.ru/none").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_empty_batch_commits_nothing() {
        let store = NewsStore::in_memory().await.unwrap();
        assert_eq!(store.insert_batch(&[]).await.unwrap(), 0);
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_batch_leaves_store_unchanged() {
        let store = NewsStore::in_memory().await.unwrap();
        store.insert_batch(&[item("https://ria.ru/a")]).await.unwrap();

        // Without the table every statement fails; the open transaction must
        // be released so the single pooled connection is usable again.
        sqlx::query("ALTER TABLE news_items RENAME TO news_items_old")
            .execute(&store.pool)
            .await
            .unwrap();
        let err = store.insert_batch(&[item("https://ria.ru/b")]).await.unwrap_err();
        assert!(!err.is_fetch());

        sqlx::query("ALTER TABLE news_items_old RENAME TO news_items")
            .execute(&store.pool)
            .await
            .unwrap();
        assert_eq!(store.count().await.unwrap(), 1);
        assert!(store.find_by_url("https://ria.ru/b").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let temp_dir = tempdir().unwrap();
        let db_path = temp_dir.path().join("news.db");
        let url = format!("sqlite://{}", db_path.display());

        let store = NewsStore::connect(&url).await.unwrap();
        store.create_table().await.unwrap();
        store.insert_batch(&[item("https://ria.ru/a")]).await.unwrap();

        assert!(db_path.exists());
        assert_eq!(store.count().await.unwrap(), 1);
    }
}
