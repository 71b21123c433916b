//! News source scrapers.
//!
//! A scraper works in two phases:
//!
//! 1. **Indexing**: discover article URLs from the source's daily index page
//! 2. **Fetching**: download each article and extract a [`NewsItem`](crate::models::NewsItem)
//!
//! # Supported Sources
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | RIA Novosti | [`ria`] | HTML scraping | Per-day index at `ria.ru/<YYYYMMDD>/` |
//!
//! Scrapers fetch through a [`Fetcher`](crate::http::Fetcher), fetch articles
//! concurrently with `futures::stream`, and skip (but record) articles whose
//! fetch fails.

pub mod ria;
