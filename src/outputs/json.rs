//! JSON snapshot of an extracted batch.
//!
//! Written before loading so a run's raw harvest can be inspected or replayed
//! by hand.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! ├── 2022-05-11.json
//! └── 2022-05-12.json
//! ```
//!
//! Timestamps are ISO-8601 (`2022-05-11T14:32:00`) or `null`.

use crate::error::Result;
use crate::models::NewsItem;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

/// Write `items` to `{json_output_dir}/{date}.json`, replacing any earlier
/// snapshot for the same day.
#[instrument(level = "info", skip(items), fields(items = items.len()))]
pub async fn write_batch(
    items: &[NewsItem],
    json_output_dir: &str,
    date: NaiveDate,
) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(items)?;

    info!(%json_output_dir, "Ensuring JSON directory exists");
    if let Err(e) = fs::create_dir_all(json_output_dir).await {
        error!(%json_output_dir, error = %e, "Failed to create JSON dir");
        return Err(e.into());
    }

    let path = Path::new(json_output_dir).join(format!("{}.json", date.format("%Y-%m-%d")));
    fs::write(&path, json).await?;
    info!(path = %path.display(), "Wrote batch snapshot");

    Ok(path)
}
