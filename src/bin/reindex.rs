//! Rebuild the video index from the per-video documents.
//!
//! Usage:
//!   cargo run --bin reindex
//!
//! Optional:
//! - VIDEO_DATA_DIR (defaults to manuscript)
//! - VIDEO_INDEX_PATH (defaults to <data dir>/index.json)

use anyhow::{Context, Result};
use tracing::info;
use video_publisher::config::{self, Config};
use video_publisher::storage::Store;

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    config::init_logging(config.log_format);

    let store = Store::new(&config.data_dir, &config.index_path);
    let index = store
        .rebuild_index()
        .with_context(|| format!("Failed to scan {}", config.data_dir.display()))?;
    store.save_index(&index)?;

    info!(
        path = %store.index_path().display(),
        "Wrote index with {} videos",
        index.len()
    );

    Ok(())
}
