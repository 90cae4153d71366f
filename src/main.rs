use anyhow::{Context, Result};
use tracing::{info, warn};
use video_publisher::config::{self, Config};
use video_publisher::publishing::{ApplyStatus, LanguageHandler, UploadRequest, YouTubeMetrics};
use video_publisher::storage::{StorageError, Store, VideoIndex};

fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;
    config::init_logging(config.log_format);

    info!(
        data_dir = %config.data_dir.display(),
        default_language = %config.default_language,
        "Starting video publishing preflight"
    );

    let store = Store::new(&config.data_dir, &config.index_path);
    let index = load_or_rebuild_index(&store)?;
    info!("Found {} videos in the index", index.len());

    let metrics = YouTubeMetrics::global();
    let handler = LanguageHandler::global();
    let mut skipped = 0;

    for entry in &index {
        let path = store.item_path(entry);
        let mut video = match store.load_item(&path) {
            Ok(video) => video,
            Err(e) => {
                warn!(video = %entry.name, "Skipping video: {}", e);
                skipped += 1;
                continue;
            }
        };

        let mut request = UploadRequest::from_video(&video);
        let applied =
            handler.validate_and_set_language(Some(&mut request), Some(&mut video), &config.default_language);

        if let ApplyStatus::Failed(err) = &applied.status {
            warn!(video = %entry.name, "Locale could not be applied: {}", err);
        }

        store
            .save_item(&video, &path)
            .with_context(|| format!("Failed to save video '{}'", entry.name))?;
    }

    let report = metrics.report();
    info!(
        report = %serde_json::to_string(&report)?,
        skipped,
        "Preflight complete"
    );

    Ok(())
}

fn load_or_rebuild_index(store: &Store) -> Result<Vec<VideoIndex>> {
    match store.load_index() {
        Ok(index) => Ok(index),
        Err(e @ StorageError::NotFound { .. }) => {
            info!("{}, rebuilding", e);
            let index = store.rebuild_index()?;
            store.save_index(&index)?;
            Ok(index)
        }
        Err(e) => Err(e.into()),
    }
}
