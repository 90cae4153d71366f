//! Structured log events for YouTube operations.
//!
//! Every event carries `component = "youtube"` so publishing logs can be
//! filtered out of the rest of the application's output.

use crate::publishing::errors::{Cause, YouTubeError};
use crate::publishing::metrics::YouTubeMetrics;
use tracing::{error, info, warn};

const COMPONENT: &str = "youtube";

/// Log a classified error with its kind, retryability and context identifiers.
pub fn log_youtube_error(err: &YouTubeError, message: &str) {
    let cause = err.cause().map(|c| c.to_string()).unwrap_or_default();

    error!(
        component = COMPONENT,
        error_type = %err.kind(),
        retryable = err.is_retryable(),
        video_id = err.video_id(),
        language = err.language_code(),
        cause = %cause,
        "{}: {}",
        message,
        err.message()
    );
}

/// Log the outcome of applying a locale to an outbound record.
pub fn log_language_setting(
    language: &str,
    success: bool,
    fallback: bool,
    err: Option<&YouTubeError>,
) {
    match err {
        Some(err) => error!(
            component = COMPONENT,
            language,
            success,
            fallback,
            error = %err,
            "Language setting failed"
        ),
        None if fallback => warn!(
            component = COMPONENT,
            language,
            success,
            fallback,
            "Language setting succeeded with fallback to default"
        ),
        None => info!(
            component = COMPONENT,
            language,
            success,
            fallback,
            "Language setting succeeded"
        ),
    }
}

/// Log an upload attempt.
pub fn log_upload_operation(video_id: &str, success: bool, err: Option<&YouTubeError>) {
    match err {
        Some(err) => error!(
            component = COMPONENT,
            video_id,
            success,
            error = %err,
            "Upload operation failed"
        ),
        None => info!(
            component = COMPONENT,
            video_id,
            success,
            "Upload operation succeeded"
        ),
    }
}

/// Count and log the result of an upload performed by the caller.
///
/// Returns the classified upload error on failure so the caller can decide
/// whether to retry.
pub fn record_upload_result<E>(
    metrics: &YouTubeMetrics,
    video_id: &str,
    result: Result<(), E>,
) -> Option<YouTubeError>
where
    E: Into<Cause>,
{
    match result {
        Ok(()) => {
            metrics.record_upload_success();
            log_upload_operation(video_id, true, None);
            None
        }
        Err(e) => {
            metrics.record_upload_failure();
            let err = YouTubeError::upload(video_id, Some(e.into()));
            log_upload_operation(video_id, false, Some(&err));
            Some(err)
        }
    }
}
