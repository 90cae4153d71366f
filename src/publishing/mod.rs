//! YouTube publishing support.
//!
//! - `errors`: error taxonomy and classification of upstream failures
//! - `language`: locale validation, fallback and application
//! - `logging`: structured log events for YouTube operations
//! - `metrics`: counters for locale and upload outcomes

pub mod errors;
pub mod language;
pub mod logging;
pub mod metrics;

pub use errors::{classify, ApiError, Cause, ErrorKind, YouTubeError};
pub use language::{
    AppliedLanguages, ApplyStatus, LanguageHandler, LocaleTarget, UploadRequest, VideoSnippet,
};
pub use logging::record_upload_result;
pub use metrics::{MetricsReport, YouTubeMetrics};
