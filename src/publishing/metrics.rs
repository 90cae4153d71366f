//! YouTube operation metrics.
//!
//! Counters for locale validation and upload outcomes. Every counter update and
//! read is a single atomic operation, so one instance can be shared freely
//! across threads. The pipeline takes a `&YouTubeMetrics`; binaries pass
//! [`YouTubeMetrics::global`], tests build their own with [`YouTubeMetrics::new`].

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;

/// Counters for YouTube operations.
#[derive(Debug, Default)]
pub struct YouTubeMetrics {
    /// Locale values successfully applied to an outbound record
    language_set_success: AtomicU64,

    /// Attempts to apply locale values that failed
    language_set_failure: AtomicU64,

    /// Successful uploads
    upload_success: AtomicU64,

    /// Failed uploads
    upload_failure: AtomicU64,

    /// Pipeline invocations (one per video, not per field)
    language_validation: AtomicU64,

    /// Locale fields replaced by the default after failing validation
    language_fallback: AtomicU64,
}

/// Global metrics instance (initialized lazily)
static METRICS: OnceLock<YouTubeMetrics> = OnceLock::new();

impl YouTubeMetrics {
    /// Create a zeroed, independent metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the process-wide metrics instance.
    pub fn global() -> &'static YouTubeMetrics {
        METRICS.get_or_init(YouTubeMetrics::new)
    }

    /// Record locale values applied to an outbound record.
    pub fn record_language_set_success(&self) {
        self.language_set_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed attempt to apply locale values.
    pub fn record_language_set_failure(&self) {
        self.language_set_failure.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful upload.
    pub fn record_upload_success(&self) {
        self.upload_success.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed upload.
    pub fn record_upload_failure(&self) {
        self.upload_failure.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one run of locale validation (once per video).
    pub fn record_language_validation(&self) {
        self.language_validation.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a locale field replaced by the default.
    pub fn record_language_fallback(&self) {
        self.language_fallback.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the number of successful locale applications.
    pub fn language_set_success(&self) -> u64 {
        self.language_set_success.load(Ordering::Relaxed)
    }

    /// Get the number of failed locale applications.
    pub fn language_set_failure(&self) -> u64 {
        self.language_set_failure.load(Ordering::Relaxed)
    }

    /// Get the number of successful uploads.
    pub fn upload_success(&self) -> u64 {
        self.upload_success.load(Ordering::Relaxed)
    }

    /// Get the number of failed uploads.
    pub fn upload_failure(&self) -> u64 {
        self.upload_failure.load(Ordering::Relaxed)
    }

    /// Get the number of locale validation runs.
    pub fn language_validation(&self) -> u64 {
        self.language_validation.load(Ordering::Relaxed)
    }

    /// Get the number of locale fields that fell back to the default.
    pub fn language_fallback(&self) -> u64 {
        self.language_fallback.load(Ordering::Relaxed)
    }

    /// Total locale-setting attempts (success + failure).
    pub fn language_set_total(&self) -> u64 {
        self.language_set_success() + self.language_set_failure()
    }

    /// Total upload attempts (success + failure).
    pub fn upload_total(&self) -> u64 {
        self.upload_success() + self.upload_failure()
    }

    /// Locale-setting success ratio in `0.0..=1.0`; `0.0` when nothing was attempted.
    pub fn language_set_success_rate(&self) -> f64 {
        success_rate(self.language_set_success(), self.language_set_failure())
    }

    /// Upload success ratio in `0.0..=1.0`; `0.0` when nothing was attempted.
    pub fn upload_success_rate(&self) -> f64 {
        success_rate(self.upload_success(), self.upload_failure())
    }

    /// Zero every counter.
    ///
    /// Each counter is reset atomically on its own; a concurrent reader may
    /// observe some counters already zeroed and others not yet.
    pub fn reset(&self) {
        self.language_set_success.store(0, Ordering::Relaxed);
        self.language_set_failure.store(0, Ordering::Relaxed);
        self.upload_success.store(0, Ordering::Relaxed);
        self.upload_failure.store(0, Ordering::Relaxed);
        self.language_validation.store(0, Ordering::Relaxed);
        self.language_fallback.store(0, Ordering::Relaxed);
    }

    /// Generate a metrics report.
    pub fn report(&self) -> MetricsReport {
        let language_set_success = self.language_set_success();
        let language_set_failure = self.language_set_failure();
        let upload_success = self.upload_success();
        let upload_failure = self.upload_failure();

        MetricsReport {
            language_set_success,
            language_set_failure,
            language_set_success_rate: success_rate(language_set_success, language_set_failure),
            upload_success,
            upload_failure,
            upload_success_rate: success_rate(upload_success, upload_failure),
            language_validation: self.language_validation(),
            language_fallback: self.language_fallback(),
        }
    }
}

fn success_rate(success: u64, failure: u64) -> f64 {
    let total = success + failure;
    if total == 0 {
        0.0
    } else {
        success as f64 / total as f64
    }
}

/// Point-in-time snapshot of [`YouTubeMetrics`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsReport {
    pub language_set_success: u64,
    pub language_set_failure: u64,
    /// Ratio in 0.0-1.0
    pub language_set_success_rate: f64,
    pub upload_success: u64,
    pub upload_failure: u64,
    /// Ratio in 0.0-1.0
    pub upload_success_rate: f64,
    pub language_validation: u64,
    pub language_fallback: u64,
}
