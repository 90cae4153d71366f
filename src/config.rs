use crate::i18n::{LanguageRegistry, DEFAULT_LANGUAGE};
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Output format for log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => bail!("LOG_FORMAT must be 'text' or 'json', got '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    // Storage
    pub data_dir: PathBuf,
    pub index_path: PathBuf,

    // Publishing
    pub default_language: String,

    // Logging
    pub log_format: LogFormat,
}

impl Config {
    /// Read configuration from the environment.
    ///
    /// Callers load `.env` with `dotenvy` first.
    pub fn from_env() -> Result<Self> {
        let data_dir = PathBuf::from(
            std::env::var("VIDEO_DATA_DIR").unwrap_or_else(|_| "manuscript".to_string()),
        );
        let index_path = std::env::var("VIDEO_INDEX_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("index.json"));

        let default_language =
            std::env::var("DEFAULT_LANGUAGE").unwrap_or_else(|_| DEFAULT_LANGUAGE.to_string());
        if !LanguageRegistry::get().is_valid(&default_language) {
            bail!(
                "DEFAULT_LANGUAGE '{}' is not a supported language code",
                default_language
            );
        }

        let log_format = match std::env::var("LOG_FORMAT") {
            Ok(value) => value.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            data_dir,
            index_path,
            default_language,
            log_format,
        })
    }
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` overrides the default `video_publisher=info` directive.
pub fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("video_publisher=info"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}
