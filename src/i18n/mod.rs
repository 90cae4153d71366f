//! Locale support for video metadata.
//!
//! - `registry`: the set of locale codes we are willing to send to YouTube

mod registry;

pub use registry::{LanguageConfig, LanguageRegistry, DEFAULT_LANGUAGE};
