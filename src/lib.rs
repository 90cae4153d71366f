//! Video metadata storage and YouTube locale publishing.

pub mod config;
pub mod i18n;
pub mod publishing;
pub mod storage;
