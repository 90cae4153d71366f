//! Video documents and the video index on disk.

mod store;
mod video;

pub use store::{CodecError, DocumentKind, StorageError, Store};
pub use video::{Sponsorship, Video, VideoIndex, PUBLISH_DATE_FORMAT};
