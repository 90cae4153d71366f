//! File-backed persistence for video documents and the video index.
//!
//! Each video lives in its own YAML document at
//! `<data_dir>/<category>/<name>.yaml`. The index is a single JSON array of
//! [`VideoIndex`] entries used for listing without opening every document. The
//! video documents are authoritative; the index is rewritten independently and
//! may lag behind them.
//!
//! Writes go to a temporary file in the destination directory which is then
//! renamed over the target, so a failed write never leaves a half-written
//! document behind. Nothing is locked: concurrent writers to the same file race
//! and the last rename wins.

use crate::storage::{Video, VideoIndex};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, error, info};

/// Which kind of document an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Video,
    Index,
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Video => write!(f, "video data"),
            DocumentKind::Index => write!(f, "video index"),
        }
    }
}

impl DocumentKind {
    /// Video documents are YAML, the index is JSON.
    fn decode<T: DeserializeOwned>(self, content: &str) -> std::result::Result<T, CodecError> {
        match self {
            DocumentKind::Video => Ok(serde_yaml::from_str(content)?),
            DocumentKind::Index => Ok(serde_json::from_str(content)?),
        }
    }

    fn encode<T: Serialize + ?Sized>(self, value: &T) -> std::result::Result<Vec<u8>, CodecError> {
        match self {
            DocumentKind::Video => Ok(serde_yaml::to_string(value)?.into_bytes()),
            DocumentKind::Index => {
                let mut content = serde_json::to_vec_pretty(value)?;
                content.push(b'\n');
                Ok(content)
            }
        }
    }
}

/// Serialization failure in either document format.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Persistence failures. Callers can tell a missing document apart from a
/// corrupt one and from an I/O problem.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("{document} not found at {}", path.display())]
    NotFound { document: DocumentKind, path: PathBuf },

    #[error("failed to unmarshal {document} from {}: {source}", path.display())]
    Decode {
        document: DocumentKind,
        path: PathBuf,
        #[source]
        source: CodecError,
    },

    #[error("failed to marshal {document}: {source}")]
    Encode {
        document: DocumentKind,
        #[source]
        source: CodecError,
    },

    #[error("failed to read {document} from {}: {source}", path.display())]
    Read {
        document: DocumentKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {document} to {}: {source}", path.display())]
    Write {
        document: DocumentKind,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Whether the document did not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Reads and writes video documents and the index.
#[derive(Debug, Clone)]
pub struct Store {
    data_dir: PathBuf,
    index_path: PathBuf,
}

impl Store {
    /// Store rooted at `data_dir` with the index at `index_path`.
    pub fn new(data_dir: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            index_path: index_path.into(),
        }
    }

    /// Root directory of the video documents.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Location of the index document.
    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    /// Location of the document for an index entry.
    pub fn item_path(&self, entry: &VideoIndex) -> PathBuf {
        self.data_dir
            .join(&entry.category)
            .join(format!("{}.yaml", file_stem(&entry.name)))
    }

    /// Load a video document.
    pub fn load_item(&self, path: impl AsRef<Path>) -> Result<Video> {
        read_document(path.as_ref(), DocumentKind::Video)
    }

    /// Write a video document, replacing any existing content.
    pub fn save_item(&self, video: &Video, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        write_document(video, path, DocumentKind::Video)?;
        debug!(name = %video.name, path = %path.display(), "Video saved");
        Ok(())
    }

    /// Load the index, preserving entry order.
    pub fn load_index(&self) -> Result<Vec<VideoIndex>> {
        read_document(&self.index_path, DocumentKind::Index)
    }

    /// Rewrite the whole index.
    ///
    /// Failures are logged here as well as returned.
    pub fn save_index(&self, entries: &[VideoIndex]) -> Result<()> {
        if let Err(e) = write_document(&entries, &self.index_path, DocumentKind::Index) {
            error!(path = %self.index_path.display(), error = %e, "Failed to write video index");
            return Err(e);
        }

        debug!(path = %self.index_path.display(), entries = entries.len(), "Index saved");
        Ok(())
    }

    /// Rebuild the index from the video documents under the data directory.
    ///
    /// Scans `<data_dir>/<category>/*.yaml` (or `.yml`), ordered by category
    /// then name. A document that fails to load fails the rebuild.
    pub fn rebuild_index(&self) -> Result<Vec<VideoIndex>> {
        let mut entries = Vec::new();
        let index_path = self.index_path.canonicalize().ok();

        for category_dir in read_dir_sorted(&self.data_dir)? {
            if !category_dir.is_dir() {
                continue;
            }

            for path in read_dir_sorted(&category_dir)? {
                if !is_document(&path) || is_same_file(&path, index_path.as_deref()) {
                    continue;
                }

                let video = self.load_item(&path)?;
                entries.push(VideoIndex::from(&video));
            }
        }

        entries.sort_by(|a, b| (&a.category, &a.name).cmp(&(&b.category, &b.name)));

        info!(
            data_dir = %self.data_dir.display(),
            entries = entries.len(),
            "Index rebuilt from video documents"
        );
        Ok(entries)
    }
}

/// File stem for a video name: lower-cased, spaces replaced with dashes.
fn file_stem(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "-")
}

fn is_document(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == "yaml" || ext == "yml")
}

fn is_same_file(path: &Path, canonical: Option<&Path>) -> bool {
    match (path.canonicalize(), canonical) {
        (Ok(path), Some(canonical)) => path == canonical,
        _ => false,
    }
}

fn read_dir_sorted(dir: &Path) -> Result<Vec<PathBuf>> {
    let read_err = |source| StorageError::Read {
        document: DocumentKind::Video,
        path: dir.to_path_buf(),
        source,
    };

    let mut paths = std::fs::read_dir(dir)
        .map_err(read_err)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<Vec<_>>>()
        .map_err(read_err)?;
    paths.sort();
    Ok(paths)
}

fn read_document<T: DeserializeOwned>(path: &Path, document: DocumentKind) -> Result<T> {
    let content = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            StorageError::NotFound {
                document,
                path: path.to_path_buf(),
            }
        } else {
            StorageError::Read {
                document,
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    document.decode(&content).map_err(|source| StorageError::Decode {
        document,
        path: path.to_path_buf(),
        source,
    })
}

fn write_document<T: Serialize + ?Sized>(value: &T, path: &Path, document: DocumentKind) -> Result<()> {
    let content = document
        .encode(value)
        .map_err(|source| StorageError::Encode { document, source })?;

    let write_err = |source| StorageError::Write {
        document,
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(write_err)?;

    let mut file = NamedTempFile::new_in(dir).map_err(write_err)?;
    file.write_all(&content).map_err(write_err)?;
    file.as_file().sync_all().map_err(write_err)?;
    file.persist(path).map_err(|e| write_err(e.error))?;

    Ok(())
}
