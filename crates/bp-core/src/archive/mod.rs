//! Archive domain: manifest derivation, entry naming, and the assembled stream.

mod manifest;

pub use manifest::{entry_name, ArchiveEntry, ArchiveManifest, ENTRY_PREFIX};

use bytes::Bytes;
use thiserror::Error;

use crate::MimeType;

/// One finished container, ready for download.
#[derive(Debug, Clone)]
pub struct ArchiveStream {
    /// Suggested download name, e.g. `compressed_images_1737100000000.zip`.
    pub file_name: String,
    pub content_type: MimeType,
    pub entry_count: usize,
    pub bytes: Bytes,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("nothing to archive")]
    NothingToArchive,

    #[error("failed to build archive: {0:#}")]
    Build(#[source] anyhow::Error),
}
