use anyhow::Result;
use bytes::Bytes;

use crate::{ArchiveEntry, MimeType};

/// Archive-building contract: ordered (name, bytes) entries in, one
/// self-contained container out.
///
/// The container format is the implementation's choice; callers only rely
/// on the content type and file extension it reports.
#[async_trait::async_trait]
pub trait ArchiveWriterPort: Send + Sync {
    fn content_type(&self) -> MimeType;

    fn extension(&self) -> &'static str;

    /// Writes every entry or fails as a whole.
    async fn write_archive(&self, entries: Vec<ArchiveEntry>) -> Result<Bytes>;
}
