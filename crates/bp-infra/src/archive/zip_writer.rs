use std::io::{Cursor, Write};

use anyhow::{Context, Result};
use async_trait::async_trait;
use bp_core::ports::ArchiveWriterPort;
use bp_core::{ArchiveEntry, MimeType};
use bytes::Bytes;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Zip container with every entry deflated at one level.
pub struct ZipArchiveWriter {
    compression_level: i64,
}

impl ZipArchiveWriter {
    /// `compression_level` is clamped to the deflate range 0-9.
    pub fn new(compression_level: i64) -> Self {
        Self {
            compression_level: compression_level.clamp(0, 9),
        }
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new(9)
    }
}

#[async_trait]
impl ArchiveWriterPort for ZipArchiveWriter {
    fn content_type(&self) -> MimeType {
        MimeType::application_zip()
    }

    fn extension(&self) -> &'static str {
        "zip"
    }

    #[tracing::instrument(name = "infra.zip_writer.write_archive", skip_all, fields(entries = entries.len()))]
    async fn write_archive(&self, entries: Vec<ArchiveEntry>) -> Result<Bytes> {
        let level = self.compression_level;
        tokio::task::spawn_blocking(move || write_zip(entries, level))
            .await
            .context("join zip writer task")?
    }
}

fn write_zip(entries: Vec<ArchiveEntry>, level: i64) -> Result<Bytes> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for entry in &entries {
        writer
            .start_file(entry.name.as_str(), options)
            .with_context(|| format!("start zip entry {}", entry.name))?;
        writer
            .write_all(&entry.bytes)
            .with_context(|| format!("write zip entry {}", entry.name))?;
    }
    let buffer = writer.finish().context("finish zip archive")?.into_inner();
    debug!(entries = entries.len(), size = buffer.len(), "Wrote zip archive");
    Ok(Bytes::from(buffer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn entry(name: &str, bytes: &[u8]) -> ArchiveEntry {
        ArchiveEntry {
            name: name.to_string(),
            bytes: Bytes::copy_from_slice(bytes),
        }
    }

    #[tokio::test]
    async fn entries_read_back_in_order() {
        let writer = ZipArchiveWriter::default();
        let bytes = writer
            .write_archive(vec![
                entry("compressed-a.webp", &[1u8; 2048]),
                entry("compressed-b.webp", b"second"),
            ])
            .await
            .unwrap();

        let mut archive = zip::ZipArchive::new(Cursor::new(bytes.to_vec())).unwrap();
        assert_eq!(archive.len(), 2);

        let mut first = archive.by_index(0).unwrap();
        assert_eq!(first.name(), "compressed-a.webp");
        assert_eq!(first.compression(), CompressionMethod::Deflated);
        let mut content = Vec::new();
        first.read_to_end(&mut content).unwrap();
        assert_eq!(content, vec![1u8; 2048]);
        drop(first);

        let mut second = archive.by_name("compressed-b.webp").unwrap();
        let mut content = String::new();
        second.read_to_string(&mut content).unwrap();
        assert_eq!(content, "second");
    }

    #[tokio::test]
    async fn reports_zip_content_type() {
        let writer = ZipArchiveWriter::new(42);
        assert_eq!(writer.content_type().as_str(), "application/zip");
        assert_eq!(writer.extension(), "zip");
        assert_eq!(writer.compression_level, 9);
    }
}
