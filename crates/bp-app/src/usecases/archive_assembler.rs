use std::sync::Arc;

use bp_core::ports::{ArchiveWriterPort, ClockPort};
use bp_core::{ArchiveError, ArchiveManifest, ArchiveStream, ItemStore};
use bytes::Bytes;
use tracing::{error, info, warn};

/// Builds one downloadable container from converted outputs.
///
/// Agnostic to the container format: the writer port decides it and reports
/// the content type and extension used for the suggested file name.
pub struct ArchiveAssembler {
    writer: Arc<dyn ArchiveWriterPort>,
    clock: Arc<dyn ClockPort>,
}

impl ArchiveAssembler {
    pub fn new(writer: Arc<dyn ArchiveWriterPort>, clock: Arc<dyn ClockPort>) -> Self {
        Self { writer, clock }
    }

    /// Archives every item of `store` currently in the done state, in batch order.
    pub async fn assemble_done(&self, store: &ItemStore) -> Result<ArchiveStream, ArchiveError> {
        let sources = store
            .done_outputs()
            .into_iter()
            .map(|(name, output)| (name, output.bytes))
            .collect::<Vec<_>>();
        self.assemble(sources).await
    }

    /// Archives the given (original name, bytes) pairs.
    ///
    /// Entry names are derived from the original names with the
    /// `compressed-` prefix. Fails as a whole when there is nothing to
    /// include or the writer fails; no partial archive is returned.
    #[tracing::instrument(
        name = "usecase.archive_assembler.assemble",
        skip_all,
        fields(sources = sources.len())
    )]
    pub async fn assemble(&self, sources: Vec<(String, Bytes)>) -> Result<ArchiveStream, ArchiveError> {
        let manifest = ArchiveManifest::from_sources(sources);
        if manifest.is_empty() {
            warn!("No converted images to archive");
            return Err(ArchiveError::NothingToArchive);
        }

        let entry_count = manifest.len();
        let bytes = self
            .writer
            .write_archive(manifest.into_entries())
            .await
            .map_err(|err| {
                error!(error = %format!("{err:#}"), "Archive writer failed");
                ArchiveError::Build(err)
            })?;

        let file_name = format!(
            "compressed_images_{}.{}",
            self.clock.now_ms(),
            self.writer.extension()
        );
        info!(%file_name, entry_count, size = bytes.len(), "Assembled archive");

        Ok(ArchiveStream {
            file_name,
            content_type: self.writer.content_type(),
            entry_count,
            bytes,
        })
    }
}
