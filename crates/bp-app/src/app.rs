use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use bp_core::ports::PreviewRegistryPort;
use bp_core::{ArchiveError, ArchiveStream, BatchLimits, ItemStore, PreviewHandle};

use crate::usecases::{ArchiveAssembler, BatchConductor, ExportConvertedItem, TranscodeClient};
use crate::AppDeps;

/// Runtime knobs of the use cases, resolved from configuration by the caller.
#[derive(Debug, Clone, Copy)]
pub struct AppSettings {
    pub limits: BatchLimits,
    pub transcode_timeout: Duration,
    pub max_output_size: u64,
}

/// One in-memory batch session with its use cases wired to the same store.
pub struct App {
    pub store: Arc<ItemStore>,
    pub conductor: Arc<BatchConductor>,
    pub assembler: ArchiveAssembler,
    pub exporter: ExportConvertedItem,
    previews: Option<Arc<dyn PreviewRegistryPort>>,
}

impl App {
    pub fn new(deps: AppDeps, settings: AppSettings) -> Self {
        let previews = deps.previews;
        let store = Arc::new(match previews.clone() {
            Some(previews) => ItemStore::with_previews(settings.limits, previews),
            None => ItemStore::new(settings.limits),
        });
        let client = Arc::new(TranscodeClient::new(
            deps.transcoder,
            settings.transcode_timeout,
            settings.max_output_size,
        ));

        Self {
            conductor: Arc::new(BatchConductor::new(store.clone(), client)),
            assembler: ArchiveAssembler::new(deps.archive_writer, deps.clock),
            exporter: ExportConvertedItem::new(store.clone()),
            store,
            previews,
        }
    }

    /// Thumbnail of an admitted item, through the preview registry.
    pub fn render_preview(&self, handle: &PreviewHandle) -> Result<Vec<u8>> {
        let previews = self
            .previews
            .as_ref()
            .ok_or_else(|| anyhow!("previews are disabled"))?;
        previews.render(handle)
    }

    /// Archive of every item currently done.
    pub async fn assemble_archive(&self) -> Result<ArchiveStream, ArchiveError> {
        self.assembler.assemble_done(&self.store).await
    }
}
