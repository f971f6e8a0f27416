use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use bp_core::archive::entry_name;
use bp_core::ItemStore;
use tracing::info;

/// Writes the converted output of one done item to a directory, named the
/// same way archive entries are.
pub struct ExportConvertedItem {
    store: Arc<ItemStore>,
}

impl ExportConvertedItem {
    pub fn new(store: Arc<ItemStore>) -> Self {
        Self { store }
    }

    #[tracing::instrument(name = "usecase.export_item.execute", skip(self, dir), fields(dir = %dir.display()))]
    pub async fn execute(&self, index: usize, dir: &Path) -> Result<PathBuf> {
        let (name, output) = self.store.done_output(index)?;
        let path = dir.join(entry_name(&name));
        tokio::fs::write(&path, &output.bytes)
            .await
            .with_context(|| format!("Failed to write converted image: {}", path.display()))?;
        info!(path = %path.display(), size = output.compressed_size, "Exported converted image");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::{BatchLimits, ConversionResult, ConvertedImage, MimeType, SourceFile};
    use bytes::Bytes;

    #[tokio::test]
    async fn writes_prefixed_file() {
        let store = Arc::new(ItemStore::new(BatchLimits::default()));
        store
            .add(vec![SourceFile::new("shots/cat.png", "image/png", vec![1u8; 32])])
            .unwrap();
        let id = store.snapshot()[0].id.clone();
        store.begin_conversion(&id).unwrap();
        store
            .record_outcome(
                &id,
                ConversionResult::Success(ConvertedImage::new(
                    Bytes::from_static(b"webp-bytes"),
                    MimeType::from("image/webp"),
                    32,
                )),
            )
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let path = ExportConvertedItem::new(store)
            .execute(0, dir.path())
            .await
            .unwrap();

        assert_eq!(path, dir.path().join("compressed-cat.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"webp-bytes");
    }

    #[tokio::test]
    async fn refuses_items_without_output() {
        let store = Arc::new(ItemStore::new(BatchLimits::default()));
        store
            .add(vec![SourceFile::new("a.png", "image/png", vec![1u8; 8])])
            .unwrap();
        let dir = tempfile::tempdir().unwrap();

        let err = ExportConvertedItem::new(store)
            .execute(0, dir.path())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("no converted output"), "{err}");
    }
}
