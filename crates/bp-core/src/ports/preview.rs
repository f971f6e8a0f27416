use anyhow::Result;
use bytes::Bytes;

use crate::ids::PreviewHandle;
use crate::ItemId;

/// Registry of transient preview resources tied to batch items.
///
/// The item store acquires a handle when an item is admitted and releases it
/// exactly once when the item leaves the batch.
pub trait PreviewRegistryPort: Send + Sync {
    /// Returns `None` when no preview could be produced; the item is still admitted.
    fn acquire(&self, item_id: &ItemId, source: &Bytes) -> Option<PreviewHandle>;

    fn release(&self, handle: &PreviewHandle);

    /// Encoded thumbnail for a live handle. Fails once the handle is released.
    fn render(&self, handle: &PreviewHandle) -> Result<Vec<u8>>;
}
