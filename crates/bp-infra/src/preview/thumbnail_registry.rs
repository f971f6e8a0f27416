use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use anyhow::{anyhow, Context, Result};
use bp_core::ports::PreviewRegistryPort;
use bp_core::{ItemId, PreviewHandle};
use bytes::Bytes;
use image::{imageops::FilterType, ExtendedColorType, GenericImageView};
use tracing::{debug, warn};

/// Preview handles backed by the item's own source bytes.
///
/// `acquire` only registers the bytes under a fresh handle; the thumbnail is
/// rendered on demand through [`PreviewRegistryPort::render`]. Each handle
/// belongs to exactly one item and is released when the item leaves the batch.
pub struct ThumbnailPreviewRegistry {
    max_edge: u32,
    sources: Mutex<HashMap<PreviewHandle, Bytes>>,
}

impl ThumbnailPreviewRegistry {
    pub fn new(max_edge: u32) -> Self {
        Self {
            max_edge: max_edge.max(1),
            sources: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PreviewHandle, Bytes>> {
        self.sources.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of handles currently held.
    pub fn live_handles(&self) -> usize {
        self.lock().len()
    }
}

impl PreviewRegistryPort for ThumbnailPreviewRegistry {
    fn acquire(&self, item_id: &ItemId, source: &Bytes) -> Option<PreviewHandle> {
        let handle = PreviewHandle::new();
        self.lock().insert(handle.clone(), source.clone());
        debug!(%item_id, preview = %handle, "Acquired preview handle");
        Some(handle)
    }

    fn release(&self, handle: &PreviewHandle) {
        if self.lock().remove(handle).is_none() {
            warn!(preview = %handle, "Released unknown preview handle");
        }
    }

    /// Renders a lossless WebP thumbnail whose longest edge is at most `max_edge`.
    fn render(&self, handle: &PreviewHandle) -> Result<Vec<u8>> {
        let source = self
            .lock()
            .get(handle)
            .cloned()
            .ok_or_else(|| anyhow!("unknown preview handle {handle}"))?;

        let decoded = image::load_from_memory(&source).context("decode image bytes for preview")?;
        let (width, height) = decoded.dimensions();
        let (target_width, target_height) = fit_within(width, height, self.max_edge);
        let rgba = if (target_width, target_height) == (width, height) {
            decoded.to_rgba8()
        } else {
            image::imageops::resize(&decoded, target_width, target_height, FilterType::Triangle)
        };

        let mut out = Vec::new();
        image::codecs::webp::WebPEncoder::new_lossless(&mut out)
            .encode(
                rgba.as_raw(),
                rgba.width(),
                rgba.height(),
                ExtendedColorType::Rgba8,
            )
            .context("encode preview to webp")?;
        Ok(out)
    }
}

fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    if width <= max_edge && height <= max_edge {
        return (width, height);
    }

    if width >= height {
        let scaled_height = ((height as f64) * (max_edge as f64) / (width as f64)).round() as u32;
        (max_edge, scaled_height.max(1))
    } else {
        let scaled_width = ((width as f64) * (max_edge as f64) / (height as f64)).round() as u32;
        (scaled_width.max(1), max_edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(width: u32, height: u32) -> Bytes {
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::new(width, height))
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageFormat::Png,
            )
            .unwrap();
        Bytes::from(bytes)
    }

    #[test]
    fn render_fits_longest_edge() {
        let registry = ThumbnailPreviewRegistry::new(128);
        let handle = registry.acquire(&ItemId::new(), &png(128, 256)).unwrap();

        let preview = registry.render(&handle).unwrap();

        let decoded = image::load_from_memory(&preview).unwrap();
        assert_eq!(decoded.dimensions(), (64, 128));
    }

    #[test]
    fn release_drops_the_handle() {
        let registry = ThumbnailPreviewRegistry::new(128);
        let handle = registry.acquire(&ItemId::new(), &png(4, 4)).unwrap();
        assert_eq!(registry.live_handles(), 1);

        registry.release(&handle);

        assert_eq!(registry.live_handles(), 0);
        assert!(registry.render(&handle).is_err());
    }
}
