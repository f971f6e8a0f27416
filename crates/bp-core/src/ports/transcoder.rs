use anyhow::Result;

use crate::{ConversionRequest, ConvertedImage};

/// External single-image conversion contract.
///
/// Resizes the source to the configured maximum width, preserving aspect
/// ratio, and encodes it in the requested format.
#[async_trait::async_trait]
pub trait TranscoderPort: Send + Sync {
    async fn transcode(&self, request: ConversionRequest) -> Result<ConvertedImage>;
}
