//! Conversion value types exchanged with the transcode contract.

mod format;
mod ratio;

pub use format::OutputFormat;
pub use ratio::CompressionRatio;

use bytes::Bytes;
use serde::Serialize;

use crate::MimeType;

/// Input of one single-image conversion.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub source: Bytes,
    /// Declared type of the source bytes, used when `format` is `original`.
    pub source_mime: MimeType,
    pub format: OutputFormat,
}

/// Converted image payload plus the metrics surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConvertedImage {
    #[serde(skip)]
    pub bytes: Bytes,
    pub content_type: MimeType,
    pub original_size: u64,
    pub compressed_size: u64,
    pub compression: CompressionRatio,
}

impl ConvertedImage {
    /// Builds the payload and derives the compression ratio from the two sizes.
    pub fn new(bytes: Bytes, content_type: MimeType, original_size: u64) -> Self {
        let compressed_size = bytes.len() as u64;
        Self {
            bytes,
            content_type,
            original_size,
            compressed_size,
            compression: CompressionRatio::compute(original_size, compressed_size),
        }
    }
}

/// Normalized outcome of one conversion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionResult {
    Success(ConvertedImage),
    Failure(String),
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converted_image_derives_sizes_and_ratio() {
        let image = ConvertedImage::new(
            Bytes::from(vec![0u8; 400]),
            MimeType::from("image/webp"),
            1000,
        );
        assert_eq!(image.compressed_size, 400);
        assert_eq!(image.compression.to_string(), "60.00");
    }
}
