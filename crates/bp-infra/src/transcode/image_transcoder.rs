use std::io::Cursor;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use bp_core::ports::TranscoderPort;
use bp_core::{ConversionRequest, ConvertedImage, MimeType, OutputFormat};
use bytes::Bytes;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::codecs::webp::WebPEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, ImageFormat};
use tracing::debug;

/// In-process transcoder built on the `image` crate.
///
/// Decoding, resizing and encoding are CPU-bound and run on the blocking pool.
pub struct ImageTranscoder {
    max_width: u32,
    quality: u8,
    webp_lossless: bool,
}

impl ImageTranscoder {
    pub fn new(max_width: u32, quality: u8) -> Self {
        Self {
            max_width: max_width.max(1),
            quality: quality.clamp(1, 100),
            webp_lossless: false,
        }
    }

    /// Switches WebP output to lossless encoding. `quality` no longer applies to it.
    pub fn with_lossless_webp(mut self, lossless: bool) -> Self {
        self.webp_lossless = lossless;
        self
    }
}

#[derive(Debug, Clone, Copy)]
struct EncodeSettings {
    max_width: u32,
    quality: u8,
    webp_lossless: bool,
}

#[async_trait]
impl TranscoderPort for ImageTranscoder {
    #[tracing::instrument(
        name = "infra.image_transcoder.transcode",
        skip_all,
        fields(format = %request.format, source_size = request.source.len())
    )]
    async fn transcode(&self, request: ConversionRequest) -> Result<ConvertedImage> {
        let settings = EncodeSettings {
            max_width: self.max_width,
            quality: self.quality,
            webp_lossless: self.webp_lossless,
        };
        tokio::task::spawn_blocking(move || transcode_blocking(request, settings))
            .await
            .context("join transcode task")?
    }
}

fn transcode_blocking(request: ConversionRequest, settings: EncodeSettings) -> Result<ConvertedImage> {
    let target = match request.format {
        OutputFormat::Png => ImageFormat::Png,
        OutputFormat::Jpeg => ImageFormat::Jpeg,
        OutputFormat::Webp => ImageFormat::WebP,
        OutputFormat::Original => {
            image::guess_format(&request.source).context("detect source image format")?
        }
    };

    let decoded = image::load_from_memory(&request.source).context("decode source image")?;
    let (original_width, original_height) = decoded.dimensions();
    let (target_width, target_height) =
        calculate_target_size(original_width, original_height, settings.max_width);

    let resized = if target_width == original_width {
        decoded
    } else {
        DynamicImage::ImageRgba8(image::imageops::resize(
            &decoded,
            target_width,
            target_height,
            FilterType::Triangle,
        ))
    };
    debug!(
        original_width,
        original_height,
        target_width,
        target_height,
        "Resized source image"
    );

    let (content_type, encoded) = encode(&resized, target, settings)?;
    Ok(ConvertedImage::new(
        Bytes::from(encoded),
        content_type,
        request.source.len() as u64,
    ))
}

fn encode(
    image: &DynamicImage,
    format: ImageFormat,
    settings: EncodeSettings,
) -> Result<(MimeType, Vec<u8>)> {
    let mut out = Vec::new();
    let (width, height) = image.dimensions();
    let content_type = match format {
        ImageFormat::Jpeg => {
            // JPEG has no alpha channel
            let rgb = image.to_rgb8();
            JpegEncoder::new_with_quality(Cursor::new(&mut out), settings.quality)
                .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
                .context("encode image to jpeg")?;
            "image/jpeg"
        }
        ImageFormat::Png => {
            let rgba = image.to_rgba8();
            PngEncoder::new_with_quality(&mut out, CompressionType::Best, PngFilter::Adaptive)
                .write_image(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .context("encode image to png")?;
            "image/png"
        }
        ImageFormat::WebP if settings.webp_lossless => {
            let rgba = image.to_rgba8();
            WebPEncoder::new_lossless(&mut out)
                .encode(rgba.as_raw(), width, height, ExtendedColorType::Rgba8)
                .context("encode image to webp")?;
            "image/webp"
        }
        ImageFormat::WebP => {
            // libwebp only accepts 8-bit RGB(A) input
            let rgba = DynamicImage::ImageRgba8(image.to_rgba8());
            let encoder = webp::Encoder::from_image(&rgba)
                .map_err(|e| anyhow!("encode image to webp: {e}"))?;
            out = encoder.encode(f32::from(settings.quality)).to_vec();
            "image/webp"
        }
        other => bail!("unsupported output format {other:?}"),
    };
    Ok((MimeType::from(content_type), out))
}

/// Caps the width at `max_width` and scales the height to match. Never upscales.
fn calculate_target_size(width: u32, height: u32, max_width: u32) -> (u32, u32) {
    if width <= max_width {
        return (width, height);
    }
    let scaled_height = ((height as f64) * (max_width as f64) / (width as f64)).round() as u32;
    (max_width, scaled_height.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_source(width: u32, height: u32) -> Bytes {
        let image = image::RgbImage::from_pixel(width, height, image::Rgb([200, 30, 30]));
        let mut png_bytes = Vec::new();
        DynamicImage::ImageRgb8(image)
            .write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)
            .unwrap();
        Bytes::from(png_bytes)
    }

    /// Noisy gradient saved as a JPEG, close enough to a photo for size comparisons.
    fn photo_like_jpeg(width: u32, height: u32) -> Bytes {
        let mut seed: u32 = 0x2545_f491;
        let image = image::RgbImage::from_fn(width, height, |x, y| {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let noise = (seed % 12) as u8;
            image::Rgb([
                ((x * 255 / width) as u8).saturating_add(noise),
                ((y * 255 / height) as u8).saturating_add(noise / 2),
                (((x + y) * 127 / (width + height)) as u8).saturating_add(noise),
            ])
        });
        let mut jpeg_bytes = Vec::new();
        JpegEncoder::new_with_quality(Cursor::new(&mut jpeg_bytes), 80)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
        Bytes::from(jpeg_bytes)
    }

    fn gif_source(width: u32, height: u32) -> Bytes {
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 120, 220, 255]));
        let mut gif_bytes = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut gif_bytes), ImageFormat::Gif)
            .unwrap();
        Bytes::from(gif_bytes)
    }

    fn request(source: Bytes, format: OutputFormat) -> ConversionRequest {
        ConversionRequest {
            source,
            source_mime: MimeType::from("image/png"),
            format,
        }
    }

    #[test]
    fn target_size_caps_width_only() {
        assert_eq!(calculate_target_size(1600, 1200, 800), (800, 600));
        assert_eq!(calculate_target_size(400, 3000, 800), (400, 3000));
        assert_eq!(calculate_target_size(5000, 1, 800), (800, 1));
    }

    #[tokio::test]
    async fn resizes_wide_images_to_max_width() {
        let transcoder = ImageTranscoder::new(800, 80);
        let source = png_source(1600, 400);

        let output = transcoder
            .transcode(request(source.clone(), OutputFormat::Webp))
            .await
            .unwrap();

        assert_eq!(output.content_type.as_str(), "image/webp");
        assert_eq!(output.original_size, source.len() as u64);
        assert_eq!(output.compressed_size, output.bytes.len() as u64);
        let decoded = image::load_from_memory(&output.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (800, 200));
    }

    #[tokio::test]
    async fn honours_requested_format() {
        let transcoder = ImageTranscoder::new(800, 80);
        let source = png_source(64, 32);

        let jpeg = transcoder
            .transcode(request(source.clone(), OutputFormat::Jpeg))
            .await
            .unwrap();
        assert_eq!(jpeg.content_type.as_str(), "image/jpeg");
        assert_eq!(image::guess_format(&jpeg.bytes).unwrap(), ImageFormat::Jpeg);

        let png = transcoder
            .transcode(request(source, OutputFormat::Png))
            .await
            .unwrap();
        assert_eq!(png.content_type.as_str(), "image/png");
        let decoded = image::load_from_memory(&png.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (64, 32));
    }

    #[tokio::test]
    async fn original_keeps_source_format() {
        let transcoder = ImageTranscoder::new(800, 80);
        let output = transcoder
            .transcode(request(png_source(10, 10), OutputFormat::Original))
            .await
            .unwrap();
        assert_eq!(output.content_type.as_str(), "image/png");
    }

    #[tokio::test]
    async fn webp_from_photo_does_not_grow() {
        let transcoder = ImageTranscoder::new(800, 80);
        let source = photo_like_jpeg(800, 600);

        let output = transcoder
            .transcode(ConversionRequest {
                source_mime: MimeType::from("image/jpeg"),
                ..request(source.clone(), OutputFormat::Webp)
            })
            .await
            .unwrap();

        assert_eq!(output.content_type.as_str(), "image/webp");
        assert!(
            output.compression.percentage() >= 0.0,
            "webp output {} bytes from a {} byte jpeg",
            output.compressed_size,
            source.len()
        );
    }

    #[tokio::test]
    async fn lossless_webp_is_opt_in() {
        let source = png_source(32, 32);
        let lossless = ImageTranscoder::new(800, 80)
            .with_lossless_webp(true)
            .transcode(request(source, OutputFormat::Webp))
            .await
            .unwrap();

        let decoded = image::load_from_memory(&lossless.bytes).unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(5, 5), &image::Rgb([200, 30, 30]));
    }

    #[tokio::test]
    async fn converts_gif_sources() {
        let transcoder = ImageTranscoder::new(800, 80);
        let output = transcoder
            .transcode(ConversionRequest {
                source_mime: MimeType::from("image/gif"),
                ..request(gif_source(40, 20), OutputFormat::Webp)
            })
            .await
            .unwrap();

        assert_eq!(output.content_type.as_str(), "image/webp");
        let decoded = image::load_from_memory(&output.bytes).unwrap();
        assert_eq!(decoded.dimensions(), (40, 20));
    }

    #[tokio::test]
    async fn undecodable_source_is_an_error() {
        let transcoder = ImageTranscoder::new(800, 80);
        let err = transcoder
            .transcode(request(Bytes::from_static(b"not an image"), OutputFormat::Webp))
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("decode source image"));
    }
}
