use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use bp_core::ports::TranscoderPort;
use bp_core::{ConversionRequest, ConversionResult};
use futures::FutureExt;
use tracing::{debug, warn};

/// Wraps the transcode port with normalized success/failure semantics.
///
/// Every failure path (adapter error, panic, timeout, empty or oversized
/// output) collapses into `ConversionResult::Failure` with a short reason.
/// Holds no state between calls.
pub struct TranscodeClient {
    transcoder: Arc<dyn TranscoderPort>,
    timeout: Duration,
    max_output_size: u64,
}

impl TranscodeClient {
    pub fn new(transcoder: Arc<dyn TranscoderPort>, timeout: Duration, max_output_size: u64) -> Self {
        Self {
            transcoder,
            timeout,
            max_output_size,
        }
    }

    #[tracing::instrument(
        name = "usecase.transcode_client.convert",
        skip_all,
        fields(format = %request.format, source_size = request.source.len())
    )]
    pub async fn convert(&self, request: ConversionRequest) -> ConversionResult {
        let call = AssertUnwindSafe(self.transcoder.transcode(request)).catch_unwind();
        let output = match tokio::time::timeout(self.timeout, call).await {
            Err(_) => {
                warn!(timeout_ms = self.timeout.as_millis() as u64, "Transcode timed out");
                return ConversionResult::Failure("timed out".to_string());
            }
            Ok(Err(_panic)) => {
                warn!("Transcoder panicked");
                return ConversionResult::Failure("conversion aborted unexpectedly".to_string());
            }
            Ok(Ok(Err(err))) => {
                warn!(error = %format!("{err:#}"), "Transcode failed");
                return ConversionResult::Failure(format!("conversion failed: {err}"));
            }
            Ok(Ok(Ok(output))) => output,
        };

        if output.bytes.is_empty() {
            return ConversionResult::Failure("conversion produced no output".to_string());
        }
        if output.compressed_size > self.max_output_size {
            warn!(
                compressed_size = output.compressed_size,
                limit = self.max_output_size,
                "Converted image over size limit"
            );
            return ConversionResult::Failure(format!(
                "converted image is too large ({} bytes, limit {})",
                output.compressed_size, self.max_output_size
            ));
        }

        debug!(
            original_size = output.original_size,
            compressed_size = output.compressed_size,
            compression = %output.compression,
            "Transcode succeeded"
        );
        ConversionResult::Success(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use bp_core::{ConvertedImage, MimeType, OutputFormat};
    use bytes::Bytes;

    enum Behaviour {
        Succeed(usize),
        Fail,
        Hang,
        Panic,
    }

    struct FakeTranscoder {
        behaviour: Behaviour,
    }

    #[async_trait]
    impl TranscoderPort for FakeTranscoder {
        async fn transcode(&self, request: ConversionRequest) -> Result<ConvertedImage> {
            match self.behaviour {
                Behaviour::Succeed(size) => Ok(ConvertedImage::new(
                    Bytes::from(vec![0u8; size]),
                    MimeType::from("image/webp"),
                    request.source.len() as u64,
                )),
                Behaviour::Fail => Err(anyhow::anyhow!("unsupported image format")),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    unreachable!("timeout fires first")
                }
                Behaviour::Panic => panic!("decoder bug"),
            }
        }
    }

    fn client(behaviour: Behaviour, max_output_size: u64) -> TranscodeClient {
        TranscodeClient::new(
            Arc::new(FakeTranscoder { behaviour }),
            Duration::from_secs(5),
            max_output_size,
        )
    }

    fn request(size: usize) -> ConversionRequest {
        ConversionRequest {
            source: Bytes::from(vec![1u8; size]),
            source_mime: MimeType::from("image/png"),
            format: OutputFormat::Webp,
        }
    }

    #[tokio::test]
    async fn success_carries_metrics() {
        let result = client(Behaviour::Succeed(400), 1 << 20)
            .convert(request(1000))
            .await;

        match result {
            ConversionResult::Success(output) => {
                assert_eq!(output.original_size, 1000);
                assert_eq!(output.compressed_size, 400);
                assert_eq!(output.compression.to_string(), "60.00");
            }
            other => panic!("expected success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn growth_is_still_a_success() {
        let result = client(Behaviour::Succeed(1200), 1 << 20)
            .convert(request(1000))
            .await;

        let ConversionResult::Success(output) = result else {
            panic!("expected success");
        };
        assert_eq!(output.compression.to_string(), "-20.00");
    }

    #[tokio::test]
    async fn adapter_error_becomes_failure() {
        let result = client(Behaviour::Fail, 1 << 20).convert(request(10)).await;
        assert_eq!(
            result,
            ConversionResult::Failure("conversion failed: unsupported image format".to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn hanging_adapter_times_out() {
        let result = client(Behaviour::Hang, 1 << 20).convert(request(10)).await;
        assert_eq!(result, ConversionResult::Failure("timed out".to_string()));
    }

    #[tokio::test]
    async fn panicking_adapter_is_contained() {
        let result = client(Behaviour::Panic, 1 << 20).convert(request(10)).await;
        assert!(!result.is_success());
    }

    #[tokio::test]
    async fn oversized_output_is_rejected() {
        let result = client(Behaviour::Succeed(2048), 1024)
            .convert(request(10))
            .await;
        let ConversionResult::Failure(reason) = result else {
            panic!("expected failure");
        };
        assert!(reason.contains("too large"), "{reason}");
    }

    #[tokio::test]
    async fn empty_output_is_rejected() {
        let result = client(Behaviour::Succeed(0), 1024).convert(request(10)).await;
        assert_eq!(
            result,
            ConversionResult::Failure("conversion produced no output".to_string())
        );
    }
}
