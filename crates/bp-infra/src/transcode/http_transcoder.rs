//! Remote transcoder speaking the multipart compress endpoint.
//!
//! Request: `POST <endpoint>` with a multipart `image` file part and a
//! `format` text part. A 2xx body is the converted image; the metrics come
//! back in `X-Original-Size`, `X-Compressed-Size` and
//! `X-Compression-Percentage`. Error responses carry a JSON `message`.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use bp_core::ports::TranscoderPort;
use bp_core::{CompressionRatio, ConversionRequest, ConvertedImage, MimeType};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, warn};

const ORIGINAL_SIZE_HEADER: &str = "x-original-size";
const COMPRESSION_PERCENTAGE_HEADER: &str = "x-compression-percentage";

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

pub struct HttpTranscoder {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpTranscoder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("build transcode http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl TranscoderPort for HttpTranscoder {
    #[tracing::instrument(
        name = "infra.http_transcoder.transcode",
        skip_all,
        fields(endpoint = %self.endpoint, format = %request.format)
    )]
    async fn transcode(&self, request: ConversionRequest) -> Result<ConvertedImage> {
        let source_size = request.source.len() as u64;
        let fallback_type = request
            .format
            .content_type()
            .unwrap_or_else(|| request.source_mime.clone());

        let part = Part::bytes(request.source.to_vec())
            .file_name("image")
            .mime_str(request.source_mime.as_str())
            .context("invalid source content type")?;
        let form = Form::new()
            .part("image", part)
            .text("format", request.format.token());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .context("send transcode request")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|body| body.message)
                .unwrap_or_else(|| status.to_string());
            warn!(%status, %message, "Transcode endpoint returned an error");
            return Err(anyhow!("transcode endpoint returned {status}: {message}"));
        }

        let headers = response.headers().clone();
        let bytes = response
            .bytes()
            .await
            .context("read transcode response body")?;

        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(MimeType::from)
            .filter(MimeType::is_image)
            .unwrap_or(fallback_type);
        let original_size =
            header_value::<u64>(&headers, ORIGINAL_SIZE_HEADER).unwrap_or(source_size);

        let mut output = ConvertedImage::new(bytes, content_type, original_size);
        // "NaN" and "inf" parse as f64 but are not percentages
        if let Some(percentage) = header_value::<f64>(&headers, COMPRESSION_PERCENTAGE_HEADER)
            .filter(|percentage| percentage.is_finite())
        {
            output.compression = CompressionRatio::from_percentage(percentage);
        }
        debug!(
            original_size = output.original_size,
            compressed_size = output.compressed_size,
            "Received converted image"
        );
        Ok(output)
    }
}

fn header_value<T: std::str::FromStr>(headers: &HeaderMap, name: &str) -> Option<T> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::OutputFormat;
    use bytes::Bytes;
    use mockito::{Matcher, Server};

    fn request(format: OutputFormat) -> ConversionRequest {
        ConversionRequest {
            source: Bytes::from(vec![9u8; 1000]),
            source_mime: MimeType::from("image/png"),
            format,
        }
    }

    fn transcoder(url: String) -> HttpTranscoder {
        HttpTranscoder::new(format!("{url}/api/compress"), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn parses_body_and_metric_headers() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/compress")
            .match_header(
                "content-type",
                Matcher::Regex("multipart/form-data; boundary=.*".to_string()),
            )
            .match_body(Matcher::Regex(r#"name="format"\r\n\r\nwebp"#.to_string()))
            .with_status(200)
            .with_header("content-type", "image/webp")
            .with_header("x-original-size", "1000")
            .with_header("x-compressed-size", "400")
            .with_header("x-compression-percentage", "60.00")
            .with_body(vec![1u8; 400])
            .create_async()
            .await;

        let output = transcoder(server.url())
            .transcode(request(OutputFormat::Webp))
            .await
            .expect("conversion succeeds");

        mock.assert_async().await;
        assert_eq!(output.content_type.as_str(), "image/webp");
        assert_eq!(output.original_size, 1000);
        assert_eq!(output.compressed_size, 400);
        assert_eq!(output.compression.to_string(), "60.00");
    }

    #[tokio::test]
    async fn missing_headers_fall_back_to_local_metrics() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/compress")
            .with_status(200)
            .with_body(vec![1u8; 250])
            .create_async()
            .await;

        let output = transcoder(server.url())
            .transcode(request(OutputFormat::Jpeg))
            .await
            .unwrap();

        assert_eq!(output.content_type.as_str(), "image/jpeg");
        assert_eq!(output.original_size, 1000);
        assert_eq!(output.compression.to_string(), "75.00");
    }

    #[tokio::test]
    async fn non_finite_percentage_header_is_ignored() {
        for reported in ["NaN", "inf", "-infinity"] {
            let mut server = Server::new_async().await;
            let _mock = server
                .mock("POST", "/api/compress")
                .with_status(200)
                .with_header("content-type", "image/webp")
                .with_header("x-compression-percentage", reported)
                .with_body(vec![1u8; 400])
                .create_async()
                .await;

            let output = transcoder(server.url())
                .transcode(request(OutputFormat::Webp))
                .await
                .unwrap();

            assert_eq!(output.compression.to_string(), "60.00", "{reported}");
        }
    }

    #[tokio::test]
    async fn error_response_carries_server_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/compress")
            .with_status(500)
            .with_header("content-type", "application/json")
            .with_body(r#"{"success":false,"message":"Error compressing image"}"#)
            .create_async()
            .await;

        let err = transcoder(server.url())
            .transcode(request(OutputFormat::Png))
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("500"), "{message}");
        assert!(message.contains("Error compressing image"), "{message}");
    }

    #[tokio::test]
    async fn error_without_json_uses_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/api/compress")
            .with_status(400)
            .with_body("bad request")
            .create_async()
            .await;

        let err = transcoder(server.url())
            .transcode(request(OutputFormat::Png))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("400 Bad Request"), "{err}");
    }
}
