//! Dependency wiring: picks the adapters named by the configuration and
//! hands them to the application layer.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use bp_app::{App, AppDeps, AppSettings};
use bp_core::ports::{PreviewRegistryPort, TranscoderPort};
use bp_core::BatchPressConfig;
use bp_infra::{
    HttpTranscoder, ImageTranscoder, SystemClock, ThumbnailPreviewRegistry, ZipArchiveWriter,
};
use tracing::info;

pub fn build_app_deps(config: &BatchPressConfig) -> Result<AppDeps> {
    let transcode = &config.transcode;
    let transcoder: Arc<dyn TranscoderPort> = match transcode.endpoint.as_deref() {
        Some(endpoint) => {
            info!(%endpoint, "Using remote transcoder");
            Arc::new(HttpTranscoder::new(
                endpoint,
                Duration::from_secs(transcode.timeout_secs),
            )?)
        }
        None => {
            info!(
                max_width = transcode.max_width,
                quality = transcode.quality,
                webp_lossless = transcode.webp_lossless,
                "Using in-process transcoder"
            );
            Arc::new(
                ImageTranscoder::new(transcode.max_width, transcode.quality)
                    .with_lossless_webp(transcode.webp_lossless),
            )
        }
    };

    let previews = config.preview.enabled.then(|| {
        Arc::new(ThumbnailPreviewRegistry::new(config.preview.max_edge))
            as Arc<dyn PreviewRegistryPort>
    });

    Ok(AppDeps {
        transcoder,
        archive_writer: Arc::new(ZipArchiveWriter::new(config.archive.compression_level)),
        previews,
        clock: Arc::new(SystemClock),
    })
}

pub fn app_settings(config: &BatchPressConfig) -> AppSettings {
    AppSettings {
        limits: config.limits,
        transcode_timeout: Duration::from_secs(config.transcode.timeout_secs),
        max_output_size: config.transcode.max_output_size,
    }
}

pub fn build_app(config: &BatchPressConfig) -> Result<App> {
    Ok(App::new(build_app_deps(config)?, app_settings(config)))
}
