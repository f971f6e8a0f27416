//! Configuration DTOs.
//!
//! Pure data: every section carries its defaults so a missing file or a
//! partial file still yields a usable configuration. Loading lives in the
//! binary's bootstrap.

use serde::Deserialize;

use crate::batch::BatchLimits;
use crate::OutputFormat;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct BatchPressConfig {
    pub limits: BatchLimits,
    pub transcode: TranscodeConfig,
    pub archive: ArchiveConfig,
    pub preview: PreviewConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TranscodeConfig {
    /// Output width cap; height follows the aspect ratio.
    pub max_width: u32,
    /// Encoder quality, 1-100.
    pub quality: u8,
    /// Encode WebP losslessly and ignore `quality`.
    pub webp_lossless: bool,
    /// Per-call timeout in seconds.
    pub timeout_secs: u64,
    /// Outputs above this size are reported as failures.
    pub max_output_size: u64,
    /// Format token used when none is given on the command line.
    pub default_format: String,
    /// Remote transcode endpoint. In-process conversion when unset.
    pub endpoint: Option<String>,
}

impl TranscodeConfig {
    pub fn defaults() -> Self {
        Self {
            max_width: 800,
            quality: 80,
            webp_lossless: false,
            timeout_secs: 30,
            max_output_size: 20 * 1024 * 1024,
            default_format: "webp".to_string(),
            endpoint: None,
        }
    }

    pub fn default_output_format(&self) -> OutputFormat {
        OutputFormat::from_token(&self.default_format)
    }
}

impl Default for TranscodeConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Deflate level, 0-9.
    pub compression_level: i64,
}

impl ArchiveConfig {
    pub fn defaults() -> Self {
        Self {
            compression_level: 9,
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub enabled: bool,
    /// Longest edge of generated previews, in pixels.
    pub max_edge: u32,
}

impl PreviewConfig {
    pub fn defaults() -> Self {
        Self {
            enabled: true,
            max_edge: 128,
        }
    }
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self::defaults()
    }
}
