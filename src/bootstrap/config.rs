//! # Configuration Loader
//!
//! Reads the TOML file into [`BatchPressConfig`]. Every section carries its
//! own defaults, so a partial file is completed field by field. Command-line
//! overrides are applied by the caller afterwards.

use std::io::ErrorKind;
use std::path::Path;

use anyhow::Context;
use bp_core::BatchPressConfig;
use tracing::info;

/// File looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "batchpress.toml";

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns error if the file cannot be read or is not valid TOML for the
/// configuration shape.
pub fn load_config(config_path: &Path) -> anyhow::Result<BatchPressConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    parse_config(&content)
        .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
}

/// Same as [`load_config`], but a missing file yields the defaults.
pub fn load_config_or_default(config_path: &Path) -> anyhow::Result<BatchPressConfig> {
    match std::fs::metadata(config_path) {
        Err(err) if err.kind() == ErrorKind::NotFound => {
            info!(path = %config_path.display(), "No config file found, using defaults");
            Ok(BatchPressConfig::default())
        }
        _ => load_config(config_path),
    }
}

fn parse_config(content: &str) -> anyhow::Result<BatchPressConfig> {
    toml::from_str(content).context("Failed to parse config as TOML")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bp_core::OutputFormat;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_reads_valid_toml() {
        let toml_content = r#"
            [limits]
            max_images = 4

            [transcode]
            max_width = 640
            default_format = "png"
            endpoint = "http://localhost:3000/api/compress"

            [archive]
            compression_level = 6
        "#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = load_config(temp_file.path()).unwrap();

        assert_eq!(config.limits.max_images, 4);
        assert_eq!(config.limits.max_file_size, 5 * 1024 * 1024);
        assert_eq!(config.transcode.max_width, 640);
        assert_eq!(config.transcode.quality, 80);
        assert_eq!(config.transcode.default_output_format(), OutputFormat::Png);
        assert_eq!(
            config.transcode.endpoint.as_deref(),
            Some("http://localhost:3000/api/compress")
        );
        assert_eq!(config.archive.compression_level, 6);
        assert!(config.preview.enabled);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_or_default(&dir.path().join(DEFAULT_CONFIG_FILE)).unwrap();
        assert_eq!(config, BatchPressConfig::default());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(&dir.path().join("absent.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"[limits\nmax_images = ").unwrap();

        let err = load_config_or_default(temp_file.path()).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config as TOML"));
    }
}
