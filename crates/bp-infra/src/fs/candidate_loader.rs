use std::path::Path;

use anyhow::{Context, Result};
use bp_core::{MimeType, SourceFile};
use tracing::debug;

/// Reads a file from disk into a batch candidate.
///
/// The declared type is inferred from the file extension, the way a browser
/// file picker labels uploads. Content is not sniffed. Only extensions the
/// in-process decoder can read are declared images; anything else is
/// `application/octet-stream` and rejected by the batch filter.
pub async fn load_candidate(path: &Path) -> Result<SourceFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("read candidate {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let mime_type = mime_from_extension(path);
    debug!(%name, %mime_type, size = bytes.len(), "Loaded candidate");
    Ok(SourceFile::new(name, mime_type, bytes))
}

/// Loads every path, stopping at the first unreadable file.
pub async fn load_candidates<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SourceFile>> {
    let mut candidates = Vec::with_capacity(paths.len());
    for path in paths {
        candidates.push(load_candidate(path.as_ref()).await?);
    }
    Ok(candidates)
}

pub fn mime_from_extension(path: &Path) -> MimeType {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let mime = match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("tif") | Some("tiff") => "image/tiff",
        _ => return MimeType::application_octet_stream(),
    };
    MimeType::from(mime)
}
