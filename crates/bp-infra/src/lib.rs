//! Adapters implementing the BatchPress ports: in-process and remote
//! transcoders, the zip archive writer, preview handles, the system clock,
//! and filesystem candidate loading.

pub mod archive;
pub mod fs;
pub mod preview;
pub mod time;
pub mod transcode;

pub use archive::ZipArchiveWriter;
pub use preview::ThumbnailPreviewRegistry;
pub use time::SystemClock;
pub use transcode::{HttpTranscoder, ImageTranscoder};
