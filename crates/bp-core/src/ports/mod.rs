//! Port interfaces for the application layer
//!
//! Ports define the contract between the batch use cases and the
//! infrastructure implementing the external collaborators: the single-image
//! transcoder, the archive writer, preview resources, and the clock.

mod archive_writer;
mod clock;
mod preview;
mod transcoder;

pub use archive_writer::ArchiveWriterPort;
pub use clock::ClockPort;
pub use preview::PreviewRegistryPort;
pub use transcoder::TranscoderPort;
