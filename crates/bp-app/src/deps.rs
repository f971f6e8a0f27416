//! # Application Dependencies
//!
//! Plain grouping of the ports the use cases need. Not a builder: no build
//! steps and no hidden logic.

use std::sync::Arc;

use bp_core::ports::{ArchiveWriterPort, ClockPort, PreviewRegistryPort, TranscoderPort};

pub struct AppDeps {
    // Conversion
    pub transcoder: Arc<dyn TranscoderPort>,

    // Archive
    pub archive_writer: Arc<dyn ArchiveWriterPort>,

    // Item resources; no previews are produced when unset
    pub previews: Option<Arc<dyn PreviewRegistryPort>>,

    // System
    pub clock: Arc<dyn ClockPort>,
}
