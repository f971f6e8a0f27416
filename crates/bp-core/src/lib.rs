//! # bp-core
//!
//! Core domain models and business rules for BatchPress.
//!
//! This crate contains pure batch logic without any infrastructure dependencies:
//! the item store and its lifecycle state machine, the conversion value types,
//! archive naming, and the ports implemented by the infrastructure layer.

pub mod archive;
pub mod batch;
pub mod config;
pub mod conversion;
pub mod ids;
mod mime;
pub mod ports;

// Re-export commonly used types at the crate root
pub use archive::{ArchiveEntry, ArchiveError, ArchiveManifest, ArchiveStream};
pub use batch::{
    AddOutcome, BatchError, BatchItem, BatchLimits, BatchProgress, CandidateRejection,
    ItemSnapshot, ItemState, ItemStore, RejectionReason, SourceFile, Transition,
};
pub use config::BatchPressConfig;
pub use conversion::{
    CompressionRatio, ConversionRequest, ConversionResult, ConvertedImage, OutputFormat,
};
pub use ids::{ItemId, PreviewHandle};
pub use mime::MimeType;
