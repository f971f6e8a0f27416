//! BatchPress Application Orchestration Layer
//!
//! This crate contains the batch use cases: normalizing single-image
//! conversions, driving a conductor pass over the item store, assembling the
//! archive of converted outputs, and exporting single items.

mod app;
mod deps;
pub mod usecases;

pub use app::{App, AppSettings};
pub use deps::AppDeps;
pub use usecases::{
    ArchiveAssembler, BatchConductor, ConductorError, ExportConvertedItem, PassReport,
    TranscodeClient,
};
