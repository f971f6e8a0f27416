//! Business logic use cases
//!
//! ```text
//! ItemStore::add ──▶ BatchConductor::run ──▶ TranscodeClient::convert (per item)
//!                          │
//!                          ▼
//!                 ArchiveAssembler::assemble_done / ExportConvertedItem
//! ```

mod archive_assembler;
mod batch_conductor;
mod export_item;
mod transcode_client;

pub use archive_assembler::ArchiveAssembler;
pub use batch_conductor::{BatchConductor, ConductorError, PassReport};
pub use export_item::ExportConvertedItem;
pub use transcode_client::TranscodeClient;
