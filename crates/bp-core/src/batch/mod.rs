//! Batch domain: items, their lifecycle, and the bounded store holding them.

mod candidate;
mod error;
mod item;
mod limits;
mod progress;
mod state;
mod store;

pub use candidate::{check_candidate, CandidateRejection, RejectionReason, SourceFile};
pub use error::BatchError;
pub use item::{BatchItem, ItemSnapshot};
pub use limits::{BatchLimits, MAX_FILE_SIZE, MAX_IMAGES};
pub use progress::BatchProgress;
pub use state::{ItemState, Transition};
pub use store::{AddOutcome, ConversionJob, ItemStore, RecordOutcome, RemoveOutcome};
