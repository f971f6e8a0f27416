pub mod compress;

pub use compress::{run_compress, CompressOptions, CompressSummary, RejectedFile};
