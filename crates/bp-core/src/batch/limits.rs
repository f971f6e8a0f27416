use serde::{Deserialize, Serialize};

/// Maximum number of items a batch may hold.
pub const MAX_IMAGES: usize = 10;

/// Maximum accepted source size in bytes (5 MiB).
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Admission limits of the item store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchLimits {
    pub max_images: usize,
    pub max_file_size: u64,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            max_images: MAX_IMAGES,
            max_file_size: MAX_FILE_SIZE,
        }
    }
}
