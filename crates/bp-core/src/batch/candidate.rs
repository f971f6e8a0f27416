use bytes::Bytes;
use thiserror::Error;

use super::BatchLimits;
use crate::MimeType;

/// A file offered for admission into the batch.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    /// Type as declared by the submitter; the bytes are not sniffed here.
    pub mime_type: MimeType,
    pub bytes: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<MimeType>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Why a single candidate was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectionReason {
    #[error("is empty")]
    Empty,
    #[error("is too large ({size} bytes). Max file size is {} MB", .max / (1024 * 1024))]
    TooLarge { size: u64, max: u64 },
    #[error("is not a valid image file (declared type `{declared}`)")]
    NotAnImage { declared: String },
}

/// A candidate that failed the precondition filter. Reported per file and
/// never blocks the other files of the same submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{name} {reason}")]
pub struct CandidateRejection {
    pub name: String,
    pub reason: RejectionReason,
}

/// Precondition filter applied to every candidate before it becomes an item.
pub fn check_candidate(candidate: &SourceFile, limits: &BatchLimits) -> Result<(), RejectionReason> {
    if candidate.bytes.is_empty() {
        return Err(RejectionReason::Empty);
    }
    if candidate.size() > limits.max_file_size {
        return Err(RejectionReason::TooLarge {
            size: candidate.size(),
            max: limits.max_file_size,
        });
    }
    if !candidate.mime_type.is_image() {
        return Err(RejectionReason::NotAnImage {
            declared: candidate.mime_type.to_string(),
        });
    }
    Ok(())
}
