//! # Error Types

use crate::regex::ErrorWrapper;

/// Errors from bytekiln training operations.
#[derive(Debug, thiserror::Error)]
pub enum BpeError {
    /// Training parameters are malformed.
    ///
    /// Duplicate or empty special tokens, a zero worker count,
    /// or a vocab size the symbol type cannot represent.
    #[error("invalid input: {0}")]
    Input(String),

    /// The pretokenization pattern failed to compile.
    #[error("invalid split pattern: {0}")]
    Pattern(#[from] ErrorWrapper),

    /// A segment could not be decoded or matched.
    #[error("encoding error at byte {offset}: {message}")]
    Encoding {
        /// Byte offset of the failure, relative to the segmented input.
        offset: usize,

        /// Description of the failure.
        message: String,
    },

    /// A parallel segmentation worker failed; the whole call is aborted.
    #[error("segmentation worker {worker} failed: {source}")]
    WorkerFailure {
        /// The index of the failed worker's chunk.
        worker: usize,

        /// The worker's error.
        #[source]
        source: Box<BpeError>,
    },

    /// The worker pool could not be created.
    #[cfg(feature = "rayon")]
    #[error(transparent)]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Incremental frequency bookkeeping disagrees with itself.
    ///
    /// This indicates a defect, not bad input.
    #[error("frequency index inconsistency: {0}")]
    Consistency(String),
}

impl BpeError {
    /// Build an [`BpeError::Encoding`] from a UTF-8 decode failure.
    ///
    /// ## Arguments
    /// * `err` - the decode error.
    /// * `offset` - the offset of the decoded slice in the larger input.
    pub fn from_utf8_error(
        err: core::str::Utf8Error,
        offset: usize,
    ) -> Self {
        Self::Encoding {
            offset: offset + err.valid_up_to(),
            message: err.to_string(),
        }
    }
}

/// Result type for bytekiln operations.
pub type BpeResult<T> = core::result::Result<T, BpeError>;
