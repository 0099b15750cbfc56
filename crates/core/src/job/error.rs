//! Error taxonomy of a transformation job.

use thiserror::Error;

use crate::codec::CodecError;

/// Errors that terminate a transformation job.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    /// The source container exposes no tracks.
    #[error("source exposes no tracks")]
    NoTracksFound,

    /// The estimated output does not fit into the available storage.
    #[error("insufficient storage: estimated {estimated_bytes} bytes required, {available_bytes} available")]
    InsufficientStorage {
        estimated_bytes: u64,
        available_bytes: u64,
    },

    /// A pipeline failed to start or step.
    #[error("track {track} failed: {source}")]
    Codec {
        track: usize,
        #[source]
        source: CodecError,
    },

    /// The job observed a cooperative cancellation request.
    #[error("transformation cancelled")]
    Cancelled,
}
