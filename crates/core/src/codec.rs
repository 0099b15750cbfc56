//! Decoder and encoder boundaries.
//!
//! The bit-level codec work is external; the engine drives codecs one bounded
//! feed/drain cycle at a time through these traits. Codec errors carry a
//! reason so the terminal error callback can surface what went wrong.

use std::time::Duration;
use thiserror::Error;

use crate::io::EncodedSample;
use crate::media::MediaFormat;

/// Errors surfaced by codec handles and track pipelines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The codec failed internally.
    #[error("internal codec error: {0}")]
    Internal(String),

    /// The codec was used after its resources were released.
    #[error("codec used after release")]
    ReleasedCodec,

    /// A pipeline was stepped before being started.
    #[error("codec not started")]
    NotStarted,

    /// The encoder produced no negotiated output format.
    #[error("output format not negotiated")]
    FormatNotNegotiated,
}

/// One decoded unit flowing decoder -> renderer -> encoder.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Raw payload. May be empty for a pure end-of-stream marker.
    pub data: Vec<u8>,
    /// Presentation timestamp relative to the start of the track.
    pub pts: Duration,
    /// Whether this frame terminates the stream.
    pub end_of_stream: bool,
}

impl Frame {
    /// Creates a regular data frame.
    pub fn data(data: Vec<u8>, pts: Duration) -> Self {
        Self {
            data,
            pts,
            end_of_stream: false,
        }
    }

    /// Creates an empty end-of-stream marker at the given timestamp.
    pub fn end_of_stream(pts: Duration) -> Self {
        Self {
            data: Vec::new(),
            pts,
            end_of_stream: true,
        }
    }
}

/// A decoder handle shared by the transcode pipelines of one job.
///
/// `stop` and `release` must be idempotent: several pipelines may share one
/// handle and each stops it on its own terminal path.
pub trait Decoder: Send + Sync {
    /// Identifying name, recorded in the per-track stats.
    fn name(&self) -> String;

    /// Prepares the decoder for the given source format.
    fn start(&self, format: &MediaFormat) -> Result<(), CodecError>;

    /// Feeds one compressed sample. An `end_of_stream` sample drains the
    /// decoder; subsequent frames flush out through [`Decoder::receive_frame`].
    fn submit_sample(&self, sample: EncodedSample) -> Result<(), CodecError>;

    /// Pulls the next decoded frame, if one is ready.
    fn receive_frame(&self) -> Result<Option<Frame>, CodecError>;

    /// Stops decoding. Idempotent.
    fn stop(&self);

    /// Releases the underlying codec resources. Idempotent.
    fn release(&self);
}

/// An encoder handle shared by the transcode pipelines of one job.
pub trait Encoder: Send + Sync {
    /// Identifying name, recorded in the per-track stats.
    fn name(&self) -> String;

    /// Prepares the encoder for the requested target format and returns the
    /// format actually negotiated, which may differ from the request.
    fn start(&self, format: &MediaFormat) -> Result<MediaFormat, CodecError>;

    /// Feeds one raw frame. An `end_of_stream` frame drains the encoder.
    fn submit_frame(&self, frame: Frame) -> Result<(), CodecError>;

    /// Pulls the next compressed sample, if one is ready. A sample with
    /// `end_of_stream` set is the last one.
    fn receive_sample(&self) -> Result<Option<EncodedSample>, CodecError>;

    /// Stops encoding. Idempotent.
    fn stop(&self);

    /// Releases the underlying codec resources. Idempotent.
    fn release(&self);
}
