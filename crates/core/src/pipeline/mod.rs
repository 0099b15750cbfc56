//! Per-track transformation pipelines.
//!
//! Each source track is driven by exactly one pipeline, owned by its job and
//! stepped one bounded unit of work at a time. Two variants exist: a full
//! transcode (decode, optionally render, re-encode) and a passthrough copy of
//! the compressed samples. The factory is the only place variant selection
//! happens.

mod factory;
mod passthrough;
mod transcode;

pub use factory::{DefaultPipelineFactory, PipelineFactory};
pub use passthrough::PassthroughPipeline;
pub use transcode::TranscodePipeline;

use crate::codec::CodecError;
use crate::media::MediaFormat;

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// The pipeline made progress (or was starved) and has more work ahead.
    FrameProcessed,
    /// The pipeline has written its last sample. Repeated steps keep
    /// returning this.
    EndOfStream,
}

/// One source track's transformation, owned exclusively by its job.
pub trait TrackPipeline: Send {
    /// Acquires codec resources and registers the output track. Must be
    /// called exactly once before stepping.
    fn start(&mut self) -> Result<(), CodecError>;

    /// Performs one bounded unit of work.
    fn process_step(&mut self) -> Result<StepResult, CodecError>;

    /// Progress in `[0.0, 1.0]`, monotonically non-decreasing once started.
    fn progress(&self) -> f64;

    /// Stops the pipeline and releases whatever it acquired. Idempotent.
    fn stop(&mut self);

    /// Name of the decoder in use, `None` for passthrough.
    fn decoder_name(&self) -> Option<String>;

    /// Name of the encoder in use, `None` for passthrough.
    fn encoder_name(&self) -> Option<String>;

    /// The output format this track ends up with. For transcode pipelines
    /// this is the format negotiated at start, not the requested one.
    fn target_format(&self) -> Option<MediaFormat>;
}
