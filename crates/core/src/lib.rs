//! Track-level media transformation engine.
//!
//! The engine turns a multi-track media container into a re-encoded or
//! repackaged output container. Each job fans out into one pipeline per
//! source track (full transcode or passthrough copy), enforces a storage
//! precondition before committing irreversible work, drives every pipeline
//! from a single sequential step loop with throttled aggregate progress, and
//! guarantees release of every acquired resource on every exit path —
//! success, codec failure, or cooperative cancellation.
//!
//! Container demuxing/muxing and bit-level codec work live behind the
//! [`io::MediaSource`]/[`io::MediaTarget`] and [`codec::Decoder`]/
//! [`codec::Encoder`] traits; the engine only coordinates them.
//!
//! # Example
//!
//! ```ignore
//! use tracktor_core::{Config, JobRequest, MediaTransformer, TransformOptions};
//!
//! let transformer = MediaTransformer::new(Config::default());
//!
//! let request = JobRequest {
//!     job_id: Some("job-1".to_string()),
//!     source,                       // Arc<dyn MediaSource>
//!     target,                       // Arc<dyn MediaTarget>
//!     decoder,
//!     renderer: None,
//!     encoder,
//!     target_video_format: Some(hevc_format),
//!     target_audio_format: None,    // audio tracks pass through
//! };
//!
//! let job_id = transformer
//!     .transform(request, listener, TransformOptions::default())
//!     .await?;
//!
//! // ... later, from any task:
//! transformer.cancel(&job_id).await?;
//! ```

pub mod codec;
pub mod config;
pub mod io;
pub mod job;
pub mod listener;
pub mod media;
pub mod metrics;
pub mod pipeline;
pub mod render;
pub mod stats;
pub mod storage;
pub mod testing;
pub mod transformer;

pub use codec::{CodecError, Decoder, Encoder, Frame};
pub use config::{load_config, load_config_from_str, Config, ConfigError};
pub use io::{EncodedSample, MediaSource, MediaTarget};
pub use job::{
    CancelHandle, JobRequest, JobState, TransformError, TransformationJob, GRANULARITY_DEFAULT,
    GRANULARITY_NONE,
};
pub use listener::{CallbackHandler, DirectCallbackHandler, TransformationListener};
pub use media::{MediaFormat, TrackKind};
pub use pipeline::{
    DefaultPipelineFactory, PassthroughPipeline, PipelineFactory, StepResult, TrackPipeline,
    TranscodePipeline,
};
pub use render::FrameRenderer;
pub use stats::{StatsCollector, TrackReport};
pub use storage::{estimate_required_bytes, StorageCheck, StorageProbe};
pub use transformer::{
    ActiveJobInfo, MediaTransformer, TransformOptions, TransformerError, TransformerStatus,
};
