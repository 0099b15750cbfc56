//! Pipeline variant selection.

use std::sync::Arc;

use tracing::debug;

use crate::codec::{CodecError, Decoder, Encoder};
use crate::io::{MediaSource, MediaTarget};
use crate::media::{MediaFormat, TrackKind};
use crate::render::FrameRenderer;

use super::{PassthroughPipeline, TrackPipeline, TranscodePipeline};

/// Constructs the pipeline for one source track. Pure constructor keyed by
/// track properties; implementations must not mutate shared state.
pub trait PipelineFactory: Send + Sync {
    #[allow(clippy::too_many_arguments)]
    fn create(
        &self,
        track: usize,
        source_format: &MediaFormat,
        source: Arc<dyn MediaSource>,
        decoder: Arc<dyn Decoder>,
        renderer: Option<Arc<dyn FrameRenderer>>,
        encoder: Arc<dyn Encoder>,
        target: Arc<dyn MediaTarget>,
        target_video_format: Option<&MediaFormat>,
        target_audio_format: Option<&MediaFormat>,
    ) -> Result<Box<dyn TrackPipeline>, CodecError>;
}

/// Default selection rule: a track transcodes when the job carries a target
/// format for its kind, and passes through otherwise. Tracks that are neither
/// video nor audio always pass through.
#[derive(Debug, Default)]
pub struct DefaultPipelineFactory;

impl PipelineFactory for DefaultPipelineFactory {
    fn create(
        &self,
        track: usize,
        source_format: &MediaFormat,
        source: Arc<dyn MediaSource>,
        decoder: Arc<dyn Decoder>,
        renderer: Option<Arc<dyn FrameRenderer>>,
        encoder: Arc<dyn Encoder>,
        target: Arc<dyn MediaTarget>,
        target_video_format: Option<&MediaFormat>,
        target_audio_format: Option<&MediaFormat>,
    ) -> Result<Box<dyn TrackPipeline>, CodecError> {
        let requested = match source_format.kind() {
            TrackKind::Video => target_video_format,
            TrackKind::Audio => target_audio_format,
            TrackKind::Other => None,
        };

        match requested {
            Some(target_format) => {
                debug!(track, mime = %source_format.mime_type, "building transcode pipeline");
                Ok(Box::new(TranscodePipeline::new(
                    track,
                    source_format.clone(),
                    source,
                    decoder,
                    renderer,
                    encoder,
                    target,
                    target_format.clone(),
                )))
            }
            None => {
                debug!(track, mime = %source_format.mime_type, "building passthrough pipeline");
                Ok(Box::new(PassthroughPipeline::new(
                    track,
                    source_format.clone(),
                    source,
                    target,
                )))
            }
        }
    }
}
