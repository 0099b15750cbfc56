//! Passthrough pipeline: compressed samples are copied source -> target
//! without touching a codec.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::codec::CodecError;
use crate::io::{MediaSource, MediaTarget};
use crate::media::MediaFormat;

use super::{StepResult, TrackPipeline};

/// Copies one track's compressed samples verbatim. Selected by the factory
/// when a track requires no transformation.
pub struct PassthroughPipeline {
    track: usize,
    format: MediaFormat,
    source: Arc<dyn MediaSource>,
    target: Arc<dyn MediaTarget>,
    target_track: Option<usize>,
    duration: Option<Duration>,
    progress: f64,
    started: bool,
    stopped: bool,
    finished: bool,
}

impl PassthroughPipeline {
    pub fn new(
        track: usize,
        format: MediaFormat,
        source: Arc<dyn MediaSource>,
        target: Arc<dyn MediaTarget>,
    ) -> Self {
        let duration = format.duration;
        Self {
            track,
            format,
            source,
            target,
            target_track: None,
            duration,
            progress: 0.0,
            started: false,
            stopped: false,
            finished: false,
        }
    }
}

impl TrackPipeline for PassthroughPipeline {
    fn start(&mut self) -> Result<(), CodecError> {
        self.source.select_track(self.track);
        self.target_track = Some(self.target.add_track(&self.format));
        self.started = true;
        debug!(
            track = self.track,
            mime = %self.format.mime_type,
            "passthrough pipeline started"
        );
        Ok(())
    }

    fn process_step(&mut self) -> Result<StepResult, CodecError> {
        if self.finished {
            return Ok(StepResult::EndOfStream);
        }
        if !self.started {
            return Err(CodecError::NotStarted);
        }

        let Some(sample) = self.source.read_sample(self.track) else {
            return Ok(StepResult::FrameProcessed);
        };

        if !sample.data.is_empty() {
            if let Some(target_track) = self.target_track {
                self.target.write_sample(target_track, &sample);
            }
        }

        if sample.end_of_stream {
            self.finished = true;
            self.progress = 1.0;
            debug!(track = self.track, "passthrough pipeline reached end of stream");
            return Ok(StepResult::EndOfStream);
        }

        if let Some(duration) = self.duration {
            if !duration.is_zero() {
                let position =
                    (sample.pts.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
                self.progress = self.progress.max(position);
            }
        }

        Ok(StepResult::FrameProcessed)
    }

    fn progress(&self) -> f64 {
        self.progress
    }

    fn stop(&mut self) {
        if self.stopped {
            return;
        }
        self.stopped = true;
        debug!(track = self.track, "passthrough pipeline stopped");
    }

    fn decoder_name(&self) -> Option<String> {
        None
    }

    fn encoder_name(&self) -> Option<String> {
        None
    }

    fn target_format(&self) -> Option<MediaFormat> {
        Some(self.format.clone())
    }
}
