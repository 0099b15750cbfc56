//! Full transcode pipeline: decode, optionally render, re-encode.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::codec::{CodecError, Decoder, Encoder};
use crate::io::{MediaSource, MediaTarget};
use crate::media::MediaFormat;
use crate::render::FrameRenderer;

use super::{StepResult, TrackPipeline};

/// Drives one track through decode -> (render) -> encode -> write, one
/// bounded feed/drain cycle per step.
pub struct TranscodePipeline {
    track: usize,
    source_format: MediaFormat,
    target_format: MediaFormat,
    source: Arc<dyn MediaSource>,
    decoder: Arc<dyn Decoder>,
    renderer: Option<Arc<dyn FrameRenderer>>,
    encoder: Arc<dyn Encoder>,
    target: Arc<dyn MediaTarget>,
    target_track: Option<usize>,
    duration: Option<Duration>,
    progress: f64,
    started: bool,
    stopped: bool,
    source_drained: bool,
    finished: bool,
}

impl TranscodePipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        track: usize,
        source_format: MediaFormat,
        source: Arc<dyn MediaSource>,
        decoder: Arc<dyn Decoder>,
        renderer: Option<Arc<dyn FrameRenderer>>,
        encoder: Arc<dyn Encoder>,
        target: Arc<dyn MediaTarget>,
        target_format: MediaFormat,
    ) -> Self {
        let duration = source_format.duration;
        Self {
            track,
            source_format,
            target_format,
            source,
            decoder,
            renderer,
            encoder,
            target,
            target_track: None,
            duration,
            progress: 0.0,
            started: false,
            stopped: false,
            source_drained: false,
            finished: false,
        }
    }

    fn update_progress(&mut self, pts: Duration) {
        if let Some(duration) = self.duration {
            if !duration.is_zero() {
                let position = (pts.as_secs_f64() / duration.as_secs_f64()).clamp(0.0, 1.0);
                // Monotone: late samples never move progress backwards.
                self.progress = self.progress.max(position);
            }
        }
    }
}

impl TrackPipeline for TranscodePipeline {
    fn start(&mut self) -> Result<(), CodecError> {
        self.decoder.start(&self.source_format)?;
        let negotiated = self.encoder.start(&self.target_format)?;
        self.source.select_track(self.track);
        self.target_track = Some(self.target.add_track(&negotiated));
        self.target_format = negotiated;
        self.started = true;
        debug!(
            track = self.track,
            mime = %self.source_format.mime_type,
            "transcode pipeline started"
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

        // Feed: one compressed sample into the decoder, if the source has one.
        if !self.source_drained {
            if let Some(sample) = self.source.read_sample(self.track) {
                if sample.end_of_stream {
                    self.source_drained = true;
                }
                self.decoder.submit_sample(sample)?;
            }
        }

        // Move: one decoded frame through the renderer into the encoder.
        if let Some(frame) = self.decoder.receive_frame()? {
            let frame = if frame.end_of_stream {
                frame
            } else {
                match &self.renderer {
                    Some(renderer) => renderer.render(frame),
                    None => frame,
                }
            };
            self.encoder.submit_frame(frame)?;
        }

        // Drain: one encoded sample out to the target.
        if let Some(sample) = self.encoder.receive_sample()? {
            if !sample.data.is_empty() {
                if let Some(target_track) = self.target_track {
                    self.target.write_sample(target_track, &sample);
                }
            }
            if sample.end_of_stream {
                self.finished = true;
                self.progress = 1.0;
                debug!(track = self.track, "transcode pipeline reached end of stream");
                return Ok(StepResult::EndOfStream);
            }
            self.update_progress(sample.pts);
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
        self.decoder.stop();
        self.decoder.release();
        self.encoder.stop();
        self.encoder.release();
        debug!(track = self.track, "transcode pipeline stopped");
    }

    fn decoder_name(&self) -> Option<String> {
        Some(self.decoder.name())
    }

    fn encoder_name(&self) -> Option<String> {
        Some(self.encoder.name())
    }

    fn target_format(&self) -> Option<MediaFormat> {
        Some(self.target_format.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockDecoder, MockEncoder, MockRenderer, MockSource, MockTarget};

    fn pipeline_for(
        source: Arc<MockSource>,
        decoder: Arc<MockDecoder>,
        renderer: Option<Arc<MockRenderer>>,
        encoder: Arc<MockEncoder>,
        target: Arc<MockTarget>,
    ) -> TranscodePipeline {
        let source_format = source.track_format(0);
        TranscodePipeline::new(
            0,
            source_format,
            source,
            decoder,
            renderer.map(|r| r as Arc<dyn FrameRenderer>),
            encoder,
            target,
            MediaFormat::new("video/hevc").with_bit_rate(2_000_000),
        )
    }

    fn run_to_eos(pipeline: &mut TranscodePipeline) -> usize {
        let mut steps = 0;
        loop {
            steps += 1;
            assert!(steps < 100, "pipeline did not reach end of stream");
            match pipeline.process_step().unwrap() {
                StepResult::FrameProcessed => {}
                StepResult::EndOfStream => return steps,
            }
        }
    }

    #[test]
    fn test_step_before_start_fails() {
        let source = Arc::new(MockSource::with_video_track(3));
        let mut pipeline = pipeline_for(
            source,
            Arc::new(MockDecoder::new()),
            None,
            Arc::new(MockEncoder::new()),
            Arc::new(MockTarget::new()),
        );

        assert_eq!(pipeline.process_step(), Err(CodecError::NotStarted));
    }

    #[test]
    fn test_transcodes_all_samples_to_target() {
        let source = Arc::new(MockSource::with_video_track(4));
        let target = Arc::new(MockTarget::new());
        let mut pipeline = pipeline_for(
            Arc::clone(&source),
            Arc::new(MockDecoder::new()),
            None,
            Arc::new(MockEncoder::new()),
            Arc::clone(&target),
        );

        pipeline.start().unwrap();
        run_to_eos(&mut pipeline);

        assert_eq!(target.written_samples(0).len(), 4);
        assert_eq!(pipeline.progress(), 1.0);
        // Finished pipelines keep reporting end of stream.
        assert_eq!(pipeline.process_step(), Ok(StepResult::EndOfStream));
    }

    #[test]
    fn test_renderer_sees_every_data_frame() {
        let source = Arc::new(MockSource::with_video_track(5));
        let renderer = Arc::new(MockRenderer::new());
        let mut pipeline = pipeline_for(
            source,
            Arc::new(MockDecoder::new()),
            Some(Arc::clone(&renderer)),
            Arc::new(MockEncoder::new()),
            Arc::new(MockTarget::new()),
        );

        pipeline.start().unwrap();
        run_to_eos(&mut pipeline);

        assert_eq!(renderer.rendered_frames(), 5);
    }

    #[test]
    fn test_reports_negotiated_target_format() {
        let source = Arc::new(MockSource::with_video_track(1));
        let encoder = Arc::new(MockEncoder::new());
        encoder.set_negotiated_format(MediaFormat::video("video/hevc", 1280, 720));
        let mut pipeline = pipeline_for(
            source,
            Arc::new(MockDecoder::new()),
            None,
            encoder,
            Arc::new(MockTarget::new()),
        );

        pipeline.start().unwrap();

        let format = pipeline.target_format().unwrap();
        assert_eq!(format.width, Some(1280));
        assert_eq!(format.height, Some(720));
    }

    #[test]
    fn test_stop_releases_codecs_once() {
        let decoder = Arc::new(MockDecoder::new());
        let encoder = Arc::new(MockEncoder::new());
        let source = Arc::new(MockSource::with_video_track(1));
        let mut pipeline = pipeline_for(
            source,
            Arc::clone(&decoder),
            None,
            Arc::clone(&encoder),
            Arc::new(MockTarget::new()),
        );

        pipeline.start().unwrap();
        pipeline.stop();
        pipeline.stop();

        assert_eq!(decoder.release_count(), 1);
        assert_eq!(encoder.release_count(), 1);
    }

    #[test]
    fn test_codec_failure_propagates() {
        let decoder = Arc::new(MockDecoder::new());
        let source = Arc::new(MockSource::with_video_track(2));
        let mut pipeline = pipeline_for(
            source,
            Arc::clone(&decoder),
            None,
            Arc::new(MockEncoder::new()),
            Arc::new(MockTarget::new()),
        );

        pipeline.start().unwrap();
        decoder.fail_next_with(CodecError::Internal("bitstream".to_string()));
        let err = pipeline.process_step().unwrap_err();
        assert_eq!(err, CodecError::Internal("bitstream".to_string()));
    }

    #[test]
    fn test_starved_source_keeps_processing() {
        let source = Arc::new(MockSource::with_empty_video_track());
        let mut pipeline = pipeline_for(
            source,
            Arc::new(MockDecoder::new()),
            None,
            Arc::new(MockEncoder::new()),
            Arc::new(MockTarget::new()),
        );

        pipeline.start().unwrap();
        assert_eq!(pipeline.process_step(), Ok(StepResult::FrameProcessed));
        assert_eq!(pipeline.process_step(), Ok(StepResult::FrameProcessed));
        assert_eq!(pipeline.progress(), 0.0);
    }
}
