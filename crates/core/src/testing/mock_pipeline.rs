//! Scripted track pipeline and factory for orchestrator tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::codec::{CodecError, Decoder, Encoder};
use crate::io::{MediaSource, MediaTarget};
use crate::media::MediaFormat;
use crate::pipeline::{PipelineFactory, StepResult, TrackPipeline};
use crate::render::FrameRenderer;

enum StepMode {
    Fixed(Result<StepResult, CodecError>),
    FinishAfter(usize),
}

struct PipelineState {
    start_count: usize,
    stop_count: usize,
    steps: usize,
    start_error: Option<CodecError>,
    mode: StepMode,
    step_delay: Duration,
    progress: f64,
    decoder_name: Option<String>,
    encoder_name: Option<String>,
    target_format: Option<MediaFormat>,
}

/// Scripted implementation of [`TrackPipeline`].
///
/// Clones share state, so tests keep a clone as an observation handle while
/// the job owns the boxed original. Finished by default; script behavior with
/// the setters before handing it to a job.
#[derive(Clone)]
pub struct MockTrackPipeline {
    state: Arc<Mutex<PipelineState>>,
}

impl Default for MockTrackPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTrackPipeline {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(PipelineState {
                start_count: 0,
                stop_count: 0,
                steps: 0,
                start_error: None,
                mode: StepMode::Fixed(Ok(StepResult::EndOfStream)),
                step_delay: Duration::ZERO,
                progress: 0.0,
                decoder_name: Some("mock-decoder".to_string()),
                encoder_name: Some("mock-encoder".to_string()),
                target_format: None,
            })),
        }
    }

    /// Every step returns this result.
    pub fn set_step_result(&self, result: Result<StepResult, CodecError>) {
        self.state.lock().expect("mock state poisoned").mode = StepMode::Fixed(result);
    }

    /// Steps report frames processed until the `count`-th step, which reaches
    /// end of stream.
    pub fn finish_after_steps(&self, count: usize) {
        self.state.lock().expect("mock state poisoned").mode = StepMode::FinishAfter(count);
    }

    /// Makes `start` fail with the given error.
    pub fn fail_start_with(&self, error: CodecError) {
        self.state.lock().expect("mock state poisoned").start_error = Some(error);
    }

    /// Each step sleeps this long, making step timing observable.
    pub fn set_step_delay(&self, delay: Duration) {
        self.state.lock().expect("mock state poisoned").step_delay = delay;
    }

    pub fn set_progress(&self, progress: f64) {
        self.state.lock().expect("mock state poisoned").progress = progress;
    }

    pub fn set_target_format(&self, format: MediaFormat) {
        self.state.lock().expect("mock state poisoned").target_format = Some(format);
    }

    pub fn set_codec_names(&self, decoder_name: Option<String>, encoder_name: Option<String>) {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.decoder_name = decoder_name;
        state.encoder_name = encoder_name;
    }

    pub fn started(&self) -> bool {
        self.start_count() > 0
    }

    pub fn start_count(&self) -> usize {
        self.state.lock().expect("mock state poisoned").start_count
    }

    pub fn stopped(&self) -> bool {
        self.stop_count() > 0
    }

    pub fn stop_count(&self) -> usize {
        self.state.lock().expect("mock state poisoned").stop_count
    }

    pub fn steps(&self) -> usize {
        self.state.lock().expect("mock state poisoned").steps
    }
}

impl TrackPipeline for MockTrackPipeline {
    fn start(&mut self) -> Result<(), CodecError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.start_count += 1;
        match state.start_error.clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn process_step(&mut self) -> Result<StepResult, CodecError> {
        let (delay, result) = {
            let mut state = self.state.lock().expect("mock state poisoned");
            state.steps += 1;
            let steps = state.steps;
            let result = match &state.mode {
                StepMode::Fixed(result) => result.clone(),
                StepMode::FinishAfter(count) => {
                    if steps >= *count {
                        Ok(StepResult::EndOfStream)
                    } else {
                        Ok(StepResult::FrameProcessed)
                    }
                }
            };
            (state.step_delay, result)
        };
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
        result
    }

    fn progress(&self) -> f64 {
        self.state.lock().expect("mock state poisoned").progress
    }

    fn stop(&mut self) {
        self.state.lock().expect("mock state poisoned").stop_count += 1;
    }

    fn decoder_name(&self) -> Option<String> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .decoder_name
            .clone()
    }

    fn encoder_name(&self) -> Option<String> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .encoder_name
            .clone()
    }

    fn target_format(&self) -> Option<MediaFormat> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .target_format
            .clone()
    }
}

struct FactoryState {
    scripted: VecDeque<MockTrackPipeline>,
    created_tracks: Vec<usize>,
    fail_tracks: HashMap<usize, CodecError>,
}

/// Scripted implementation of [`PipelineFactory`].
///
/// Serves pushed pipelines in creation order and records which tracks were
/// asked for; unscripted tracks get a default (finished) pipeline.
pub struct MockPipelineFactory {
    state: Mutex<FactoryState>,
}

impl Default for MockPipelineFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl MockPipelineFactory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FactoryState {
                scripted: VecDeque::new(),
                created_tracks: Vec::new(),
                fail_tracks: HashMap::new(),
            }),
        }
    }

    /// Queues a pipeline to serve for the next creation call.
    pub fn push(&self, pipeline: MockTrackPipeline) {
        self.state
            .lock()
            .expect("mock state poisoned")
            .scripted
            .push_back(pipeline);
    }

    /// Makes creation fail for the given track.
    pub fn fail_for_track(&self, track: usize, error: CodecError) {
        self.state
            .lock()
            .expect("mock state poisoned")
            .fail_tracks
            .insert(track, error);
    }

    /// Tracks creation was requested for, in request order.
    pub fn created_tracks(&self) -> Vec<usize> {
        self.state
            .lock()
            .expect("mock state poisoned")
            .created_tracks
            .clone()
    }
}

impl PipelineFactory for MockPipelineFactory {
    fn create(
        &self,
        track: usize,
        _source_format: &MediaFormat,
        _source: Arc<dyn MediaSource>,
        _decoder: Arc<dyn Decoder>,
        _renderer: Option<Arc<dyn FrameRenderer>>,
        _encoder: Arc<dyn Encoder>,
        _target: Arc<dyn MediaTarget>,
        _target_video_format: Option<&MediaFormat>,
        _target_audio_format: Option<&MediaFormat>,
    ) -> Result<Box<dyn TrackPipeline>, CodecError> {
        let mut state = self.state.lock().expect("mock state poisoned");
        state.created_tracks.push(track);
        if let Some(error) = state.fail_tracks.get(&track) {
            return Err(error.clone());
        }
        let pipeline = state
            .scripted
            .pop_front()
            .unwrap_or_default();
        Ok(Box::new(pipeline))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_state() {
        let pipeline = MockTrackPipeline::new();
        let handle = pipeline.clone();

        let mut boxed: Box<dyn TrackPipeline> = Box::new(pipeline);
        boxed.start().unwrap();
        boxed.stop();

        assert!(handle.started());
        assert!(handle.stopped());
    }

    #[test]
    fn test_finish_after_steps() {
        let pipeline = MockTrackPipeline::new();
        pipeline.finish_after_steps(3);
        let mut boxed: Box<dyn TrackPipeline> = Box::new(pipeline.clone());

        assert_eq!(boxed.process_step(), Ok(StepResult::FrameProcessed));
        assert_eq!(boxed.process_step(), Ok(StepResult::FrameProcessed));
        assert_eq!(boxed.process_step(), Ok(StepResult::EndOfStream));
        assert_eq!(boxed.process_step(), Ok(StepResult::EndOfStream));
        assert_eq!(pipeline.steps(), 4);
    }

    #[test]
    fn test_factory_serves_in_order_and_records_tracks() {
        let factory = MockPipelineFactory::new();
        let first = MockTrackPipeline::new();
        let second = MockTrackPipeline::new();
        factory.push(first.clone());
        factory.push(second.clone());

        let source: Arc<dyn MediaSource> = Arc::new(super::super::MockSource::with_video_track(1));
        let target: Arc<dyn MediaTarget> = Arc::new(super::super::MockTarget::new());
        let format = MediaFormat::new("video/avc");
        let mut served = factory
            .create(
                0,
                &format,
                Arc::clone(&source),
                super::super::fixtures::decoder(),
                None,
                super::super::fixtures::encoder(),
                Arc::clone(&target),
                None,
                None,
            )
            .unwrap();
        served.start().unwrap();

        assert!(first.started());
        assert!(!second.started());
        assert_eq!(factory.created_tracks(), vec![0]);
    }
}
