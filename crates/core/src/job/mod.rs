//! The transformation job orchestrator.
//!
//! A job turns N independent per-track pipelines into one coherent,
//! cancellable, observable unit of work. It enforces the storage precondition
//! before committing irreversible work, builds and starts pipelines
//! all-or-nothing, drives them with a single aggregate step loop, and
//! guarantees release of every acquired resource on every exit path.

mod error;
mod progress;

pub use error::TransformError;
pub use progress::{ProgressTracker, GRANULARITY_DEFAULT, GRANULARITY_NONE};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::codec::{Decoder, Encoder};
use crate::io::{MediaSource, MediaTarget};
use crate::listener::{CallbackHandler, TransformationListener};
use crate::media::MediaFormat;
use crate::metrics;
use crate::pipeline::{DefaultPipelineFactory, PipelineFactory, StepResult, TrackPipeline};
use crate::render::FrameRenderer;
use crate::stats::StatsCollector;
use crate::storage::{self, StorageCheck};

/// Lifecycle of a job. Terminal states are reachable only through the shared
/// release routine, exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Created,
    Running,
    Completed,
    Cancelled,
    Failed,
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Failed)
    }
}

/// Cooperative cancellation flag shared between a job and whoever may stop
/// it. The job observes it at the top of its step loop.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. The job routes to the cancel path at its next
    /// step-loop iteration.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Everything a caller supplies to describe one transformation.
pub struct JobRequest {
    /// Caller-supplied identifier used in every callback. Generated when
    /// absent.
    pub job_id: Option<String>,
    /// Demuxed source container.
    pub source: Arc<dyn MediaSource>,
    /// Muxed target container.
    pub target: Arc<dyn MediaTarget>,
    /// Decoder handle shared by the job's transcode pipelines.
    pub decoder: Arc<dyn Decoder>,
    /// Optional frame transform between decode and encode.
    pub renderer: Option<Arc<dyn FrameRenderer>>,
    /// Encoder handle shared by the job's transcode pipelines.
    pub encoder: Arc<dyn Encoder>,
    /// Target format for video tracks; `None` leaves them untouched.
    pub target_video_format: Option<MediaFormat>,
    /// Target format for audio tracks; `None` leaves them untouched.
    pub target_audio_format: Option<MediaFormat>,
}

/// Which terminal callback a release dispatches.
enum Outcome {
    Completed,
    Cancelled,
    Failed(TransformError),
}

/// One transformation, bound to a source, a target, per-kind target formats,
/// a listener and a reporting granularity. Runs to a terminal state on a
/// single execution context via [`TransformationJob::execute`].
pub struct TransformationJob {
    id: String,
    source: Arc<dyn MediaSource>,
    target: Arc<dyn MediaTarget>,
    decoder: Arc<dyn Decoder>,
    renderer: Option<Arc<dyn FrameRenderer>>,
    encoder: Arc<dyn Encoder>,
    target_video_format: Option<MediaFormat>,
    target_audio_format: Option<MediaFormat>,
    listener: Arc<dyn TransformationListener>,
    handler: Arc<dyn CallbackHandler>,
    progress: ProgressTracker,
    factory: Arc<dyn PipelineFactory>,
    storage_check: StorageCheck,
    stats: StatsCollector,
    pipelines: Vec<Box<dyn TrackPipeline>>,
    track_formats: Vec<MediaFormat>,
    state: JobState,
    cancel: CancelHandle,
}

impl TransformationJob {
    /// Creates a job with the default factory and a storage check probing
    /// the target's filesystem.
    pub fn new(
        request: JobRequest,
        listener: Arc<dyn TransformationListener>,
        handler: Arc<dyn CallbackHandler>,
        granularity: u32,
    ) -> Self {
        let id = request
            .job_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let storage_check = StorageCheck::new(storage::default_probe(request.target.output_path()));

        Self {
            id,
            source: request.source,
            target: request.target,
            decoder: request.decoder,
            renderer: request.renderer,
            encoder: request.encoder,
            target_video_format: request.target_video_format,
            target_audio_format: request.target_audio_format,
            listener,
            handler,
            progress: ProgressTracker::new(granularity),
            factory: Arc::new(DefaultPipelineFactory),
            storage_check,
            stats: StatsCollector::new(),
            pipelines: Vec::new(),
            track_formats: Vec::new(),
            state: JobState::Created,
            cancel: CancelHandle::new(),
        }
    }

    /// Overrides the pipeline factory.
    pub fn with_factory(mut self, factory: Arc<dyn PipelineFactory>) -> Self {
        self.factory = factory;
        self
    }

    /// Overrides the storage precondition.
    pub fn with_storage_check(mut self, storage_check: StorageCheck) -> Self {
        self.storage_check = storage_check;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Handle for requesting cooperative cancellation from another context.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Runs the job to a terminal state on the calling thread. Exactly one
    /// terminal callback is issued, whatever happens.
    pub fn execute(&mut self) {
        self.state = JobState::Running;
        match self.transform() {
            Ok(()) => {}
            Err(TransformError::Cancelled) => self.cancel(),
            Err(cause) => self.error(cause),
        }
    }

    fn transform(&mut self) -> Result<(), TransformError> {
        self.track_formats = (0..self.source.track_count())
            .map(|track| self.source.track_format(track))
            .collect();

        if let Err(err) = self.storage_check.verify(
            &self.track_formats,
            self.target_video_format.as_ref(),
            self.target_audio_format.as_ref(),
        ) {
            metrics::STORAGE_CHECK_FAILURES.inc();
            return Err(err);
        }

        self.create_track_pipelines()?;
        self.start_pipelines()?;
        self.handler.on_started(self.listener.as_ref(), &self.id);
        info!(job_id = %self.id, tracks = self.pipelines.len(), "transformation started");

        loop {
            if self.cancel.is_cancelled() {
                debug!(job_id = %self.id, "cancellation observed in step loop");
                return Err(TransformError::Cancelled);
            }
            if self.process_next_frame()? {
                break;
            }
        }

        self.release(Outcome::Completed);
        Ok(())
    }

    /// Builds one pipeline per source track, in source order. All-or-nothing
    /// with respect to the job's pipeline list: a failure leaves it empty.
    fn create_track_pipelines(&mut self) -> Result<(), TransformError> {
        if self.track_formats.is_empty() {
            return Err(TransformError::NoTracksFound);
        }

        let mut pipelines: Vec<Box<dyn TrackPipeline>> =
            Vec::with_capacity(self.track_formats.len());
        for (track, format) in self.track_formats.iter().enumerate() {
            let pipeline = self
                .factory
                .create(
                    track,
                    format,
                    Arc::clone(&self.source),
                    Arc::clone(&self.decoder),
                    self.renderer.clone(),
                    Arc::clone(&self.encoder),
                    Arc::clone(&self.target),
                    self.target_video_format.as_ref(),
                    self.target_audio_format.as_ref(),
                )
                .map_err(|source| TransformError::Codec { track, source })?;

            let variant = if pipeline.decoder_name().is_some() {
                "transcode"
            } else {
                "passthrough"
            };
            metrics::TRACKS_TRANSFORMED.with_label_values(&[variant]).inc();

            self.stats.add_source_track(format.clone());
            self.stats
                .set_track_codecs(track, pipeline.decoder_name(), pipeline.encoder_name());
            pipelines.push(pipeline);
        }
        self.pipelines = pipelines;
        Ok(())
    }

    /// Starts every pipeline in track order, propagating the first failure
    /// immediately. Pipelines after the failing one are never started; the
    /// error path stops the ones that did start.
    fn start_pipelines(&mut self) -> Result<(), TransformError> {
        for (track, pipeline) in self.pipelines.iter_mut().enumerate() {
            pipeline
                .start()
                .map_err(|source| TransformError::Codec { track, source })?;
        }
        Ok(())
    }

    /// Steps every pipeline once, in track order, and returns whether the
    /// whole job is done. Every per-track step is timed into the stats, even
    /// for tracks that already reached end of stream.
    fn process_next_frame(&mut self) -> Result<bool, TransformError> {
        let mut all_finished = true;

        let pipelines = &mut self.pipelines;
        let stats = &mut self.stats;
        for (track, pipeline) in pipelines.iter_mut().enumerate() {
            let step_started = Instant::now();
            let step = pipeline.process_step();
            stats.increase_track_processing_duration(track, step_started.elapsed());

            match step.map_err(|source| TransformError::Codec { track, source })? {
                StepResult::EndOfStream => {}
                StepResult::FrameProcessed => all_finished = false,
            }
        }

        if all_finished {
            // Completion always reports 1.0, bypassing the throttle.
            self.progress.record_terminal();
            self.handler.on_progress(self.listener.as_ref(), &self.id, 1.0);
            return Ok(true);
        }

        let aggregate = self
            .pipelines
            .iter()
            .map(|pipeline| pipeline.progress())
            .sum::<f64>()
            / self.pipelines.len() as f64;

        if self.progress.should_report(aggregate) {
            self.handler
                .on_progress(self.listener.as_ref(), &self.id, aggregate);
        }

        Ok(false)
    }

    /// Terminates through the cancel path.
    fn cancel(&mut self) {
        info!(job_id = %self.id, "transformation cancelled");
        self.release(Outcome::Cancelled);
    }

    /// Terminates through the error path.
    fn error(&mut self, cause: TransformError) {
        warn!(job_id = %self.id, %cause, "transformation failed");
        self.release(Outcome::Failed(cause));
    }

    /// The single shared stop/release/finalize routine. Stops every pipeline,
    /// releases source and target, records the final target formats,
    /// finalizes the stats and dispatches exactly one terminal callback
    /// selected by the outcome. Further calls are no-ops.
    fn release(&mut self, outcome: Outcome) {
        if self.state.is_terminal() {
            debug!(job_id = %self.id, "release after terminal state ignored");
            return;
        }

        for pipeline in self.pipelines.iter_mut() {
            pipeline.stop();
        }
        for (track, pipeline) in self.pipelines.iter().enumerate() {
            self.stats.set_target_format(track, pipeline.target_format());
        }
        self.source.release();
        self.target.release();

        let reports = self.stats.finalize();
        match outcome {
            Outcome::Completed => {
                self.state = JobState::Completed;
                info!(job_id = %self.id, "transformation completed");
                self.handler
                    .on_completed(self.listener.as_ref(), &self.id, reports);
            }
            Outcome::Cancelled => {
                self.state = JobState::Cancelled;
                self.handler
                    .on_cancelled(self.listener.as_ref(), &self.id, reports);
            }
            Outcome::Failed(cause) => {
                self.state = JobState::Failed;
                error!(job_id = %self.id, %cause, "transformation released after failure");
                self.handler
                    .on_error(self.listener.as_ref(), &self.id, &cause, reports);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CodecError;
    use crate::listener::DirectCallbackHandler;
    use crate::testing::{
        fixtures, FixedStorageProbe, ListenerEvent, MockPipelineFactory, MockSource, MockTarget,
        MockTrackPipeline, RecordingListener,
    };
    use std::time::Duration;

    struct Harness {
        job: TransformationJob,
        listener: Arc<RecordingListener>,
        source: Arc<MockSource>,
        target: Arc<MockTarget>,
        factory: Arc<MockPipelineFactory>,
    }

    /// Job over a two-track source (120 s video + 60 s audio), 6 Mibit/s
    /// target formats, a scripted factory and a 1 GB storage probe.
    fn harness_with_pipelines(pipelines: Vec<MockTrackPipeline>) -> Harness {
        harness_with_storage(pipelines, 1_000_000_000)
    }

    fn harness_with_storage(pipelines: Vec<MockTrackPipeline>, available_bytes: u64) -> Harness {
        let source = Arc::new(fixtures::two_track_source());
        let target = Arc::new(MockTarget::new());
        let listener = Arc::new(RecordingListener::new());
        let factory = Arc::new(MockPipelineFactory::new());
        for pipeline in pipelines {
            factory.push(pipeline);
        }

        let request = JobRequest {
            job_id: Some("42".to_string()),
            source: Arc::clone(&source) as _,
            target: Arc::clone(&target) as _,
            decoder: fixtures::decoder(),
            renderer: None,
            encoder: fixtures::encoder(),
            target_video_format: Some(fixtures::six_mbit_format("video/hevc")),
            target_audio_format: Some(fixtures::six_mbit_format("audio/aac")),
        };
        let job = TransformationJob::new(
            request,
            Arc::clone(&listener) as _,
            Arc::new(DirectCallbackHandler),
            GRANULARITY_NONE,
        )
        .with_factory(Arc::clone(&factory) as _)
        .with_storage_check(StorageCheck::new(Arc::new(FixedStorageProbe::new(
            available_bytes,
        ))));

        Harness {
            job,
            listener,
            source,
            target,
            factory,
        }
    }

    fn finished_pipeline() -> MockTrackPipeline {
        let pipeline = MockTrackPipeline::new();
        pipeline.set_step_result(Ok(StepResult::EndOfStream));
        pipeline.set_progress(1.0);
        pipeline
    }

    #[test]
    fn test_execute_completes_without_error() {
        let video = finished_pipeline();
        let audio = finished_pipeline();
        let mut harness = harness_with_pipelines(vec![video.clone(), audio.clone()]);

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Completed);
        assert_eq!(harness.listener.started_count(), 1);
        assert_eq!(harness.listener.progress_values(), vec![1.0]);
        assert_eq!(harness.listener.completed_count(), 1);
        assert_eq!(harness.listener.terminal_count(), 1);
        assert!(video.stopped());
        assert!(audio.stopped());
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
    }

    #[test]
    fn test_completion_reports_per_track_stats() {
        let video = finished_pipeline();
        video.set_target_format(MediaFormat::video("video/hevc", 1280, 720));
        let audio = finished_pipeline();
        audio.set_codec_names(None, None);
        let mut harness = harness_with_pipelines(vec![video, audio]);

        harness.job.execute();

        let reports = harness.listener.completed_reports().unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].source_format.mime_type, "video/avc");
        assert_eq!(
            reports[0].target_format.as_ref().map(|f| f.width),
            Some(Some(1280))
        );
        assert!(reports[0].decoder_name.is_some());
        assert!(reports[1].decoder_name.is_none());
    }

    #[test]
    fn test_cancellation_routes_to_cancel_path() {
        let mut harness = harness_with_pipelines(vec![finished_pipeline(), finished_pipeline()]);
        harness.job.cancel_handle().cancel();

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Cancelled);
        assert_eq!(harness.listener.cancelled_count(), 1);
        assert_eq!(harness.listener.terminal_count(), 1);
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
    }

    #[test]
    fn test_step_error_routes_to_error_path() {
        let video = finished_pipeline();
        let audio = MockTrackPipeline::new();
        audio.set_step_result(Err(CodecError::Internal("codec died".to_string())));
        let mut harness = harness_with_pipelines(vec![video.clone(), audio.clone()]);

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Failed);
        match harness.listener.last_error() {
            Some(TransformError::Codec { track, source }) => {
                assert_eq!(track, 1);
                assert_eq!(source, CodecError::Internal("codec died".to_string()));
            }
            other => panic!("unexpected terminal error: {other:?}"),
        }
        assert!(video.stopped());
        assert!(audio.stopped());
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
        assert_eq!(harness.listener.terminal_count(), 1);
    }

    #[test]
    fn test_insufficient_storage_fails_before_any_pipeline() {
        let mut harness = harness_with_storage(vec![], 1_000_000);

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Failed);
        assert!(harness.factory.created_tracks().is_empty());
        match harness.listener.last_error() {
            Some(TransformError::InsufficientStorage {
                estimated_bytes,
                available_bytes,
            }) => {
                assert_eq!(estimated_bytes, 141_557_760);
                assert_eq!(available_bytes, 1_000_000);
            }
            other => panic!("unexpected terminal error: {other:?}"),
        }
    }

    #[test]
    fn test_zero_track_source_yields_no_tracks_found() {
        let mut harness = harness_with_pipelines(vec![]);
        harness.source.clear_tracks();

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Failed);
        assert!(harness.factory.created_tracks().is_empty());
        assert_eq!(
            harness.listener.last_error(),
            Some(TransformError::NoTracksFound)
        );
    }

    #[test]
    fn test_pipelines_are_created_in_track_order() {
        let mut harness = harness_with_pipelines(vec![finished_pipeline(), finished_pipeline()]);

        harness.job.execute();

        assert_eq!(harness.factory.created_tracks(), vec![0, 1]);
    }

    #[test]
    fn test_later_start_failure_stops_earlier_pipelines() {
        let first = MockTrackPipeline::new();
        first.set_step_result(Ok(StepResult::EndOfStream));
        let second = MockTrackPipeline::new();
        second.fail_start_with(CodecError::Internal("internal codec error".to_string()));
        let mut harness = harness_with_pipelines(vec![first.clone(), second.clone()]);

        harness.job.execute();

        assert_eq!(harness.job.state(), JobState::Failed);
        assert_eq!(first.start_count(), 1);
        assert_eq!(second.start_count(), 1);
        assert!(first.stopped());
        assert!(second.stopped());
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
        assert_eq!(harness.listener.started_count(), 0);
    }

    #[test]
    fn test_start_failure_never_starts_later_pipelines() {
        let first = MockTrackPipeline::new();
        first.fail_start_with(CodecError::Internal("internal codec error".to_string()));
        let second = MockTrackPipeline::new();
        let mut harness = harness_with_pipelines(vec![first.clone(), second.clone()]);

        harness.job.execute();

        assert_eq!(first.start_count(), 1);
        assert_eq!(second.start_count(), 0);
    }

    #[test]
    fn test_all_eos_completes_and_times_every_track() {
        let video = finished_pipeline();
        video.set_step_delay(Duration::from_millis(1));
        let audio = finished_pipeline();
        audio.set_step_delay(Duration::from_millis(1));
        let mut harness = harness_with_pipelines(vec![video, audio]);

        harness.job.execute();

        let reports = harness.listener.completed_reports().unwrap();
        assert!(reports[0].processing_duration > Duration::ZERO);
        assert!(reports[1].processing_duration > Duration::ZERO);
        assert_eq!(harness.listener.progress_values(), vec![1.0]);
    }

    #[test]
    fn test_finished_tracks_keep_accumulating_step_time() {
        // Track 0 is done from the start, track 1 needs a few steps; both
        // must be stepped and timed on every aggregate call.
        let video = finished_pipeline();
        video.set_step_delay(Duration::from_millis(1));
        let audio = MockTrackPipeline::new();
        audio.set_step_delay(Duration::from_millis(1));
        audio.finish_after_steps(3);
        let mut harness = harness_with_pipelines(vec![video.clone(), audio.clone()]);

        harness.job.execute();

        assert_eq!(video.steps(), audio.steps());
        let reports = harness.listener.completed_reports().unwrap();
        assert!(reports[0].processing_duration >= Duration::from_millis(3));
    }

    #[test]
    fn test_aggregate_progress_is_arithmetic_mean() {
        let video = MockTrackPipeline::new();
        video.set_step_result(Ok(StepResult::EndOfStream));
        video.set_progress(1.0);
        let audio = MockTrackPipeline::new();
        audio.set_progress(0.5);
        audio.finish_after_steps(2);
        let mut harness = harness_with_pipelines(vec![video, audio]);

        harness.job.execute();

        // First aggregate call: mean of {1.0, 0.5}; completion then reports 1.0.
        assert_eq!(harness.listener.progress_values(), vec![0.75, 1.0]);
    }

    #[test]
    fn test_progress_below_granularity_is_not_reported() {
        let video = MockTrackPipeline::new();
        video.set_progress(0.25);
        video.finish_after_steps(2);
        let audio = MockTrackPipeline::new();
        audio.set_progress(0.25);
        audio.finish_after_steps(2);
        let mut harness = harness_with_pipelines(vec![video, audio]);
        harness.job.progress = ProgressTracker::new(5).with_last_reported(0.2);

        harness.job.execute();

        // 0.25 differs from 0.2 by less than 1/5; only completion reports.
        assert_eq!(harness.listener.progress_values(), vec![1.0]);
    }

    #[test]
    fn test_progress_above_granularity_is_reported() {
        let video = MockTrackPipeline::new();
        video.set_progress(0.45);
        video.finish_after_steps(2);
        let audio = MockTrackPipeline::new();
        audio.set_progress(0.45);
        audio.finish_after_steps(2);
        let mut harness = harness_with_pipelines(vec![video, audio]);
        harness.job.progress = ProgressTracker::new(5).with_last_reported(0.2);

        harness.job.execute();

        assert_eq!(harness.listener.progress_values(), vec![0.45, 1.0]);
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut harness = harness_with_pipelines(vec![finished_pipeline(), finished_pipeline()]);

        harness.job.execute();
        harness.job.cancel();
        harness.job.error(TransformError::NoTracksFound);

        assert_eq!(harness.listener.terminal_count(), 1);
        assert_eq!(harness.listener.completed_count(), 1);
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
    }

    #[test]
    fn test_direct_error_releases_and_reports() {
        let video = finished_pipeline();
        video.set_target_format(MediaFormat::new("video/hevc"));
        let audio = finished_pipeline();
        let mut harness = harness_with_pipelines(vec![video.clone(), audio.clone()]);

        // Load pipelines without entering the step loop.
        harness.job.track_formats = vec![
            fixtures::video_track_format(),
            fixtures::audio_track_format(),
        ];
        harness.job.create_track_pipelines().unwrap();

        harness
            .job
            .error(TransformError::Codec {
                track: 0,
                source: CodecError::ReleasedCodec,
            });

        assert_eq!(harness.job.state(), JobState::Failed);
        assert!(video.stopped());
        assert!(audio.stopped());
        let events = harness.listener.events();
        assert!(matches!(
            events.last(),
            Some(ListenerEvent::Error(TransformError::Codec { .. }, _))
        ));
        let reports = match events.last() {
            Some(ListenerEvent::Error(_, reports)) => reports.clone(),
            _ => unreachable!(),
        };
        assert_eq!(
            reports[0].target_format.as_ref().map(|f| f.mime_type.clone()),
            Some("video/hevc".to_string())
        );
    }

    #[test]
    fn test_direct_cancel_releases_and_reports() {
        let mut harness = harness_with_pipelines(vec![finished_pipeline(), finished_pipeline()]);
        harness.job.track_formats = vec![
            fixtures::video_track_format(),
            fixtures::audio_track_format(),
        ];
        harness.job.create_track_pipelines().unwrap();

        harness.job.cancel();

        assert_eq!(harness.job.state(), JobState::Cancelled);
        assert_eq!(harness.listener.cancelled_count(), 1);
        assert_eq!(harness.source.release_count(), 1);
        assert_eq!(harness.target.release_count(), 1);
    }

    #[test]
    fn test_generated_job_id_is_used_in_callbacks() {
        let source = Arc::new(fixtures::two_track_source());
        let listener = Arc::new(RecordingListener::new());
        let factory = Arc::new(MockPipelineFactory::new());
        factory.push(finished_pipeline());
        factory.push(finished_pipeline());

        let request = JobRequest {
            job_id: None,
            source,
            target: Arc::new(MockTarget::new()),
            decoder: fixtures::decoder(),
            renderer: None,
            encoder: fixtures::encoder(),
            target_video_format: None,
            target_audio_format: None,
        };
        let mut job = TransformationJob::new(
            request,
            Arc::clone(&listener) as _,
            Arc::new(DirectCallbackHandler),
            GRANULARITY_DEFAULT,
        )
        .with_factory(factory as _)
        .with_storage_check(StorageCheck::new(Arc::new(FixedStorageProbe::new(
            u64::MAX,
        ))));

        assert!(!job.id().is_empty());
        let id = job.id().to_string();
        job.execute();

        assert_eq!(listener.completed_job_ids(), vec![id]);
    }
}
