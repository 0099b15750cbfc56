//! Testing utilities and mock implementations of the collaborator traits.
//!
//! Every external boundary of the engine (source, target, codecs, renderer,
//! pipelines, storage probe, listener) has a controllable mock here, allowing
//! the orchestrator to be tested without real containers or codecs.
//!
//! # Example
//!
//! ```rust,ignore
//! use tracktor_core::testing::{MockSource, MockTarget, RecordingListener};
//!
//! let source = MockSource::with_video_track(10);
//! let target = MockTarget::new();
//! let listener = RecordingListener::new();
//!
//! // Run a job against the mocks...
//! assert_eq!(listener.completed_count(), 1);
//! ```

mod mock_codec;
mod mock_pipeline;
mod mock_source;
mod mock_target;
mod recording_listener;

pub use mock_codec::{MockDecoder, MockEncoder, MockRenderer};
pub use mock_pipeline::{MockPipelineFactory, MockTrackPipeline};
pub use mock_source::MockSource;
pub use mock_target::MockTarget;
pub use recording_listener::{ListenerEvent, RecordingListener};

use crate::storage::StorageProbe;

/// Storage probe reporting a fixed number of available bytes.
#[derive(Debug)]
pub struct FixedStorageProbe(u64);

impl FixedStorageProbe {
    pub fn new(available_bytes: u64) -> Self {
        Self(available_bytes)
    }
}

impl StorageProbe for FixedStorageProbe {
    fn available_bytes(&self) -> u64 {
        self.0
    }
}

/// Test fixtures and helper functions.
pub mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use crate::codec::{Decoder, Encoder};
    use crate::io::EncodedSample;
    use crate::media::MediaFormat;

    use super::{MockDecoder, MockEncoder, MockSource};

    /// 120 s video track format, as exposed by a source container.
    pub fn video_track_format() -> MediaFormat {
        MediaFormat::video("video/avc", 1920, 1080).with_duration(Duration::from_secs(120))
    }

    /// 60 s audio track format, as exposed by a source container.
    pub fn audio_track_format() -> MediaFormat {
        MediaFormat::audio("audio/aac", 48_000, 2).with_duration(Duration::from_secs(60))
    }

    /// Target format with a 6 Mibit/s bit rate.
    pub fn six_mbit_format(mime_type: &str) -> MediaFormat {
        MediaFormat::new(mime_type).with_bit_rate(6 * 1024 * 1024)
    }

    /// `count` data samples at one-second intervals followed by an
    /// end-of-stream marker.
    pub fn samples(count: usize) -> Vec<EncodedSample> {
        let mut samples: Vec<EncodedSample> = (0..count)
            .map(|i| {
                let mut sample =
                    EncodedSample::data(vec![i as u8; 4], Duration::from_secs(i as u64));
                sample.key_frame = i == 0;
                sample
            })
            .collect();
        samples.push(EncodedSample::end_of_stream(Duration::from_secs(count as u64)));
        samples
    }

    /// Source with the 120 s video + 60 s audio track formats and no sample
    /// data. For jobs whose pipelines are mocked.
    pub fn two_track_source() -> MockSource {
        MockSource::from_tracks(vec![
            (video_track_format(), Vec::new()),
            (audio_track_format(), Vec::new()),
        ])
    }

    /// Source with a short playable video track and audio track, for jobs
    /// that run real pipelines end to end.
    pub fn playable_two_track_source() -> MockSource {
        MockSource::from_tracks(vec![
            (
                MediaFormat::video("video/avc", 1920, 1080)
                    .with_duration(Duration::from_secs(4)),
                samples(4),
            ),
            (
                MediaFormat::audio("audio/aac", 48_000, 2).with_duration(Duration::from_secs(3)),
                samples(3),
            ),
        ])
    }

    /// Fresh mock decoder handle.
    pub fn decoder() -> Arc<dyn Decoder> {
        Arc::new(MockDecoder::new())
    }

    /// Fresh mock encoder handle.
    pub fn encoder() -> Arc<dyn Encoder> {
        Arc::new(MockEncoder::new())
    }
}
