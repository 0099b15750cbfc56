//! Mock media source for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::io::{EncodedSample, MediaSource};
use crate::media::MediaFormat;

struct TrackState {
    format: MediaFormat,
    samples: VecDeque<EncodedSample>,
    original: Vec<EncodedSample>,
}

/// Mock implementation of [`MediaSource`].
///
/// Tracks are configured up front with their formats and sample queues;
/// reads pop samples in order. An endless source keeps producing data
/// samples and never reaches end of stream, which is useful for exercising
/// cancellation.
pub struct MockSource {
    tracks: Mutex<Vec<TrackState>>,
    selected: Mutex<Vec<usize>>,
    release_count: AtomicUsize,
    endless: bool,
    endless_pts: AtomicUsize,
}

impl MockSource {
    /// Source with the given tracks and their queued samples.
    pub fn from_tracks(tracks: Vec<(MediaFormat, Vec<EncodedSample>)>) -> Self {
        Self {
            tracks: Mutex::new(
                tracks
                    .into_iter()
                    .map(|(format, samples)| TrackState {
                        format,
                        original: samples.clone(),
                        samples: samples.into(),
                    })
                    .collect(),
            ),
            selected: Mutex::new(Vec::new()),
            release_count: AtomicUsize::new(0),
            endless: false,
            endless_pts: AtomicUsize::new(0),
        }
    }

    /// Single video track with `count` data samples at one-second intervals
    /// plus an end-of-stream marker.
    pub fn with_video_track(count: usize) -> Self {
        Self::from_tracks(vec![(
            MediaFormat::video("video/avc", 1920, 1080)
                .with_duration(Duration::from_secs(count as u64)),
            super::fixtures::samples(count),
        )])
    }

    /// Single audio track with `count` data samples plus an end-of-stream
    /// marker.
    pub fn with_audio_track(count: usize) -> Self {
        Self::from_tracks(vec![(
            MediaFormat::audio("audio/aac", 48_000, 2)
                .with_duration(Duration::from_secs(count as u64)),
            super::fixtures::samples(count),
        )])
    }

    /// Single video track that never delivers a sample.
    pub fn with_empty_video_track() -> Self {
        Self::from_tracks(vec![(
            MediaFormat::video("video/avc", 1920, 1080).with_duration(Duration::from_secs(10)),
            Vec::new(),
        )])
    }

    /// Single video track that produces data samples forever.
    pub fn with_endless_video_track() -> Self {
        let mut source = Self::from_tracks(vec![(
            MediaFormat::video("video/avc", 1920, 1080).with_duration(Duration::from_secs(10)),
            Vec::new(),
        )]);
        source.endless = true;
        source
    }

    /// Drops every configured track, turning this into a zero-track source.
    pub fn clear_tracks(&self) {
        self.tracks.lock().expect("mock state poisoned").clear();
    }

    /// Payload of the `index`-th originally configured sample of a track.
    pub fn sample_payload(&self, track: usize, index: usize) -> Vec<u8> {
        self.tracks.lock().expect("mock state poisoned")[track].original[index]
            .data
            .clone()
    }

    /// Tracks that pipelines selected, in selection order.
    pub fn selected_tracks(&self) -> Vec<usize> {
        self.selected.lock().expect("mock state poisoned").clone()
    }

    /// How many times `release` was called.
    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::SeqCst)
    }
}

impl MediaSource for MockSource {
    fn track_count(&self) -> usize {
        self.tracks.lock().expect("mock state poisoned").len()
    }

    fn track_format(&self, track: usize) -> MediaFormat {
        self.tracks.lock().expect("mock state poisoned")[track]
            .format
            .clone()
    }

    fn select_track(&self, track: usize) {
        self.selected.lock().expect("mock state poisoned").push(track);
    }

    fn read_sample(&self, track: usize) -> Option<EncodedSample> {
        if self.endless {
            let pts = self.endless_pts.fetch_add(1, Ordering::SeqCst);
            return Some(EncodedSample::data(
                vec![0u8; 4],
                Duration::from_millis(pts as u64),
            ));
        }
        self.tracks.lock().expect("mock state poisoned")[track]
            .samples
            .pop_front()
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}
