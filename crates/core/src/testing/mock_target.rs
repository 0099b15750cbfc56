//! Mock media target for testing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::io::{EncodedSample, MediaTarget};
use crate::media::MediaFormat;

/// Mock implementation of [`MediaTarget`] recording everything written to it.
pub struct MockTarget {
    output_path: PathBuf,
    added_tracks: Mutex<Vec<MediaFormat>>,
    samples: Mutex<HashMap<usize, Vec<EncodedSample>>>,
    release_count: AtomicUsize,
}

impl Default for MockTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl MockTarget {
    pub fn new() -> Self {
        Self::with_output_path(std::env::temp_dir().join("tracktor-test-output.mp4"))
    }

    pub fn with_output_path(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
            added_tracks: Mutex::new(Vec::new()),
            samples: Mutex::new(HashMap::new()),
            release_count: AtomicUsize::new(0),
        }
    }

    /// Formats of the tracks registered so far, in registration order.
    pub fn added_tracks(&self) -> Vec<MediaFormat> {
        self.added_tracks.lock().expect("mock state poisoned").clone()
    }

    /// Samples written to the given output track.
    pub fn written_samples(&self, track: usize) -> Vec<EncodedSample> {
        self.samples
            .lock()
            .expect("mock state poisoned")
            .get(&track)
            .cloned()
            .unwrap_or_default()
    }

    /// How many times `release` was called.
    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::SeqCst)
    }
}

impl MediaTarget for MockTarget {
    fn output_path(&self) -> &Path {
        &self.output_path
    }

    fn add_track(&self, format: &MediaFormat) -> usize {
        let mut tracks = self.added_tracks.lock().expect("mock state poisoned");
        tracks.push(format.clone());
        tracks.len() - 1
    }

    fn write_sample(&self, track: usize, sample: &EncodedSample) {
        self.samples
            .lock()
            .expect("mock state poisoned")
            .entry(track)
            .or_default()
            .push(sample.clone());
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}
