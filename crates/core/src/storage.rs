//! Storage precondition for transformation jobs.
//!
//! Before a job acquires any pipeline it estimates the output size from the
//! source track durations and the target bit rates, and compares the estimate
//! against the storage available at the output location. A failing job
//! performs no irreversible work.

use std::sync::Arc;

use crate::job::TransformError;
use crate::media::{MediaFormat, TrackKind};

/// Measures storage available for the output container.
pub trait StorageProbe: Send + Sync {
    /// Bytes currently available. Implementations that cannot measure should
    /// return `u64::MAX` rather than block every job.
    fn available_bytes(&self) -> u64;
}

/// Probe that never limits a job. Used where no filesystem measurement is
/// possible.
#[derive(Debug, Default)]
pub struct UnboundedProbe;

impl StorageProbe for UnboundedProbe {
    fn available_bytes(&self) -> u64 {
        u64::MAX
    }
}

/// Probe measuring the filesystem holding a given path via `statvfs`.
#[cfg(unix)]
#[derive(Debug)]
pub struct StatvfsProbe {
    path: std::path::PathBuf,
}

#[cfg(unix)]
impl StatvfsProbe {
    /// Creates a probe for the filesystem holding `path`. The path itself
    /// does not have to exist yet; the nearest existing ancestor is measured.
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(unix)]
impl StorageProbe for StatvfsProbe {
    fn available_bytes(&self) -> u64 {
        let mut candidate = self.path.as_path();
        loop {
            match nix::sys::statvfs::statvfs(candidate) {
                Ok(stat) => {
                    return (stat.blocks_available() as u64)
                        .saturating_mul(stat.fragment_size() as u64);
                }
                Err(_) => match candidate.parent() {
                    Some(parent) => candidate = parent,
                    None => {
                        tracing::warn!(
                            path = %self.path.display(),
                            "could not measure available storage, skipping check"
                        );
                        return u64::MAX;
                    }
                },
            }
        }
    }
}

/// Returns the probe used when a job is built without an explicit one.
pub(crate) fn default_probe(path: &std::path::Path) -> Arc<dyn StorageProbe> {
    #[cfg(unix)]
    {
        Arc::new(StatvfsProbe::new(path))
    }
    #[cfg(not(unix))]
    {
        let _ = path;
        Arc::new(UnboundedProbe)
    }
}

/// Estimates the output container size in bytes.
///
/// Each track contributes `duration_secs * bit_rate / 8`, where the bit rate
/// is taken from the target format matching the track's kind, falling back to
/// the track's own bit rate when no target applies. Tracks with no known
/// duration or bit rate contribute nothing.
pub fn estimate_required_bytes(
    track_formats: &[MediaFormat],
    target_video: Option<&MediaFormat>,
    target_audio: Option<&MediaFormat>,
) -> u64 {
    track_formats
        .iter()
        .map(|format| {
            let target = match format.kind() {
                TrackKind::Video => target_video,
                TrackKind::Audio => target_audio,
                TrackKind::Other => None,
            };
            let bit_rate = target
                .and_then(|t| t.bit_rate)
                .or(format.bit_rate)
                .unwrap_or(0);
            match format.duration {
                Some(duration) => (duration.as_secs_f64() * (bit_rate as f64 / 8.0)) as u64,
                None => 0,
            }
        })
        .sum()
}

/// The precondition itself: probe plus configured headroom.
pub struct StorageCheck {
    probe: Arc<dyn StorageProbe>,
    reserve_bytes: u64,
}

impl StorageCheck {
    /// Creates a check with no reserved headroom.
    pub fn new(probe: Arc<dyn StorageProbe>) -> Self {
        Self {
            probe,
            reserve_bytes: 0,
        }
    }

    /// Reserves headroom subtracted from whatever the probe reports.
    pub fn with_reserve(mut self, reserve_bytes: u64) -> Self {
        self.reserve_bytes = reserve_bytes;
        self
    }

    /// Verifies that the estimated output fits into the available storage.
    pub fn verify(
        &self,
        track_formats: &[MediaFormat],
        target_video: Option<&MediaFormat>,
        target_audio: Option<&MediaFormat>,
    ) -> Result<(), TransformError> {
        let estimated_bytes = estimate_required_bytes(track_formats, target_video, target_audio);
        let available_bytes = self
            .probe
            .available_bytes()
            .saturating_sub(self.reserve_bytes);

        if estimated_bytes > available_bytes {
            return Err(TransformError::InsufficientStorage {
                estimated_bytes,
                available_bytes,
            });
        }
        Ok(())
    }
}
