//! Per-track transformation statistics.
//!
//! The collector accumulates codec names, formats and processing time while a
//! job runs and produces one immutable ordered report per track when the job
//! reaches a terminal state. What happens to the reports afterwards is the
//! listener's concern.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::media::MediaFormat;

/// Finalized statistics for one source track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackReport {
    /// Format the track had in the source container.
    pub source_format: MediaFormat,
    /// Format the track ended up with in the target container. Filled in at
    /// release time, since negotiation may change it during pipeline start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_format: Option<MediaFormat>,
    /// Name of the decoder that processed the track, `None` for passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decoder_name: Option<String>,
    /// Name of the encoder that processed the track, `None` for passthrough.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder_name: Option<String>,
    /// Cumulative wall-clock time spent stepping this track.
    pub processing_duration: Duration,
}

/// Accumulates per-track statistics over the lifetime of one job.
#[derive(Debug, Default)]
pub struct StatsCollector {
    tracks: Vec<TrackReport>,
}

impl StatsCollector {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a source track. Tracks are indexed in registration order,
    /// matching the source container's track order.
    pub fn add_source_track(&mut self, format: MediaFormat) {
        self.tracks.push(TrackReport {
            source_format: format,
            target_format: None,
            decoder_name: None,
            encoder_name: None,
            processing_duration: Duration::ZERO,
        });
    }

    /// Records the codec names used for a track. Decoder and encoder names
    /// are kept separately and never assumed to coincide.
    pub fn set_track_codecs(
        &mut self,
        track: usize,
        decoder_name: Option<String>,
        encoder_name: Option<String>,
    ) {
        if let Some(report) = self.tracks.get_mut(track) {
            report.decoder_name = decoder_name;
            report.encoder_name = encoder_name;
        }
    }

    /// Records the final target format of a track.
    pub fn set_target_format(&mut self, track: usize, format: Option<MediaFormat>) {
        if let Some(report) = self.tracks.get_mut(track) {
            report.target_format = format;
        }
    }

    /// Adds one step's elapsed time to a track's cumulative processing time.
    pub fn increase_track_processing_duration(&mut self, track: usize, elapsed: Duration) {
        if let Some(report) = self.tracks.get_mut(track) {
            report.processing_duration += elapsed;
        }
    }

    /// Number of registered tracks.
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Produces the ordered per-track reports. The snapshot is detached from
    /// the collector and immutable from the caller's point of view.
    pub fn finalize(&self) -> Vec<TrackReport> {
        self.tracks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collector_with_two_tracks() -> StatsCollector {
        let mut collector = StatsCollector::new();
        collector.add_source_track(MediaFormat::video("video/avc", 1920, 1080));
        collector.add_source_track(MediaFormat::audio("audio/aac", 48_000, 2));
        collector
    }

    #[test]
    fn test_tracks_keep_registration_order() {
        let collector = collector_with_two_tracks();
        let reports = collector.finalize();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].source_format.mime_type, "video/avc");
        assert_eq!(reports[1].source_format.mime_type, "audio/aac");
    }

    #[test]
    fn test_codec_names_are_distinct() {
        let mut collector = collector_with_two_tracks();
        collector.set_track_codecs(
            0,
            Some("avc-decoder".to_string()),
            Some("hevc-encoder".to_string()),
        );

        let reports = collector.finalize();
        assert_eq!(reports[0].decoder_name.as_deref(), Some("avc-decoder"));
        assert_eq!(reports[0].encoder_name.as_deref(), Some("hevc-encoder"));
        assert_eq!(reports[1].decoder_name, None);
    }

    #[test]
    fn test_processing_duration_accumulates() {
        let mut collector = collector_with_two_tracks();
        collector.increase_track_processing_duration(1, Duration::from_millis(5));
        collector.increase_track_processing_duration(1, Duration::from_millis(7));

        let reports = collector.finalize();
        assert_eq!(reports[1].processing_duration, Duration::from_millis(12));
        assert_eq!(reports[0].processing_duration, Duration::ZERO);
    }

    #[test]
    fn test_out_of_range_track_is_ignored() {
        let mut collector = collector_with_two_tracks();
        collector.increase_track_processing_duration(9, Duration::from_secs(1));
        collector.set_target_format(9, Some(MediaFormat::new("video/hevc")));

        assert_eq!(collector.finalize().len(), 2);
    }

    #[test]
    fn test_finalize_snapshot_is_detached() {
        let mut collector = collector_with_two_tracks();
        let before = collector.finalize();
        collector.increase_track_processing_duration(0, Duration::from_secs(1));

        assert_eq!(before[0].processing_duration, Duration::ZERO);
    }

    #[test]
    fn test_report_serialization() {
        let mut collector = collector_with_two_tracks();
        collector.set_target_format(0, Some(MediaFormat::new("video/hevc")));

        let json = serde_json::to_string(&collector.finalize()).unwrap();
        let parsed: Vec<TrackReport> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(
            parsed[0].target_format.as_ref().map(|f| f.mime_type.as_str()),
            Some("video/hevc")
        );
    }
}
