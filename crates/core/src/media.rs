//! Media format descriptors shared across the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Kind of an elementary stream, derived from its mime type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    /// Video stream.
    Video,
    /// Audio stream.
    Audio,
    /// Anything else (metadata, subtitles, ...).
    Other,
}

/// Format of one elementary stream, either as exposed by a source container
/// or as requested/negotiated for a target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaFormat {
    /// Mime type, e.g. "video/avc" or "audio/aac".
    pub mime_type: String,
    /// Stream duration, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<Duration>,
    /// Bit rate in bits per second, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bit_rate: Option<u64>,
    /// Video frame width in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    /// Video frame height in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    /// Video frame rate in frames per second.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<f32>,
    /// Audio sample rate in Hz.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    /// Number of audio channels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_count: Option<u8>,
}

impl MediaFormat {
    /// Creates a bare format carrying only a mime type.
    pub fn new(mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            duration: None,
            bit_rate: None,
            width: None,
            height: None,
            frame_rate: None,
            sample_rate: None,
            channel_count: None,
        }
    }

    /// Creates a video format with the common fields filled in.
    pub fn video(mime_type: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::new(mime_type)
        }
    }

    /// Creates an audio format with the common fields filled in.
    pub fn audio(mime_type: impl Into<String>, sample_rate: u32, channel_count: u8) -> Self {
        Self {
            sample_rate: Some(sample_rate),
            channel_count: Some(channel_count),
            ..Self::new(mime_type)
        }
    }

    /// Sets the stream duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Sets the bit rate in bits per second.
    pub fn with_bit_rate(mut self, bit_rate: u64) -> Self {
        self.bit_rate = Some(bit_rate);
        self
    }

    /// Derives the track kind from the mime type prefix.
    pub fn kind(&self) -> TrackKind {
        if self.mime_type.starts_with("video/") {
            TrackKind::Video
        } else if self.mime_type.starts_with("audio/") {
            TrackKind::Audio
        } else {
            TrackKind::Other
        }
    }
}
