//! Mock decoder, encoder and renderer for testing.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::codec::{CodecError, Decoder, Encoder, Frame};
use crate::io::EncodedSample;
use crate::media::MediaFormat;
use crate::render::FrameRenderer;

/// Mock implementation of [`Decoder`], turning each submitted sample into one
/// frame with the same payload and timestamp.
pub struct MockDecoder {
    started_format: Mutex<Option<MediaFormat>>,
    frames: Mutex<VecDeque<Frame>>,
    next_error: Mutex<Option<CodecError>>,
    stop_count: AtomicUsize,
    release_count: AtomicUsize,
}

impl Default for MockDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDecoder {
    pub fn new() -> Self {
        Self {
            started_format: Mutex::new(None),
            frames: Mutex::new(VecDeque::new()),
            next_error: Mutex::new(None),
            stop_count: AtomicUsize::new(0),
            release_count: AtomicUsize::new(0),
        }
    }

    /// Makes the next fallible operation fail with the given error.
    pub fn fail_next_with(&self, error: CodecError) {
        *self.next_error.lock().expect("mock state poisoned") = Some(error);
    }

    /// The format this decoder was started with, if any.
    pub fn started_format(&self) -> Option<MediaFormat> {
        self.started_format
            .lock()
            .expect("mock state poisoned")
            .clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::SeqCst)
    }

    fn take_error(&self) -> Option<CodecError> {
        self.next_error.lock().expect("mock state poisoned").take()
    }
}

impl Decoder for MockDecoder {
    fn name(&self) -> String {
        "mock-decoder".to_string()
    }

    fn start(&self, format: &MediaFormat) -> Result<(), CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        *self.started_format.lock().expect("mock state poisoned") = Some(format.clone());
        Ok(())
    }

    fn submit_sample(&self, sample: EncodedSample) -> Result<(), CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        let frame = Frame {
            data: sample.data,
            pts: sample.pts,
            end_of_stream: sample.end_of_stream,
        };
        self.frames
            .lock()
            .expect("mock state poisoned")
            .push_back(frame);
        Ok(())
    }

    fn receive_frame(&self) -> Result<Option<Frame>, CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        Ok(self.frames.lock().expect("mock state poisoned").pop_front())
    }

    fn stop(&self) {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock implementation of [`Encoder`], turning each submitted frame into one
/// sample with the same payload and timestamp.
pub struct MockEncoder {
    negotiated: Mutex<Option<MediaFormat>>,
    samples: Mutex<VecDeque<EncodedSample>>,
    next_error: Mutex<Option<CodecError>>,
    stop_count: AtomicUsize,
    release_count: AtomicUsize,
}

impl Default for MockEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEncoder {
    pub fn new() -> Self {
        Self {
            negotiated: Mutex::new(None),
            samples: Mutex::new(VecDeque::new()),
            next_error: Mutex::new(None),
            stop_count: AtomicUsize::new(0),
            release_count: AtomicUsize::new(0),
        }
    }

    /// Format `start` negotiates regardless of the requested one.
    pub fn set_negotiated_format(&self, format: MediaFormat) {
        *self.negotiated.lock().expect("mock state poisoned") = Some(format);
    }

    /// Makes the next fallible operation fail with the given error.
    pub fn fail_next_with(&self, error: CodecError) {
        *self.next_error.lock().expect("mock state poisoned") = Some(error);
    }

    pub fn stop_count(&self) -> usize {
        self.stop_count.load(Ordering::SeqCst)
    }

    pub fn release_count(&self) -> usize {
        self.release_count.load(Ordering::SeqCst)
    }

    fn take_error(&self) -> Option<CodecError> {
        self.next_error.lock().expect("mock state poisoned").take()
    }
}

impl Encoder for MockEncoder {
    fn name(&self) -> String {
        "mock-encoder".to_string()
    }

    fn start(&self, format: &MediaFormat) -> Result<MediaFormat, CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        Ok(self
            .negotiated
            .lock()
            .expect("mock state poisoned")
            .clone()
            .unwrap_or_else(|| format.clone()))
    }

    fn submit_frame(&self, frame: Frame) -> Result<(), CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        let sample = EncodedSample {
            data: frame.data,
            pts: frame.pts,
            key_frame: false,
            end_of_stream: frame.end_of_stream,
        };
        self.samples
            .lock()
            .expect("mock state poisoned")
            .push_back(sample);
        Ok(())
    }

    fn receive_sample(&self) -> Result<Option<EncodedSample>, CodecError> {
        if let Some(error) = self.take_error() {
            return Err(error);
        }
        Ok(self.samples.lock().expect("mock state poisoned").pop_front())
    }

    fn stop(&self) {
        self.stop_count.fetch_add(1, Ordering::SeqCst);
    }

    fn release(&self) {
        self.release_count.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock renderer counting the frames it saw, forwarding payloads untouched.
pub struct MockRenderer {
    rendered: AtomicUsize,
}

impl Default for MockRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockRenderer {
    pub fn new() -> Self {
        Self {
            rendered: AtomicUsize::new(0),
        }
    }

    pub fn rendered_frames(&self) -> usize {
        self.rendered.load(Ordering::SeqCst)
    }
}

impl FrameRenderer for MockRenderer {
    fn render(&self, frame: Frame) -> Frame {
        self.rendered.fetch_add(1, Ordering::SeqCst);
        frame
    }
}
