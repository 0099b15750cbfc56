//! Listener recording every event for assertions.

use std::sync::Mutex;

use crate::job::TransformError;
use crate::listener::TransformationListener;
use crate::stats::TrackReport;

/// One recorded listener event.
#[derive(Debug, Clone)]
pub enum ListenerEvent {
    Started,
    Progress(f64),
    Completed(Vec<TrackReport>),
    Cancelled(Vec<TrackReport>),
    Error(TransformError, Vec<TrackReport>),
}

impl ListenerEvent {
    fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed(_) | Self::Cancelled(_) | Self::Error(_, _)
        )
    }
}

/// Mock implementation of [`TransformationListener`] recording every event
/// together with the job id it was delivered for.
pub struct RecordingListener {
    events: Mutex<Vec<(String, ListenerEvent)>>,
}

impl Default for RecordingListener {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordingListener {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, job_id: &str, event: ListenerEvent) {
        self.events
            .lock()
            .expect("mock state poisoned")
            .push((job_id.to_string(), event));
    }

    /// Every recorded event, in delivery order.
    pub fn events(&self) -> Vec<ListenerEvent> {
        self.events
            .lock()
            .expect("mock state poisoned")
            .iter()
            .map(|(_, event)| event.clone())
            .collect()
    }

    pub fn started_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ListenerEvent::Started))
            .count()
    }

    /// Progress values in delivery order.
    pub fn progress_values(&self) -> Vec<f64> {
        self.events()
            .iter()
            .filter_map(|event| match event {
                ListenerEvent::Progress(progress) => Some(*progress),
                _ => None,
            })
            .collect()
    }

    pub fn completed_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ListenerEvent::Completed(_)))
            .count()
    }

    pub fn cancelled_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ListenerEvent::Cancelled(_)))
            .count()
    }

    pub fn error_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| matches!(event, ListenerEvent::Error(_, _)))
            .count()
    }

    /// How many terminal events were delivered. Exactly one is expected per
    /// job.
    pub fn terminal_count(&self) -> usize {
        self.events()
            .iter()
            .filter(|event| event.is_terminal())
            .count()
    }

    /// The error of the last error event, if any.
    pub fn last_error(&self) -> Option<TransformError> {
        self.events().iter().rev().find_map(|event| match event {
            ListenerEvent::Error(error, _) => Some(error.clone()),
            _ => None,
        })
    }

    /// Reports carried by the first completion event, if any.
    pub fn completed_reports(&self) -> Option<Vec<TrackReport>> {
        self.events().iter().find_map(|event| match event {
            ListenerEvent::Completed(reports) => Some(reports.clone()),
            _ => None,
        })
    }

    /// Job ids of every completion event, in delivery order.
    pub fn completed_job_ids(&self) -> Vec<String> {
        self.events
            .lock()
            .expect("mock state poisoned")
            .iter()
            .filter_map(|(job_id, event)| match event {
                ListenerEvent::Completed(_) => Some(job_id.clone()),
                _ => None,
            })
            .collect()
    }
}

impl TransformationListener for RecordingListener {
    fn on_started(&self, job_id: &str) {
        self.record(job_id, ListenerEvent::Started);
    }

    fn on_progress(&self, job_id: &str, progress: f64) {
        self.record(job_id, ListenerEvent::Progress(progress));
    }

    fn on_completed(&self, job_id: &str, stats: Vec<TrackReport>) {
        self.record(job_id, ListenerEvent::Completed(stats));
    }

    fn on_cancelled(&self, job_id: &str, stats: Vec<TrackReport>) {
        self.record(job_id, ListenerEvent::Cancelled(stats));
    }

    fn on_error(&self, job_id: &str, error: &TransformError, stats: Vec<TrackReport>) {
        self.record(job_id, ListenerEvent::Error(error.clone(), stats));
    }
}
