//! Job event delivery.
//!
//! A [`TransformationListener`] is the caller's sink for job events. The
//! orchestrator never calls it directly: every event goes through a
//! [`CallbackHandler`], which owns whatever thread-marshaling is needed to
//! deliver the event in the caller's context. The engine invokes the handler
//! synchronously from the job's own execution context and guarantees exactly
//! one terminal event per job.

use crate::job::TransformError;
use crate::stats::TrackReport;

/// Receives the events of one transformation job.
pub trait TransformationListener: Send + Sync {
    /// All pipelines started; the step loop is about to run.
    fn on_started(&self, job_id: &str);

    /// Aggregate progress in `[0.0, 1.0]`, throttled by the job's
    /// granularity. Completion always delivers a final `1.0`.
    fn on_progress(&self, job_id: &str, progress: f64);

    /// Terminal: the job completed and every resource was released.
    fn on_completed(&self, job_id: &str, stats: Vec<TrackReport>);

    /// Terminal: the job observed a cooperative cancellation request.
    fn on_cancelled(&self, job_id: &str, stats: Vec<TrackReport>);

    /// Terminal: the job failed with `error`.
    fn on_error(&self, job_id: &str, error: &TransformError, stats: Vec<TrackReport>);
}

/// Delivery policy between the job and its listener.
pub trait CallbackHandler: Send + Sync {
    fn on_started(&self, listener: &dyn TransformationListener, job_id: &str);

    fn on_progress(&self, listener: &dyn TransformationListener, job_id: &str, progress: f64);

    fn on_completed(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        stats: Vec<TrackReport>,
    );

    fn on_cancelled(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        stats: Vec<TrackReport>,
    );

    fn on_error(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        error: &TransformError,
        stats: Vec<TrackReport>,
    );
}

/// Delivers every event inline on the job's execution context. The default;
/// listeners that need another thread wrap their own handler around a
/// channel.
#[derive(Debug, Default)]
pub struct DirectCallbackHandler;

impl CallbackHandler for DirectCallbackHandler {
    fn on_started(&self, listener: &dyn TransformationListener, job_id: &str) {
        listener.on_started(job_id);
    }

    fn on_progress(&self, listener: &dyn TransformationListener, job_id: &str, progress: f64) {
        listener.on_progress(job_id, progress);
    }

    fn on_completed(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        stats: Vec<TrackReport>,
    ) {
        listener.on_completed(job_id, stats);
    }

    fn on_cancelled(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        stats: Vec<TrackReport>,
    ) {
        listener.on_cancelled(job_id, stats);
    }

    fn on_error(
        &self,
        listener: &dyn TransformationListener,
        job_id: &str,
        error: &TransformError,
        stats: Vec<TrackReport>,
    ) {
        listener.on_error(job_id, error, stats);
    }
}
