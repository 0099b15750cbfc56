//! Multi-job front end.
//!
//! A [`MediaTransformer`] owns the workers that jobs run on: each submission
//! gets its own sequential execution context (a blocking task), a bounded
//! number run concurrently, and every active job can be cancelled by id.
//! Jobs share no mutable state with each other.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::{RwLock, Semaphore};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::job::{CancelHandle, JobRequest, JobState, TransformationJob};
use crate::listener::{CallbackHandler, DirectCallbackHandler, TransformationListener};
use crate::metrics;
use crate::storage::{self, StorageCheck};

/// Errors surfaced by the transformer front end.
#[derive(Debug, Error)]
pub enum TransformerError {
    /// A job with this id is already active.
    #[error("job already exists: {0}")]
    JobExists(String),

    /// No active job with this id.
    #[error("job not found: {0}")]
    JobNotFound(String),

    /// The transformer no longer accepts submissions.
    #[error("transformer is shut down")]
    ShutDown,
}

/// Per-submission options.
#[derive(Debug, Clone, Default)]
pub struct TransformOptions {
    /// Progress reporting granularity; the configured default applies when
    /// absent.
    pub granularity: Option<u32>,
}

/// Current transformer status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformerStatus {
    /// Whether submissions are accepted.
    pub running: bool,
    /// Number of jobs currently active.
    pub active_jobs: usize,
    /// Ids of the active jobs.
    pub job_ids: Vec<String>,
}

/// Summary of one active job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveJobInfo {
    /// Id the job was submitted under.
    pub job_id: String,
    /// When the job was submitted.
    pub started_at: DateTime<Utc>,
}

/// One active job as tracked by the transformer.
struct ActiveJob {
    cancel: CancelHandle,
    started_at: DateTime<Utc>,
}

/// Runs transformation jobs on dedicated workers.
pub struct MediaTransformer {
    config: Config,
    jobs: Arc<RwLock<HashMap<String, ActiveJob>>>,
    semaphore: Arc<Semaphore>,
    accepting: Arc<AtomicBool>,
}

impl MediaTransformer {
    pub fn new(config: Config) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.transformer.max_concurrent_jobs));
        Self {
            config,
            jobs: Arc::new(RwLock::new(HashMap::new())),
            semaphore,
            accepting: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Submits a job. Returns the job id (generated when the request carries
    /// none); every callback of this job uses that id. The job itself runs on
    /// a dedicated blocking worker, at most `max_concurrent_jobs` at a time.
    pub async fn transform(
        &self,
        mut request: JobRequest,
        listener: Arc<dyn TransformationListener>,
        options: TransformOptions,
    ) -> Result<String, TransformerError> {
        if !self.accepting.load(Ordering::Acquire) {
            return Err(TransformerError::ShutDown);
        }

        let job_id = request
            .job_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        request.job_id = Some(job_id.clone());

        let granularity = options
            .granularity
            .unwrap_or(self.config.transformer.progress_granularity);
        let storage_check =
            StorageCheck::new(storage::default_probe(request.target.output_path()))
                .with_reserve(self.config.storage.reserve_bytes);
        let handler: Arc<dyn CallbackHandler> = Arc::new(DirectCallbackHandler);

        let mut job = TransformationJob::new(request, listener, handler, granularity)
            .with_storage_check(storage_check);
        let cancel = job.cancel_handle();

        {
            let mut jobs = self.jobs.write().await;
            if jobs.contains_key(&job_id) {
                return Err(TransformerError::JobExists(job_id));
            }
            jobs.insert(
                job_id.clone(),
                ActiveJob {
                    cancel,
                    started_at: Utc::now(),
                },
            );
        }
        metrics::JOBS_SUBMITTED.inc();
        info!(job_id = %job_id, "job submitted");

        let jobs = Arc::clone(&self.jobs);
        let semaphore = Arc::clone(&self.semaphore);
        let id = job_id.clone();
        tokio::spawn(async move {
            // Permit acquisition only fails when the semaphore is closed,
            // which never happens; run unbounded in that case rather than
            // dropping the job on the floor.
            let _permit = semaphore.acquire_owned().await;

            let started = Instant::now();
            let state = match tokio::task::spawn_blocking(move || {
                job.execute();
                job.state()
            })
            .await
            {
                Ok(state) => state,
                Err(join_error) => {
                    error!(job_id = %id, %join_error, "job worker terminated abnormally");
                    JobState::Failed
                }
            };

            let result = match state {
                JobState::Completed => "completed",
                JobState::Cancelled => "cancelled",
                _ => "failed",
            };
            metrics::JOBS_FINISHED.with_label_values(&[result]).inc();
            metrics::JOB_DURATION
                .with_label_values(&[result])
                .observe(started.elapsed().as_secs_f64());

            jobs.write().await.remove(&id);
            info!(job_id = %id, result, "job finished");
        });

        Ok(job_id)
    }

    /// Requests cooperative cancellation of an active job. The job observes
    /// the request at its next step and terminates through its cancel path.
    pub async fn cancel(&self, job_id: &str) -> Result<(), TransformerError> {
        let jobs = self.jobs.read().await;
        match jobs.get(job_id) {
            Some(job) => {
                job.cancel.cancel();
                info!(job_id, "cancellation requested");
                Ok(())
            }
            None => Err(TransformerError::JobNotFound(job_id.to_string())),
        }
    }

    /// Snapshot of the transformer's runtime state.
    pub async fn status(&self) -> TransformerStatus {
        let jobs = self.jobs.read().await;
        TransformerStatus {
            running: self.accepting.load(Ordering::Acquire),
            active_jobs: jobs.len(),
            job_ids: jobs.keys().cloned().collect(),
        }
    }

    /// Details of every active job.
    pub async fn active_jobs(&self) -> Vec<ActiveJobInfo> {
        let jobs = self.jobs.read().await;
        jobs.iter()
            .map(|(job_id, job)| ActiveJobInfo {
                job_id: job_id.clone(),
                started_at: job.started_at,
            })
            .collect()
    }

    /// Stops accepting submissions, cancels every active job and waits for
    /// them to drain.
    pub async fn shutdown(&self) {
        if !self.accepting.swap(false, Ordering::AcqRel) {
            warn!("transformer already shut down");
            return;
        }
        info!("shutting down transformer");

        {
            let jobs = self.jobs.read().await;
            for job in jobs.values() {
                job.cancel.cancel();
            }
        }

        loop {
            if self.jobs.read().await.is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        info!("transformer shut down");
    }
}
