//! Prometheus metrics for the transformation engine.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

/// Jobs submitted to the transformer.
pub static JOBS_SUBMITTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("tracktor_jobs_submitted_total", "Total jobs submitted").unwrap()
});

/// Jobs finished, by result.
pub static JOBS_FINISHED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("tracktor_jobs_finished_total", "Total jobs finished"),
        &["result"], // "completed", "cancelled", "failed"
    )
    .unwrap()
});

/// Job duration in seconds, by result.
pub static JOB_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("tracktor_job_duration_seconds", "Duration of jobs").buckets(vec![
            0.1, 0.5, 1.0, 5.0, 15.0, 60.0, 300.0, 900.0, 3600.0,
        ]),
        &["result"],
    )
    .unwrap()
});

/// Track pipelines built, by variant.
pub static TRACKS_TRANSFORMED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "tracktor_tracks_transformed_total",
            "Total track pipelines built",
        ),
        &["variant"], // "transcode", "passthrough"
    )
    .unwrap()
});

/// Jobs rejected by the storage precondition.
pub static STORAGE_CHECK_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "tracktor_storage_check_failures_total",
        "Total jobs rejected for insufficient storage",
    )
    .unwrap()
});

/// Get all engine metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(JOBS_SUBMITTED.clone()),
        Box::new(JOBS_FINISHED.clone()),
        Box::new(JOB_DURATION.clone()),
        Box::new(TRACKS_TRANSFORMED.clone()),
        Box::new(STORAGE_CHECK_FAILURES.clone()),
    ]
}
