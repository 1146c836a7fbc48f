//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Worker (jobs processed, stage durations)
//! - Queue consumption (messages received, malformed bodies)
//! - Translation (chunk fallbacks)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// =============================================================================
// Worker - Pipeline Metrics
// =============================================================================

/// Jobs processed total by final status.
pub static JOBS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("lectern_jobs_processed_total", "Total jobs processed"),
        &["result"], // "completed", "failed", "vanished"
    )
    .unwrap()
});

/// Pipeline stage duration in seconds.
pub static STAGE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "lectern_stage_duration_seconds",
            "Duration of pipeline stages",
        )
        .buckets(vec![0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 180.0, 600.0, 1800.0]),
        &["stage"], // "fetch", "extract", "transcribe", "store", "detect"
    )
    .unwrap()
});

// =============================================================================
// Queue Metrics
// =============================================================================

/// Queue messages received total.
pub static MESSAGES_RECEIVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lectern_queue_messages_received_total",
        "Total queue messages received",
    )
    .unwrap()
});

/// Queue messages whose body failed to parse.
pub static MESSAGES_MALFORMED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lectern_queue_messages_malformed_total",
        "Total queue messages left for redelivery due to malformed bodies",
    )
    .unwrap()
});

// =============================================================================
// Translation Metrics
// =============================================================================

/// Chunks that passed through untranslated after a provider failure.
pub static TRANSLATION_FALLBACK_CHUNKS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "lectern_translation_fallback_chunks_total",
        "Total translation chunks that fell back to their original text",
    )
    .unwrap()
});

/// Register all core metrics with the given registry.
pub fn register_core_metrics(registry: &Registry) {
    let _ = registry.register(Box::new(JOBS_PROCESSED.clone()));
    let _ = registry.register(Box::new(STAGE_DURATION.clone()));
    let _ = registry.register(Box::new(MESSAGES_RECEIVED.clone()));
    let _ = registry.register(Box::new(MESSAGES_MALFORMED.clone()));
    let _ = registry.register(Box::new(TRANSLATION_FALLBACK_CHUNKS.clone()));
}
