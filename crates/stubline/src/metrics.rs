//! Prometheus metrics for the Stubline server.
//!
//! Tracks replay outcomes, rule ingestion and admin API activity.
use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, Encoder, HistogramVec, TextEncoder,
};

lazy_static! {
    /// Replay requests by outcome
    pub static ref REPLAY_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "stubline_replay_requests_total",
        "Total number of replay requests",
        &["outcome"]  // outcome: matched|no_match|load_error|internal_error
    )
    .unwrap();

    /// Time spent loading a rule set and matching a request
    pub static ref REPLAY_DURATION_MS: HistogramVec = register_histogram_vec!(
        "stubline_replay_duration_ms",
        "Histogram of replay handling time in milliseconds",
        &["outcome"],
        vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 25.0, 50.0, 100.0]
    )
    .unwrap();

    /// Rules received through the ingestion endpoint
    pub static ref RULES_INGESTED_TOTAL: CounterVec = register_counter_vec!(
        "stubline_rules_ingested_total",
        "Total number of rules received for ingestion",
        &["result"]  // result: added|duplicate
    )
    .unwrap();

    /// Admin API calls
    pub static ref ADMIN_REQUESTS_TOTAL: CounterVec = register_counter_vec!(
        "stubline_admin_requests_total",
        "Total number of admin API requests",
        &["operation", "status"]
    )
    .unwrap();
}

/// Replay outcome label values
pub mod outcome {
    pub const MATCHED: &str = "matched";
    pub const NO_MATCH: &str = "no_match";
    pub const LOAD_ERROR: &str = "load_error";
    pub const INTERNAL_ERROR: &str = "internal_error";
}

/// Collect and return all metrics in Prometheus text format
pub fn collect_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Helper to record a replay request
pub fn record_replay(outcome: &str, duration_ms: f64) {
    REPLAY_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    REPLAY_DURATION_MS
        .with_label_values(&[outcome])
        .observe(duration_ms);
}

/// Helper to record an ingestion batch
pub fn record_ingestion(added: usize, duplicates: usize) {
    RULES_INGESTED_TOTAL
        .with_label_values(&["added"])
        .inc_by(added as f64);
    RULES_INGESTED_TOTAL
        .with_label_values(&["duplicate"])
        .inc_by(duplicates as f64);
}

/// Helper to record an admin API call
pub fn record_admin_request(operation: &str, status: u16) {
    ADMIN_REQUESTS_TOTAL
        .with_label_values(&[operation, &status.to_string()])
        .inc();
}
