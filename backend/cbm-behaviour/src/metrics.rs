use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, Encoder, IntCounterVec, TextEncoder};

lazy_static! {
    pub static ref SUBMISSIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "behaviour_submissions_total",
        "Submissions processed by the behaviour",
        &["outcome"]
    )
    .unwrap();

    pub static ref GRADING_RESULTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "behaviour_grading_results_total",
        "Grading results processed by the behaviour",
        &["outcome", "certainty_source"]
    )
    .unwrap();

    pub static ref CAPTURE_FAILURES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "behaviour_capture_failures_total",
        "Responses that could not be captured for grading",
        &["reason"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Outcome is one of `discarded`, `invalid`, `dispatched`, `failed`.
pub fn record_submission(outcome: &str) {
    SUBMISSIONS_TOTAL.with_label_values(&[outcome]).inc();
}

pub fn record_grading_result(outcome: &str, certainty_source: &str) {
    GRADING_RESULTS_TOTAL
        .with_label_values(&[outcome, certainty_source])
        .inc();
}

pub fn record_capture_failure(reason: &str) {
    CAPTURE_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}
