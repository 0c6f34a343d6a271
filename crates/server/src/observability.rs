use once_cell::sync::Lazy;
use prometheus::{register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec, TextEncoder};

use service::errors::ServiceError;
use service::storage::StoreError;

// Prometheus metrics (default registry)
pub static REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "blog_requests_total",
        "Post operations handled, by operation and outcome",
        &["op", "outcome"]
    )
    .expect("register requests_total")
});

pub static REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "blog_request_duration_seconds",
        "Post operation duration in seconds",
        &["op"],
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    )
    .expect("register request_duration")
});

/// Outcome label for a finished operation.
pub fn outcome<T>(result: &Result<T, ServiceError>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(ServiceError::Store(StoreError::NotFound(_))) => "not_found",
        Err(ServiceError::Store(StoreError::DuplicateKey(_))) => "duplicate",
        Err(e) => {
            debug_assert!(e.is_invalid_input());
            "invalid"
        }
    }
}

pub fn record<T>(op: &str, result: &Result<T, ServiceError>) {
    REQUESTS_TOTAL.with_label_values(&[op, outcome(result)]).inc();
}

pub fn encode_metrics() -> (axum::http::StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (
        axum::http::StatusCode::OK,
        String::from_utf8(buffer).unwrap_or_default(),
    )
}
