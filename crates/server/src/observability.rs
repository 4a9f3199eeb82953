use axum::http::StatusCode;
use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_counter_vec, Encoder, IntCounter, IntCounterVec, TextEncoder,
};

// Prometheus metrics (default registry)
pub static OPERATIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "json_rest_operations_total",
        "Collection operations dispatched, by operation",
        &["op"]
    )
    .expect("register operations_total")
});

pub static ERRORS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "json_rest_errors_total",
        "Error responses, by status code",
        &["status"]
    )
    .expect("register errors_total")
});

pub static PERSIST_FAILURES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "json_rest_persist_failures_total",
        "Mutations applied in memory whose document write failed"
    )
    .expect("register persist_failures_total")
});

pub fn record_operation(op: &str) {
    OPERATIONS_TOTAL.with_label_values(&[op]).inc();
}

pub fn record_error(status: StatusCode) {
    ERRORS_TOTAL.with_label_values(&[status.as_str()]).inc();
}

pub fn record_persist_failure() {
    PERSIST_FAILURES_TOTAL.inc();
}

pub fn encode_metrics() -> (StatusCode, String) {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("metrics encode error: {e}"),
        );
    }
    (StatusCode::OK, String::from_utf8(buffer).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_show_up_in_exposition() {
        record_operation("list");
        record_error(StatusCode::NOT_FOUND);
        record_persist_failure();
        let (status, body) = encode_metrics();
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("json_rest_operations_total{op=\"list\"}"));
        assert!(body.contains("json_rest_errors_total{status=\"404\"}"));
        assert!(body.contains("json_rest_persist_failures_total"));
    }
}
