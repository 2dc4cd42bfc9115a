//! Downstream phase metrics: one request per forwarded row.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct DownstreamMetrics;

impl DownstreamMetrics {
    /// Record an answered request, labelled by status class (2xx, 4xx, ...)
    pub fn record_response(status: u16, duration_secs: f64) {
        ::metrics::counter!(
            phase_metric!(counter, "downstream", "responses"),
            "status_class" => status_class(status)
        )
        .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "downstream", "duration_seconds"))
            .record(duration_secs);
    }

    /// Record a request that never produced a response
    pub fn record_request_error(kind: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "downstream", "errors"), "kind" => kind)
            .increment(1);
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        _ => "5xx",
    }
}

impl PhaseMetrics for DownstreamMetrics {
    fn register_metrics() {
        let _ = ::metrics::counter!(phase_metric!(counter, "downstream", "responses"));
        let _ = ::metrics::counter!(phase_metric!(counter, "downstream", "errors"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "downstream", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "downstream"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "downstream", "responses"),
                metric_type: MetricType::Counter,
                help: "Downstream answers by status class",
            },
            MetricDoc {
                name: phase_metric!(counter, "downstream", "errors"),
                metric_type: MetricType::Counter,
                help: "Downstream requests that failed without a response",
            },
            MetricDoc {
                name: phase_metric!(histogram, "downstream", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Round trip time of one downstream request",
            },
        ]
    }
}
