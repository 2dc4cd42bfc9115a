//! Upload phase metrics: uploads received, rejected, processed, and the
//! rows and bytes they carried.

use crate::metrics::{phase_metric, MetricDoc, MetricType, PhaseMetrics};

pub struct UploadMetrics;

impl UploadMetrics {
    pub fn record_upload_received() {
        ::metrics::counter!(phase_metric!(counter, "upload", "received")).increment(1);
    }

    /// Upload refused before any row was read (400 or 413)
    pub fn record_upload_rejected(reason: &'static str) {
        ::metrics::counter!(phase_metric!(counter, "upload", "rejected"), "reason" => reason)
            .increment(1);
    }

    pub fn record_upload_success(rows: usize, bytes: usize, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "upload", "processed")).increment(1);
        ::metrics::counter!(phase_metric!(counter, "upload", "rows_forwarded"))
            .increment(rows as u64);
        ::metrics::histogram!(phase_metric!(histogram, "upload", "rows_per_upload"))
            .record(rows as f64);
        ::metrics::histogram!(phase_metric!(histogram, "upload", "size_bytes"))
            .record(bytes as f64);
        ::metrics::histogram!(phase_metric!(histogram, "upload", "duration_seconds"))
            .record(duration_secs);
    }

    /// Upload aborted while decoding, parsing or forwarding (500)
    pub fn record_upload_failed(reason: &'static str, duration_secs: f64) {
        ::metrics::counter!(phase_metric!(counter, "upload", "failed"), "reason" => reason)
            .increment(1);
        ::metrics::histogram!(phase_metric!(histogram, "upload", "duration_seconds"))
            .record(duration_secs);
    }
}

impl PhaseMetrics for UploadMetrics {
    fn register_metrics() {
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "received"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "rejected"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "processed"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "failed"));
        let _ = ::metrics::counter!(phase_metric!(counter, "upload", "rows_forwarded"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "upload", "rows_per_upload"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "upload", "size_bytes"));
        let _ = ::metrics::histogram!(phase_metric!(histogram, "upload", "duration_seconds"));
    }

    fn phase_name() -> &'static str {
        "upload"
    }

    fn metrics_documentation() -> Vec<MetricDoc> {
        vec![
            MetricDoc {
                name: phase_metric!(counter, "upload", "received"),
                metric_type: MetricType::Counter,
                help: "Upload requests received",
            },
            MetricDoc {
                name: phase_metric!(counter, "upload", "rejected"),
                metric_type: MetricType::Counter,
                help: "Uploads refused before any row was read",
            },
            MetricDoc {
                name: phase_metric!(counter, "upload", "processed"),
                metric_type: MetricType::Counter,
                help: "Uploads whose every row was forwarded",
            },
            MetricDoc {
                name: phase_metric!(counter, "upload", "failed"),
                metric_type: MetricType::Counter,
                help: "Uploads aborted by a processing error",
            },
            MetricDoc {
                name: phase_metric!(counter, "upload", "rows_forwarded"),
                metric_type: MetricType::Counter,
                help: "Rows forwarded as part of successful uploads",
            },
            MetricDoc {
                name: phase_metric!(histogram, "upload", "rows_per_upload"),
                metric_type: MetricType::Histogram,
                help: "Data rows per successful upload",
            },
            MetricDoc {
                name: phase_metric!(histogram, "upload", "size_bytes"),
                metric_type: MetricType::Histogram,
                help: "Size of successfully processed uploads",
            },
            MetricDoc {
                name: phase_metric!(histogram, "upload", "duration_seconds"),
                metric_type: MetricType::Histogram,
                help: "Wall time from decoding to the last downstream answer",
            },
        ]
    }
}
