use std::time::Instant;

use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::app::ports::{ForwardTransportPort, TransportResponse};
use crate::constants::has_csv_extension;
use crate::error::{ForwarderError, Result};
use crate::metrics::downstream::DownstreamMetrics;
use crate::metrics::upload::UploadMetrics;
use crate::parser::{decode_utf8, RowReader};
use crate::types::{DownstreamBody, ForwardingOutcome, RowRecord, UploadSummary, UploadedFile};

/// Use case for turning an uploaded sheet into one downstream request per row.
///
/// Rows are forwarded strictly in input order, one at a time. The first
/// failure aborts the remaining rows; rows already delivered stay delivered.
pub struct ForwardUseCase {
    transport: Box<dyn ForwardTransportPort>,
    endpoint: String,
}

impl ForwardUseCase {
    pub fn new(transport: Box<dyn ForwardTransportPort>, endpoint: impl Into<String>) -> Self {
        Self {
            transport,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Check that a file was attached and that it looks like a CSV sheet
    pub fn validate(upload: Option<UploadedFile>) -> Result<UploadedFile> {
        let upload = upload.ok_or(ForwarderError::MissingFile)?;
        if !has_csv_extension(&upload.filename) {
            return Err(ForwarderError::InvalidFormat {
                filename: upload.filename,
            });
        }
        Ok(upload)
    }

    /// Account for an upload refused before its body could be read
    pub fn reject(e: ForwarderError) -> ForwarderError {
        UploadMetrics::record_upload_received();
        Self::record_rejection(&e);
        e
    }

    fn record_rejection(e: &ForwarderError) {
        warn!("Upload rejected: {}", e);
        UploadMetrics::record_upload_rejected(e.kind());
    }

    /// Validate, decode, parse and forward an upload
    pub async fn process_upload(&self, upload: Option<UploadedFile>) -> Result<UploadSummary> {
        UploadMetrics::record_upload_received();

        let upload = match Self::validate(upload) {
            Ok(u) => u,
            Err(e) => {
                Self::record_rejection(&e);
                return Err(e);
            }
        };

        let span = tracing::info_span!(
            "upload",
            upload_id = %Uuid::new_v4(),
            filename = %upload.filename,
            bytes = upload.content.len(),
            sha256 = %upload.fingerprint(),
        );

        async move {
            let started = Instant::now();
            let result = self.forward_bytes(&upload.content).await;
            let duration_secs = started.elapsed().as_secs_f64();

            match result {
                Ok(responses) => {
                    info!(
                        "Forwarded {} rows in {:.3}s",
                        responses.len(),
                        duration_secs
                    );
                    UploadMetrics::record_upload_success(
                        responses.len(),
                        upload.content.len(),
                        duration_secs,
                    );
                    Ok(UploadSummary::new(responses))
                }
                Err(e) => {
                    error!("Upload processing failed: {}", e);
                    UploadMetrics::record_upload_failed(e.kind(), duration_secs);
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Decode raw sheet bytes and forward every row
    pub async fn forward_bytes(&self, bytes: &[u8]) -> Result<Vec<ForwardingOutcome>> {
        let text = decode_utf8(bytes)?;
        self.forward_text(text).await
    }

    /// Forward every row of an already decoded sheet
    pub async fn forward_text(&self, text: &str) -> Result<Vec<ForwardingOutcome>> {
        let rows = RowReader::from_text(text)?;
        let mut outcomes = Vec::new();

        for row in rows {
            let record = row?;
            let outcome = self.forward_record(&record).await?;
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }

    /// Deliver one record and capture the downstream answer
    pub async fn forward_record(&self, record: &RowRecord) -> Result<ForwardingOutcome> {
        let started = Instant::now();
        let response = match self.transport.post_record(&self.endpoint, record).await {
            Ok(r) => r,
            Err(e) => {
                DownstreamMetrics::record_request_error(e.kind());
                return Err(e);
            }
        };
        DownstreamMetrics::record_response(response.status, started.elapsed().as_secs_f64());
        debug!(
            "Downstream answered {} for product {:?}",
            response.status, record.product_id
        );
        outcome_from_response(response)
    }
}

/// A 200 body must be JSON; anything else is relayed as raw text.
fn outcome_from_response(response: TransportResponse) -> Result<ForwardingOutcome> {
    let body = if response.status == 200 {
        DownstreamBody::Json(serde_json::from_str(&response.body)?)
    } else {
        DownstreamBody::Text(response.body)
    };
    Ok(ForwardingOutcome {
        status_code: response.status,
        response: body,
    })
}
