use async_trait::async_trait;

use crate::error::Result;
use crate::types::RowRecord;

/// Outbound capability used to deliver one record to the downstream service
#[async_trait]
pub trait ForwardTransportPort: Send + Sync {
    async fn post_record(&self, url: &str, record: &RowRecord) -> Result<TransportResponse>;
}

#[derive(Clone, Debug)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}
