use std::time::Duration;

use async_trait::async_trait;

use crate::app::ports::{ForwardTransportPort, TransportResponse};
use crate::config::DownstreamConfig;
use crate::error::Result;
use crate::types::RowRecord;

/// Delivers records to the downstream service as JSON `POST` requests
pub struct ReqwestForwarder {
    client: reqwest::Client,
}

impl ReqwestForwarder {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("inventory_forwarder/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub fn from_config(config: &DownstreamConfig) -> Result<Self> {
        Self::new(Duration::from_secs(config.timeout_seconds))
    }
}

#[async_trait]
impl ForwardTransportPort for ReqwestForwarder {
    async fn post_record(&self, url: &str, record: &RowRecord) -> Result<TransportResponse> {
        let resp = self.client.post(url).json(record).send().await?;
        let status = resp.status().as_u16();
        let body = resp.text().await?;
        Ok(TransportResponse { status, body })
    }
}
