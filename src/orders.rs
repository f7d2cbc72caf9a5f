//! Order persistence through the spreadsheet script endpoint.
//!
//! The endpoint is a write-only Apps Script deployment. Requests are sent the
//! way a `no-cors` browser request would send them: a `text/plain` body with
//! the JSON order and no interest in the response. Success is assumed unless
//! the request itself fails to go out.

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;

/// Destination for confirmed orders.
#[async_trait::async_trait]
pub trait OrderSink: Send + Sync {
    /// Forwards the order payload. Only transport errors are reported.
    async fn submit(&self, order: &Value) -> Result<()>;
}

/// [`OrderSink`] that POSTs orders to a fixed HTTP endpoint.
pub struct HttpOrderSink {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpOrderSink {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build HTTP client for the order endpoint")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl OrderSink for HttpOrderSink {
    async fn submit(&self, order: &Value) -> Result<()> {
        let body = serde_json::to_string(order).context("Failed to serialize order")?;
        tracing::debug!(endpoint = %self.endpoint, "posting order");
        // Status and body are not inspected.
        self.client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "text/plain;charset=utf-8")
            .body(body)
            .send()
            .await
            .with_context(|| format!("Failed to reach order endpoint {}", self.endpoint))?;
        Ok(())
    }
}
