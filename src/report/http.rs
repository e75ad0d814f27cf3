use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{info, warn};

use super::{ReportError, ReportPayload, StatusSink};

/// Posts reports as JSON to the collector URL
pub struct HttpReporter {
    client: Client,
    url: String,
}

impl HttpReporter {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            url: url.into(),
        })
    }

    /// Check that the endpoint answers at all. Only logs; never fatal.
    pub async fn probe(&self) -> bool {
        match self.client.get(&self.url).send().await {
            Ok(resp) => {
                info!(url = %self.url, status = resp.status().as_u16(), "status endpoint reachable");
                true
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "status endpoint not reachable yet");
                false
            }
        }
    }
}

#[async_trait]
impl StatusSink for HttpReporter {
    async fn send(&self, payload: &ReportPayload) -> Result<(), ReportError> {
        let body = serde_json::to_vec(payload)?;

        let resp = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        // The collector answers exactly 200 on success.
        if resp.status() == StatusCode::OK {
            Ok(())
        } else {
            Err(ReportError::Status(resp.status().as_u16()))
        }
    }
}
