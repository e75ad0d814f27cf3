mod http;

pub use http::HttpReporter;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Software value sent alongside a disconnect.
pub const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("status endpoint unreachable: {0}")]
    Network(#[from] reqwest::Error),

    #[error("status endpoint answered HTTP {0}")]
    Status(u16),

    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Device state as the collector understands it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhoneStatus {
    Online,
    Disconnect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceStatus {
    pub status: PhoneStatus,
    pub software: String,
}

/// Body of a POST to the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportPayload {
    pub devices: BTreeMap<String, DeviceStatus>,
}

/// A transition the monitor wants acknowledged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Online(String),
    Disconnect,
}

impl ReportPayload {
    pub fn new(device_key: &str, report: &Report) -> Self {
        let status = match report {
            Report::Online(label) => DeviceStatus {
                status: PhoneStatus::Online,
                software: label.clone(),
            },
            Report::Disconnect => DeviceStatus {
                status: PhoneStatus::Disconnect,
                software: NOT_AVAILABLE.to_string(),
            },
        };

        let mut devices = BTreeMap::new();
        devices.insert(device_key.to_string(), status);
        Self { devices }
    }
}

/// Where reports are delivered
#[async_trait]
pub trait StatusSink: Send + Sync {
    /// Deliver one payload. `Ok` means the collector acknowledged it.
    async fn send(&self, payload: &ReportPayload) -> Result<(), ReportError>;
}
