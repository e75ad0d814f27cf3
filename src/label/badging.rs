use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{patterns, LabelSource};
use crate::adb::DeviceBridge;
use crate::detect::AppId;

/// Reads the label out of the installed APK with an on-device aapt.
pub struct BadgingSource {
    bridge: Arc<dyn DeviceBridge>,
    aapt_path: String,
}

impl BadgingSource {
    pub fn new(bridge: Arc<dyn DeviceBridge>, aapt_path: impl Into<String>) -> Self {
        Self {
            bridge,
            aapt_path: aapt_path.into(),
        }
    }
}

#[async_trait]
impl LabelSource for BadgingSource {
    fn name(&self) -> &'static str {
        "aapt"
    }

    async fn lookup(&self, id: &AppId) -> Option<String> {
        let paths = match self.bridge.shell(&format!("pm path {id}")).await {
            Ok(out) => out,
            Err(e) => {
                debug!(%id, error = %e, "pm path failed");
                return None;
            }
        };
        let apk = match patterns::apk_path(&paths) {
            Ok(apk) => apk,
            Err(miss) => {
                debug!(%id, %miss, "pm path output unusable");
                return None;
            }
        };

        let dump = match self
            .bridge
            .shell(&format!("{} d badging {}", self.aapt_path, apk))
            .await
        {
            Ok(out) if !out.is_empty() => out,
            Ok(_) => {
                debug!(%id, "aapt returned nothing");
                return None;
            }
            Err(e) => {
                debug!(%id, error = %e, "aapt failed");
                return None;
            }
        };

        match patterns::badging_label(&dump) {
            Ok(label) => Some(label.to_string()),
            Err(miss) => {
                debug!(%id, %miss, "aapt dump has no label");
                None
            }
        }
    }
}
