mod state;

pub use state::{LastReported, MonitorState, INITIAL};

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::{debug, error, info, warn};

use crate::adb::DeviceBridge;
use crate::detect::{Foreground, ForegroundDetector, SYSTEM_UI};
use crate::label::LabelResolver;
use crate::report::{Report, ReportError, ReportPayload, StatusSink};

/// Pause after an unexpected error in a cycle
pub const ERROR_PAUSE: Duration = Duration::from_secs(5);

/// Knobs for the polling loop
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    /// `host:port` used for reconnects
    pub address: String,
    /// Key under `devices` in the payload
    pub device_key: String,
    pub interval: Duration,
    /// Failed cycles in a row before the device is declared gone
    pub max_errors: u32,
}

/// The polling loop and the single owner of [`MonitorState`]
pub struct Monitor {
    settings: MonitorSettings,
    bridge: Arc<dyn DeviceBridge>,
    detector: ForegroundDetector,
    resolver: LabelResolver,
    sink: Arc<dyn StatusSink>,
    state: MonitorState,
}

impl Monitor {
    pub fn new(
        settings: MonitorSettings,
        bridge: Arc<dyn DeviceBridge>,
        resolver: LabelResolver,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            detector: ForegroundDetector::new(bridge.clone()),
            settings,
            bridge,
            resolver,
            sink,
            state: MonitorState::default(),
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    /// Poll forever. Only returns if the surrounding task is dropped.
    pub async fn run(mut self) {
        loop {
            match self.tick().await {
                Ok(()) => tokio::time::sleep(self.settings.interval).await,
                Err(e) => {
                    error!(error = %e, "unexpected error in monitor cycle");
                    tokio::time::sleep(ERROR_PAUSE).await;
                }
            }
        }
    }

    /// One detect/resolve/report cycle.
    pub async fn tick(&mut self) -> Result<()> {
        let foreground = self.detector.detect().await;
        let label = self.resolver.resolve(&foreground).await;
        debug!(package = %foreground, %label, "check");

        if foreground == Foreground::Unreachable {
            self.state.consecutive_errors = self.state.consecutive_errors.saturating_add(1);
            warn!(
                errors = self.state.consecutive_errors,
                max = self.settings.max_errors,
                "device did not answer"
            );

            if self.state.consecutive_errors >= self.settings.max_errors {
                let mut outcome = Ok(());
                if !self.state.last_reported.is_disconnected() {
                    warn!("too many consecutive errors, reporting disconnect");
                    outcome = self.report(Report::Disconnect).await;
                }
                self.reconnect().await;
                return outcome;
            }
            return Ok(());
        }

        self.state.consecutive_errors = 0;

        if !self.state.last_reported.is_label(&label) && label != SYSTEM_UI && label != INITIAL {
            info!(%label, "foreground app changed");
            self.report(Report::Online(label)).await?;
        } else if self.state.last_reported.is_disconnected() {
            info!(%label, "device back, reporting current app");
            self.report(Report::Online(label)).await?;
        }

        Ok(())
    }

    /// Deliver `report`; state moves only when the collector acknowledges it.
    ///
    /// Delivery failures are logged and left for the next cycle to retry.
    /// A payload that cannot even be encoded is returned as an error.
    async fn report(&mut self, report: Report) -> Result<()> {
        let payload = ReportPayload::new(&self.settings.device_key, &report);

        match self.sink.send(&payload).await {
            Ok(()) => {
                info!(?report, "status delivered");
                self.state.last_reported = match report {
                    Report::Online(label) => LastReported::Label(label),
                    Report::Disconnect => LastReported::Disconnected,
                };
                Ok(())
            }
            Err(e @ ReportError::Encode(_)) => Err(e.into()),
            Err(e) => {
                warn!(?report, error = %e, "status delivery failed, will retry");
                Ok(())
            }
        }
    }

    /// Drop and re-open the adb session. The outcome only matters to later cycles.
    async fn reconnect(&self) {
        let address = &self.settings.address;
        info!(address, "cycling adb connection");
        self.bridge.disconnect(address).await;
        if let Err(e) = self.bridge.connect(address).await {
            warn!(address, error = %e, "reconnect failed, will retry next cycle");
        }
    }
}
