use std::process::{Output, Stdio};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::error::{classify_exit, AdbError};
use super::{ConnectOutcome, DeviceBridge};

/// Client for talking to one device through the adb CLI
pub struct AdbClient {
    /// Path to adb binary
    adb_path: String,
    /// `host:port` of the device
    serial: String,
    /// Upper bound for a single adb invocation
    timeout: Duration,
}

impl AdbClient {
    pub fn new(adb_path: impl Into<String>, serial: impl Into<String>, timeout: Duration) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial: serial.into(),
            timeout,
        }
    }

    /// Spawn adb with `args`, bounded by the client timeout.
    async fn run(&self, args: &[&str]) -> Result<Output, AdbError> {
        let child = Command::new(&self.adb_path)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => Ok(output?),
            Err(_) => Err(AdbError::Timeout(self.timeout)),
        }
    }
}

#[async_trait]
impl DeviceBridge for AdbClient {
    async fn shell(&self, command: &str) -> Result<String, AdbError> {
        let output = self.run(&["-s", self.serial.as_str(), "shell", command]).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(classify_exit(output.status.code().unwrap_or(-1), &stderr));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    async fn connect(&self, address: &str) -> Result<ConnectOutcome, AdbError> {
        info!(address, "connecting to device");
        // adb connect exits 0 even when the connection failed; only stdout tells.
        let output = self.run(&["connect", address]).await?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        let outcome = parse_connect_output(&stdout)?;
        match outcome {
            ConnectOutcome::AlreadyConnected => info!(address, "adb already connected"),
            ConnectOutcome::Connected => info!(address, "adb connected"),
        }
        Ok(outcome)
    }

    async fn disconnect(&self, address: &str) {
        match self.run(&["disconnect", address]).await {
            Ok(output) => debug!(
                address,
                output = %String::from_utf8_lossy(&output.stdout).trim(),
                "adb disconnect"
            ),
            Err(e) => debug!(address, error = %e, "adb disconnect failed, ignoring"),
        }
    }
}

/// Interpret the stdout of `adb connect`.
///
/// Expected: `connected to <addr>` or `already connected to <addr>`.
/// Anything else, e.g. `failed to connect to <addr>`, is a refusal.
fn parse_connect_output(stdout: &str) -> Result<ConnectOutcome, AdbError> {
    let stdout = stdout.trim();
    if stdout.contains("already connected to") {
        Ok(ConnectOutcome::AlreadyConnected)
    } else if stdout.contains("connected to") {
        Ok(ConnectOutcome::Connected)
    } else {
        Err(AdbError::ConnectRefused(stdout.to_string()))
    }
}
