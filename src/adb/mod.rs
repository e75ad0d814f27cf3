mod client;
mod error;

pub use client::AdbClient;
pub use error::AdbError;

use async_trait::async_trait;

/// Result of a successful `adb connect`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    /// A new session was opened
    Connected,
    /// adb already had a session to this address
    AlreadyConnected,
}

/// The debug-bridge surface the monitor depends on.
///
/// `shell` runs against the session opened by `connect`; neither method
/// retries.
#[async_trait]
pub trait DeviceBridge: Send + Sync {
    /// Run a shell command on the device and return its trimmed stdout.
    async fn shell(&self, command: &str) -> Result<String, AdbError>;

    /// Open (or confirm) the session to `address`.
    async fn connect(&self, address: &str) -> Result<ConnectOutcome, AdbError>;

    /// Drop the session to `address`. Failures are swallowed.
    async fn disconnect(&self, address: &str);
}
