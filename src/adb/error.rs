use std::time::Duration;

use thiserror::Error;

/// Failure of a single adb invocation.
#[derive(Debug, Error)]
pub enum AdbError {
    #[error("failed to spawn adb: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("adb command timed out after {0:?}")]
    Timeout(Duration),

    /// adb itself reported that the device cannot be reached.
    #[error("device unavailable: {0}")]
    Device(String),

    /// The remote command ran and exited non-zero.
    #[error("remote command exited with {status}: {stderr}")]
    Exit { status: i32, stderr: String },

    #[error("adb connect was refused: {0}")]
    ConnectRefused(String),
}

impl AdbError {
    /// True when the session to the device is in doubt, as opposed to a
    /// command that ran and simply failed.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AdbError::Spawn(_)
                | AdbError::Timeout(_)
                | AdbError::Device(_)
                | AdbError::ConnectRefused(_)
        )
    }
}

/// Markers adb prints on stderr when the transport, not the remote command, failed.
const TRANSPORT_MARKERS: &[&str] = &[
    "no devices/emulators found",
    "device offline",
    "device unauthorized",
    "not found",
    "closed",
    "cannot connect",
    "protocol fault",
];

/// Classify a non-zero `adb shell` exit by its stderr.
pub(crate) fn classify_exit(status: i32, stderr: &str) -> AdbError {
    let stderr = stderr.trim();
    let lower = stderr.to_lowercase();
    if lower.contains("error:") && TRANSPORT_MARKERS.iter().any(|m| lower.contains(m)) {
        AdbError::Device(stderr.to_string())
    } else {
        AdbError::Exit {
            status,
            stderr: stderr.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grep_without_match_is_not_transport() {
        let err = classify_exit(1, "");
        assert!(matches!(err, AdbError::Exit { status: 1, .. }));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_offline_device_is_transport() {
        let err = classify_exit(1, "error: device offline\n");
        assert!(matches!(err, AdbError::Device(ref msg) if msg == "error: device offline"));
        assert!(err.is_transport());

        let err = classify_exit(1, "adb: error: device '10.0.0.2:5555' not found");
        assert!(err.is_transport());

        let err = classify_exit(1, "error: no devices/emulators found");
        assert!(err.is_transport());
    }

    #[test]
    fn test_remote_not_found_without_adb_prefix_stays_exit() {
        // e.g. `ls` on the device complaining about a missing path
        let err = classify_exit(1, "ls: /nope: No such file or directory");
        assert!(!err.is_transport());
    }

    #[test]
    fn test_timeout_is_transport() {
        assert!(AdbError::Timeout(Duration::from_secs(10)).is_transport());
    }
}
