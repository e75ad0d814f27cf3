pub mod patterns;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info};

use crate::adb::{AdbError, DeviceBridge};

/// Cheap query; normally sufficient.
pub const STACK_QUERY: &str = "am stack list | grep -E 'topActivity='";
/// Slower window-manager query, used when the stack list yields nothing.
pub const WINDOW_QUERY: &str = "dumpsys window windows | grep -E 'mFocusedApp='";

/// Label reported when no specific app holds focus.
pub const SYSTEM_UI: &str = "System UI / Launcher";
/// Label carried by a cycle in which the device could not be queried at all.
pub const ADB_ERROR: &str = "ADB_ERROR";

/// Platform package name of an installed app
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppId(String);

impl AppId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What holds the device's screen this cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Foreground {
    /// A specific application
    App(AppId),
    /// Home screen or system UI; a normal steady state
    SystemUi,
    /// Both queries failed at the transport level
    Unreachable,
}

impl Foreground {
    /// Sentinel text for the non-app variants.
    pub fn sentinel(&self) -> Option<&'static str> {
        match self {
            Foreground::App(_) => None,
            Foreground::SystemUi => Some(SYSTEM_UI),
            Foreground::Unreachable => Some(ADB_ERROR),
        }
    }
}

impl fmt::Display for Foreground {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Foreground::App(id) => fmt::Display::fmt(id, f),
            other => f.write_str(other.sentinel().unwrap_or_default()),
        }
    }
}

/// Finds the focused app using the stack list, then the window dump.
pub struct ForegroundDetector {
    bridge: Arc<dyn DeviceBridge>,
}

impl ForegroundDetector {
    pub fn new(bridge: Arc<dyn DeviceBridge>) -> Self {
        Self { bridge }
    }

    pub async fn detect(&self) -> Foreground {
        let primary = self.bridge.shell(STACK_QUERY).await;
        match &primary {
            Ok(output) => match patterns::top_activity_package(output) {
                Ok(id) => return Foreground::App(AppId::new(id)),
                Err(miss) => debug!(%miss, "stack list had no top activity"),
            },
            Err(e) => debug!(error = %e, "stack list query failed"),
        }

        info!("falling back to window dump (slower)");
        let secondary = self.bridge.shell(WINDOW_QUERY).await;
        match &secondary {
            Ok(output) => match patterns::focused_app_package(output) {
                Ok(id) => return Foreground::App(AppId::new(id)),
                Err(miss) => debug!(%miss, "window dump had no focused app"),
            },
            Err(e) => debug!(error = %e, "window dump query failed"),
        }

        if is_transport_failure(&primary) && is_transport_failure(&secondary) {
            Foreground::Unreachable
        } else {
            Foreground::SystemUi
        }
    }
}

fn is_transport_failure(result: &Result<String, AdbError>) -> bool {
    matches!(result, Err(e) if e.is_transport())
}
