/// Placeholder label before anything has been reported
pub const INITIAL: &str = "initial";

/// Last transition the collector acknowledged
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LastReported {
    #[default]
    Initial,
    Disconnected,
    Label(String),
}

impl LastReported {
    pub fn is_disconnected(&self) -> bool {
        matches!(self, LastReported::Disconnected)
    }

    pub fn is_label(&self, label: &str) -> bool {
        matches!(self, LastReported::Label(l) if l == label)
    }
}

/// Per-process monitor state, owned by the loop
#[derive(Debug, Clone, Default)]
pub struct MonitorState {
    pub last_reported: LastReported,
    /// Failed detections in a row; reset by any successful one
    pub consecutive_errors: u32,
}
