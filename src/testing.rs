//! In-process fakes for the adb bridge and the status endpoint.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::adb::{AdbError, ConnectOutcome, DeviceBridge};
use crate::report::{PhoneStatus, ReportError, ReportPayload, StatusSink};

/// Interleaved record of bridge and sink calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Shell(String),
    Connect(String),
    Disconnect(String),
    /// A delivery attempt: (status, software)
    Report(String, String),
}

#[derive(Default)]
pub struct Journal {
    events: Mutex<Vec<Event>>,
}

impl Journal {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    /// Everything except shell calls.
    pub fn control_events(&self) -> Vec<Event> {
        self.events()
            .into_iter()
            .filter(|e| !matches!(e, Event::Shell(_)))
            .collect()
    }

    pub fn reports(&self) -> Vec<(String, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Report(status, software) => Some((status, software)),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

/// Canned answer for a shell command
#[derive(Debug, Clone)]
pub enum Reply {
    Ok(&'static str),
    /// Remote command exited 1 with no stderr
    Exit,
    /// adb reports the device offline
    Offline,
}

impl Reply {
    fn to_result(&self) -> Result<String, AdbError> {
        match self {
            Reply::Ok(out) => Ok(out.trim().to_string()),
            Reply::Exit => Err(AdbError::Exit {
                status: 1,
                stderr: String::new(),
            }),
            Reply::Offline => Err(AdbError::Device("error: device offline".into())),
        }
    }
}

pub struct FakeBridge {
    journal: Arc<Journal>,
    replies: Mutex<HashMap<String, Reply>>,
    offline: Mutex<bool>,
    connect_ok: Mutex<bool>,
    connect_delay: Mutex<Duration>,
}

impl FakeBridge {
    pub fn new(journal: Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            journal,
            replies: Mutex::new(HashMap::new()),
            offline: Mutex::new(false),
            connect_ok: Mutex::new(true),
            connect_delay: Mutex::new(Duration::ZERO),
        })
    }

    /// Script the answer for `command`. Unscripted commands exit 1.
    pub fn reply(&self, command: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), reply);
    }

    /// While offline every shell call fails with a transport error.
    pub fn set_offline(&self, offline: bool) {
        *self.offline.lock().unwrap() = offline;
    }

    pub fn set_connect_ok(&self, ok: bool) {
        *self.connect_ok.lock().unwrap() = ok;
    }

    /// Stall every connect for `delay` before answering.
    pub fn set_connect_delay(&self, delay: Duration) {
        *self.connect_delay.lock().unwrap() = delay;
    }

    pub fn shell_calls(&self) -> Vec<String> {
        self.journal
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Shell(cmd) => Some(cmd),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl DeviceBridge for FakeBridge {
    async fn shell(&self, command: &str) -> Result<String, AdbError> {
        self.journal.push(Event::Shell(command.to_string()));
        if *self.offline.lock().unwrap() {
            return Reply::Offline.to_result();
        }
        self.replies
            .lock()
            .unwrap()
            .get(command)
            .cloned()
            .unwrap_or(Reply::Exit)
            .to_result()
    }

    async fn connect(&self, address: &str) -> Result<ConnectOutcome, AdbError> {
        self.journal.push(Event::Connect(address.to_string()));
        let delay = *self.connect_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if *self.connect_ok.lock().unwrap() {
            Ok(ConnectOutcome::Connected)
        } else {
            Err(AdbError::ConnectRefused(format!(
                "failed to connect to '{address}'"
            )))
        }
    }

    async fn disconnect(&self, address: &str) {
        self.journal.push(Event::Disconnect(address.to_string()));
    }
}

enum Failure {
    Status(u16),
    Encode,
}

/// Records payloads; deliveries succeed unless failures are queued.
pub struct FakeSink {
    journal: Arc<Journal>,
    failures: Mutex<VecDeque<Failure>>,
}

impl FakeSink {
    pub fn new(journal: Arc<Journal>) -> Arc<Self> {
        Arc::new(Self {
            journal,
            failures: Mutex::new(VecDeque::new()),
        })
    }

    /// Make the next delivery fail with HTTP `status`.
    pub fn fail_next(&self, status: u16) {
        self.failures
            .lock()
            .unwrap()
            .push_back(Failure::Status(status));
    }

    /// Make the next delivery fail as if the payload could not be serialized.
    pub fn fail_encode_next(&self) {
        self.failures.lock().unwrap().push_back(Failure::Encode);
    }
}

#[async_trait]
impl StatusSink for FakeSink {
    async fn send(&self, payload: &ReportPayload) -> Result<(), ReportError> {
        for device in payload.devices.values() {
            let status = match device.status {
                PhoneStatus::Online => "online",
                PhoneStatus::Disconnect => "disconnect",
            };
            self.journal
                .push(Event::Report(status.to_string(), device.software.clone()));
        }
        match self.failures.lock().unwrap().pop_front() {
            Some(Failure::Status(status)) => Err(ReportError::Status(status)),
            Some(Failure::Encode) => {
                let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
                Err(ReportError::Encode(err))
            }
            None => Ok(()),
        }
    }
}
