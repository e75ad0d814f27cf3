//! Command-line and environment configuration.

use std::time::Duration;

use clap::Parser;

use crate::detect::AppId;
use crate::label::LabelCache;
use crate::monitor::MonitorSettings;

#[derive(Debug, Parser)]
#[command(
    name = "phone-peek",
    version,
    about = "Report the foreground app of an adb-connected phone to a status endpoint"
)]
pub struct Config {
    /// Status endpoint receiving the JSON reports
    #[arg(long, env = "PEEK_SERVER_URL", default_value = "http://localhost:3000/api/status")]
    pub server_url: String,

    /// Device address (host:port) for adb connect
    #[arg(long, env = "PEEK_DEVICE", default_value = "192.168.124.249:38887")]
    pub device: String,

    /// Seconds between checks
    #[arg(
        long,
        env = "PEEK_INTERVAL",
        default_value_t = 5,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,

    /// aapt binary on the device, used to read labels of unknown apps
    #[arg(long, env = "PEEK_AAPT_PATH", default_value = "/data/local/tmp/aapt-arm-pie")]
    pub aapt_path: String,

    /// Failed checks in a row before reporting a disconnect
    #[arg(
        long,
        env = "PEEK_MAX_ERRORS",
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub max_errors: u32,

    /// adb binary on this machine
    #[arg(long, env = "ADB_PATH", default_value = "adb")]
    pub adb_path: String,

    /// Timeout in seconds for one adb invocation
    #[arg(
        long,
        env = "PEEK_COMMAND_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub command_timeout: u64,

    /// Timeout in seconds for one report
    #[arg(
        long,
        env = "PEEK_REPORT_TIMEOUT",
        default_value_t = 10,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub report_timeout: u64,

    /// Name of this device in the report payload
    #[arg(long, env = "PEEK_DEVICE_KEY", default_value = "Phone")]
    pub device_key: String,

    /// Extra known label, `package=Label`; may be repeated
    #[arg(long = "label", value_name = "PACKAGE=LABEL", value_parser = parse_label)]
    pub labels: Vec<(AppId, String)>,

    /// Don't cache labels read with aapt
    #[arg(long)]
    pub no_remember: bool,
}

impl Config {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout)
    }

    pub fn report_timeout(&self) -> Duration {
        Duration::from_secs(self.report_timeout)
    }

    /// Built-in labels overlaid with the ones given on the command line.
    pub fn label_cache(&self) -> LabelCache {
        let mut cache = LabelCache::with_builtin();
        cache.extend(self.labels.iter().cloned());
        cache
    }

    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            address: self.device.clone(),
            device_key: self.device_key.clone(),
            interval: Duration::from_secs(self.interval),
            max_errors: self.max_errors,
        }
    }
}

fn parse_label(s: &str) -> Result<(AppId, String), String> {
    let (id, label) = s
        .split_once('=')
        .ok_or_else(|| format!("expected PACKAGE=LABEL, got '{s}'"))?;
    let (id, label) = (id.trim(), label.trim());
    if id.is_empty() || label.is_empty() {
        return Err(format!("package and label must both be non-empty in '{s}'"));
    }
    Ok((AppId::new(id), label.to_string()))
}
