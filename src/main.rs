use std::future::Future;
use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

mod adb;
mod config;
mod detect;
mod label;
mod monitor;
mod report;
#[cfg(test)]
mod testing;

use adb::{AdbClient, DeviceBridge};
use config::Config;
use label::{BadgingSource, LabelResolver, LabelSource};
use monitor::Monitor;
use report::HttpReporter;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::parse();

    info!(
        server = %config.server_url,
        device = %config.device,
        interval_secs = config.interval,
        aapt = %config.aapt_path,
        "starting phone monitor"
    );

    let bridge: Arc<dyn DeviceBridge> = Arc::new(AdbClient::new(
        config.adb_path.clone(),
        config.device.clone(),
        config.command_timeout(),
    ));

    serve(&config, bridge, tokio::signal::ctrl_c()).await
}

/// Run startup and then the loop until `shutdown` resolves.
///
/// An interrupt at any point stops cleanly; only a failed startup is an error.
async fn serve<F>(config: &Config, bridge: Arc<dyn DeviceBridge>, shutdown: F) -> Result<()>
where
    F: Future<Output = io::Result<()>>,
{
    tokio::pin!(shutdown);

    let monitor = tokio::select! {
        res = start(config, bridge) => res?,
        res = &mut shutdown => {
            res.context("Failed to listen for Ctrl-C")?;
            info!("interrupted during startup, stopping");
            return Ok(());
        }
    };

    // Cycles never overlap; Ctrl-C drops the loop wherever it is.
    tokio::select! {
        () = monitor.run() => {}
        res = &mut shutdown => {
            res.context("Failed to listen for Ctrl-C")?;
            info!("interrupted, stopping");
        }
    }

    Ok(())
}

/// Open the adb session and assemble the monitor.
async fn start(config: &Config, bridge: Arc<dyn DeviceBridge>) -> Result<Monitor> {
    if let Err(e) = bridge.connect(&config.device).await {
        error!(device = %config.device, error = %e, "cannot establish adb connection, exiting");
        return Err(e).context("Initial adb connection failed");
    }

    let reporter = HttpReporter::new(config.server_url.clone(), config.report_timeout())?;
    reporter.probe().await;

    let sources: Vec<Box<dyn LabelSource>> = vec![Box::new(BadgingSource::new(
        bridge.clone(),
        config.aapt_path.clone(),
    ))];
    let resolver = LabelResolver::new(config.label_cache(), sources, !config.no_remember);
    info!(known_labels = resolver.cache().len(), "label cache ready");

    Ok(Monitor::new(
        config.monitor_settings(),
        bridge,
        resolver,
        Arc::new(reporter),
    ))
}
