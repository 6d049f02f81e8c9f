//! `presence watch` — the home view: continuous recognition with
//! debounced banners.

use anyhow::{Context, Result};
use presence_api::ApiClient;
use presence_core::clock::MonotonicClock;
use presence_core::poller::{Poller, PollerEvents, PollerOptions};
use presence_core::types::DetectedFace;
use presence_hw::CameraSource;
use tokio::sync::watch;

use crate::config::Config;

/// Prints a recognized banner per notification.
struct Banner;

impl PollerEvents for Banner {
    fn recognized(&mut self, name: &str) {
        println!("  ✔ {name}");
    }

    fn overlay(&mut self, _faces: &[DetectedFace]) {}
}

pub async fn run(config: &Config) -> Result<()> {
    let camera = CameraSource::start(&config.camera_device)
        .context("cannot start recognition without camera access")?;
    let client = ApiClient::new(&config.api_url);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("teardown requested");
        let _ = shutdown_tx.send(true);
    });

    let opts = PollerOptions {
        cooldown: config.cooldown(),
        display: config.display(),
        notify: true,
        overlay: false,
    };

    tracing::info!(api = %config.api_url, device = %config.camera_device, "watch starting");
    println!("Watching for faces — Ctrl-C to stop.");

    let mut poller = Poller::new(camera, client, MonotonicClock, Banner, opts, shutdown_rx);
    poller.run_until_shutdown().await?;

    println!("Stopped.");
    Ok(())
}
