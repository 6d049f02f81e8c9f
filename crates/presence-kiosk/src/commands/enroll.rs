//! `presence enroll` — capture a frame and register a student, with an
//! optional live-overlay preview beforehand.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use presence_api::{ApiClient, ApiError, EnrollRequest};
use presence_core::clock::MonotonicClock;
use presence_core::poller::{CaptureError, FrameSource, Poller, PollerEvents, PollerOptions};
use presence_core::types::{DetectedFace, Frame};
use presence_hw::CameraSource;
use tokio::sync::watch;

use crate::config::Config;

/// Prints one line per detected face, recognized or not. The preview's
/// stand-in for drawing bounding boxes.
struct BoxPrinter;

impl PollerEvents for BoxPrinter {
    fn recognized(&mut self, _name: &str) {}

    fn overlay(&mut self, faces: &[DetectedFace]) {
        for face in faces {
            println!(
                "  {} @ ({:.0}, {:.0}) {:.0}x{:.0}",
                face.name, face.bbox.x, face.bbox.y, face.bbox.width, face.bbox.height
            );
        }
    }
}

pub async fn run(
    config: &Config,
    name: String,
    mobile: Option<String>,
    email: Option<String>,
    preview_secs: u64,
    update_face: bool,
) -> Result<()> {
    let mut camera = CameraSource::start(&config.camera_device)
        .context("cannot enroll without camera access")?;
    let client = ApiClient::new(&config.api_url);

    if preview_secs > 0 {
        println!("Preview for {preview_secs}s — every detected face is annotated:");
        run_preview(&mut camera, &client, preview_secs).await?;
    }

    let frame = capture_with_retry(&mut camera).await?;
    camera.stop();

    let request = EnrollRequest {
        name: name.clone(),
        mobile,
        email,
        image: frame.data_url.clone(),
    };

    match client.enroll(&request).await {
        Ok(response) if response.student_exists => {
            println!("{}", response.message);
            if update_face {
                let message = client
                    .update_face(&name, &frame.data_url)
                    .await
                    .map_err(inline_remote)?;
                println!("{message}");
                Ok(())
            } else {
                bail!("re-run with --update-face to replace the stored facial data")
            }
        }
        Ok(response) => {
            println!("{}", response.message);
            Ok(())
        }
        Err(err) => Err(inline_remote(err)),
    }
}

/// Overlay-only poll loop for a fixed preview window; the cooldown
/// never applies on this path.
async fn run_preview(
    camera: &mut CameraSource,
    client: &ApiClient,
    preview_secs: u64,
) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(preview_secs)).await;
        let _ = shutdown_tx.send(true);
    });

    let opts = PollerOptions {
        notify: false,
        overlay: true,
        ..Default::default()
    };

    let mut poller = Poller::new(
        camera,
        client.clone(),
        MonotonicClock,
        BoxPrinter,
        opts,
        shutdown_rx,
    );
    poller.run_until_shutdown().await?;
    Ok(())
}

/// The still for enrollment; waits out `NotReady` while the sensor
/// finishes initializing.
async fn capture_with_retry(camera: &mut CameraSource) -> Result<Frame> {
    const ATTEMPTS: usize = 20;
    for _ in 0..ATTEMPTS {
        match camera.capture() {
            Ok(frame) => return Ok(frame),
            Err(CaptureError::NotReady) => {
                tokio::time::sleep(Duration::from_millis(100)).await;
            }
            Err(CaptureError::Device(msg)) => bail!("camera failed: {msg}"),
        }
    }
    bail!("camera produced no frame after {ATTEMPTS} attempts")
}

/// Remote errors during enrollment are operator-facing, inline.
fn inline_remote(err: ApiError) -> anyhow::Error {
    match err {
        ApiError::Remote { message, .. } => anyhow::anyhow!("enrollment failed: {message}"),
        other => other.into(),
    }
}
