//! `presence test` — camera diagnostics.

use anyhow::{Context, Result};
use presence_hw::{CameraSource, RawFrame};

use crate::config::Config;

pub fn run(config: &Config) -> Result<()> {
    let devices = CameraSource::list_devices();
    if devices.is_empty() {
        println!("No V4L2 capture devices found.");
    } else {
        println!("Capture devices:");
        for d in &devices {
            println!("  {}  {} ({})", d.path, d.name, d.driver);
        }
    }

    println!("Opening {} ...", config.camera_device);
    let camera = CameraSource::start(&config.camera_device)
        .context("camera diagnostics failed")?;
    println!(
        "Negotiated {}x{} {:?}",
        camera.width, camera.height, camera.fourcc
    );

    let frame = first_frame(&camera)?;
    println!(
        "First frame: {}x{}, {} bytes grayscale, JPEG {} bytes",
        frame.width,
        frame.height,
        frame.data.len(),
        frame.to_jpeg()?.len()
    );

    println!("Camera OK.");
    Ok(())
}

fn first_frame(camera: &CameraSource) -> Result<RawFrame> {
    const ATTEMPTS: usize = 20;
    for _ in 0..ATTEMPTS {
        match camera.capture_frame() {
            Ok(frame) => return Ok(frame),
            Err(presence_hw::CameraError::NotReady) => {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
            Err(err) => return Err(err.into()),
        }
    }
    anyhow::bail!("no frame after {ATTEMPTS} attempts")
}
