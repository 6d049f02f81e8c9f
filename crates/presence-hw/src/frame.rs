//! Raw frame type and encoding — YUYV conversion, JPEG, data URL.

use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;

/// JPEG quality for submitted frames. The recognition service crops and
/// re-embeds anyway, so heavier compression only saves bandwidth.
const JPEG_QUALITY: u8 = 80;

/// One grayscale frame dequeued from the camera.
#[derive(Clone)]
pub struct RawFrame {
    /// Grayscale pixel data (width * height bytes).
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub timestamp: std::time::Instant,
    pub sequence: u32,
}

impl RawFrame {
    /// Encode as JPEG bytes.
    pub fn to_jpeg(&self) -> Result<Vec<u8>, FrameError> {
        let pixels = (self.width * self.height) as usize;
        if self.data.len() < pixels {
            return Err(FrameError::InvalidLength {
                expected: pixels,
                actual: self.data.len(),
            });
        }

        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY);
        encoder.encode(
            &self.data[..pixels],
            self.width,
            self.height,
            image::ExtendedColorType::L8,
        )?;
        Ok(jpeg)
    }

    /// Encode as a `data:image/jpeg;base64,...` URL, the shape the
    /// recognize and enroll endpoints expect.
    pub fn to_data_url(&self) -> Result<String, FrameError> {
        let jpeg = self.to_jpeg()?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&jpeg);
        Ok(format!("data:image/jpeg;base64,{encoded}"))
    }
}

/// Convert packed YUYV (4:2:2) to grayscale by extracting the Y channel.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V].
/// Grayscale = every even-indexed byte.
pub fn yuyv_to_grayscale(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let expected = (width * height * 2) as usize;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }
    Ok(yuyv[..expected].iter().step_by(2).copied().collect())
}

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}
