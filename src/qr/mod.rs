//! # QR Codes
//!
//! Encodes a tracking payload into a grayscale PNG raster.
//!
//! The raster is fully determined by the payload: error correction is fixed
//! at level H (about 30% of the symbol can be damaged and still scan), the
//! quiet zone is one module wide, and each module is drawn as a square block
//! of pixels sized so the whole symbol fits the target width.

pub mod payload;

pub use payload::{tracking_url, ScannedCode, TrackingPayload, PAYLOAD_VERSION};

use base64::Engine;
use image::{GrayImage, Luma};
use qrcode::{EcLevel, QrCode};
use tracing::debug;

use crate::error::RenderError;

/// Target raster width in pixels.
pub const DEFAULT_TARGET_WIDTH: u32 = 200;
/// Quiet zone width in modules.
pub const QUIET_ZONE: u32 = 1;

/// An encoded QR raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QrImage {
    /// PNG file bytes.
    pub png: Vec<u8>,
    /// Raster edge length in pixels (the raster is square).
    pub width_px: u32,
    /// Symbol edge length in modules, excluding the quiet zone.
    pub modules: u32,
}

impl QrImage {
    /// `data:image/png;base64,...` form, for inline display in a browser.
    pub fn to_data_url(&self) -> String {
        let b64 = base64::engine::general_purpose::STANDARD.encode(&self.png);
        format!("data:image/png;base64,{b64}")
    }
}

#[derive(Debug, Clone, Copy)]
pub struct QrEncoder {
    target_width: u32,
}

impl Default for QrEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl QrEncoder {
    pub fn new() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
        }
    }

    pub fn with_target_width(target_width: u32) -> Self {
        Self { target_width }
    }

    /// Encode `payload` at error correction level H and rasterize it to PNG.
    pub fn encode(&self, payload: &str) -> Result<QrImage, RenderError> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)
            .map_err(|e| RenderError::QrEncoding(e.to_string()))?;

        let modules = code.width() as u32;
        let colors = code.to_colors();

        let total = modules + 2 * QUIET_ZONE;
        let scale = (self.target_width / total).max(1);
        let size = total * scale;

        let mut img = GrayImage::from_pixel(size, size, Luma([255u8]));
        for (i, color) in colors.iter().enumerate() {
            if *color != qrcode::Color::Dark {
                continue;
            }
            let mx = (i as u32) % modules + QUIET_ZONE;
            let my = (i as u32) / modules + QUIET_ZONE;
            for dy in 0..scale {
                for dx in 0..scale {
                    img.put_pixel(mx * scale + dx, my * scale + dy, Luma([0u8]));
                }
            }
        }

        let mut png = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut png);
        image::ImageEncoder::write_image(encoder, img.as_raw(), size, size, image::ColorType::L8)
            .map_err(|e| RenderError::QrEncoding(format!("PNG encoding failed: {e}")))?;

        debug!(modules, size, bytes = png.len(), "encoded QR code");

        Ok(QrImage {
            png,
            width_px: size,
            modules,
        })
    }
}
