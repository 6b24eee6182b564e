//! # Image Decoding
//!
//! Turns PNG bytes into pixel data the PDF serializer can embed. Grayscale
//! images without transparency (which is what the QR encoder produces) stay
//! single-channel; everything else is expanded to RGB with a separate alpha
//! channel for SMask transparency.

use std::io::Cursor;

use image::DynamicImage;

use crate::error::RenderError;

/// A fully decoded image ready for PDF embedding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedImage {
    pub pixel_data: ImagePixelData,
    pub width_px: u32,
    pub height_px: u32,
}

/// The pixel data in a format the PDF serializer can consume directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePixelData {
    /// width * height bytes, one luminance sample per pixel.
    Gray(Vec<u8>),
    /// Decoded RGB pixels + optional alpha channel.
    Rgb {
        /// width * height * 3 bytes (RGB)
        rgb: Vec<u8>,
        /// width * height bytes (grayscale alpha). None if fully opaque.
        alpha: Option<Vec<u8>>,
    },
}

/// Decode PNG bytes into embeddable pixel data.
pub fn decode_png(data: &[u8]) -> Result<LoadedImage, RenderError> {
    if !is_png(data) {
        return Err(RenderError::Image("expected PNG data".to_string()));
    }

    let img = image::io::Reader::with_format(Cursor::new(data), image::ImageFormat::Png)
        .decode()
        .map_err(|e| RenderError::Image(format!("failed to decode PNG: {e}")))?;

    let width = img.width();
    let height = img.height();

    let pixel_data = match img {
        DynamicImage::ImageLuma8(gray) => ImagePixelData::Gray(gray.into_raw()),
        other => split_rgba(other),
    };

    Ok(LoadedImage {
        pixel_data,
        width_px: width,
        height_px: height,
    })
}

fn split_rgba(img: DynamicImage) -> ImagePixelData {
    let rgba = img.to_rgba8();
    let pixel_count = (rgba.width() * rgba.height()) as usize;
    let mut rgb = Vec::with_capacity(pixel_count * 3);
    let mut alpha = Vec::with_capacity(pixel_count);
    let mut has_transparency = false;

    for pixel in rgba.pixels() {
        rgb.extend_from_slice(&pixel.0[..3]);
        let a = pixel[3];
        alpha.push(a);
        if a != 255 {
            has_transparency = true;
        }
    }

    ImagePixelData::Rgb {
        rgb,
        alpha: if has_transparency { Some(alpha) } else { None },
    }
}

fn is_png(data: &[u8]) -> bool {
    data.starts_with(&[0x89, 0x50, 0x4E, 0x47])
}
