//! Image preprocessing for the classifier.
//!
//! Decodes image bytes (PNG/JPEG/BMP/GIF), resizes them to the network's
//! input grid and maps brightness into the `[0.01, 1.0]` range the network
//! was trained on.

use std::fs;
use std::path::Path;

use crate::data::sample::normalize_pixel;
use crate::error::{NetworkError, Result};

/// Decodes image bytes, resizes to `width × height` and maps each pixel's
/// HSL lightness, `(max + min) / 2` over its RGB channels, to `[0.01, 1.0]`.
///
/// Returns a flat row-major `Vec<f64>` of length `width * height`.
pub fn grayscale_input(bytes: &[u8], width: u32, height: u32) -> Result<Vec<f64>> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| NetworkError::Format(format!("cannot decode image: {}", e)))?;
    let resized = img.resize_exact(width, height, image::imageops::FilterType::Triangle);
    Ok(resized
        .to_rgb8()
        .pixels()
        .map(|p| {
            let [r, g, b] = p.0;
            let max = r.max(g).max(b) as f64;
            let min = r.min(g).min(b) as f64;
            normalize_pixel((max + min) / 2.0)
        })
        .collect())
}

/// Reads an image file and converts it with [`grayscale_input`].
pub fn grayscale_input_from_file<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Vec<f64>> {
    let bytes = fs::read(path)?;
    grayscale_input(&bytes, width, height)
}

/// Flips brightness so dark ink on a light page becomes a light digit on a
/// dark background, the orientation of MNIST-style training data.
pub fn invert(pixels: &mut [f64]) {
    for p in pixels.iter_mut() {
        *p = 1.01 - *p;
    }
}
