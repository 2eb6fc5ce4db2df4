//! Pairing code rendering

use image::{DynamicImage, ImageFormat, Luma};
use qrcode::QrCode;
use std::io::Cursor;

const MIN_DIMENSION: u32 = 256;

/// Encode the pairing code as a scannable PNG
pub fn render_png(code: &str) -> Result<Vec<u8>, String> {
    let qr = QrCode::new(code.as_bytes()).map_err(|e| format!("Failed to encode QR code: {e}"))?;
    let img = qr
        .render::<Luma<u8>>()
        .min_dimensions(MIN_DIMENSION, MIN_DIMENSION)
        .build();

    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
        .map_err(|e| format!("Failed to write PNG: {e}"))?;
    Ok(png)
}
