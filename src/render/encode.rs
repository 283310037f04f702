//! QR and barcode raster encoding.
//!
//! Pure functions: content string (+ format and pixel size for barcodes) in,
//! PNG bytes out. The generator writes the bytes to a scoped temp file and
//! places them through the backend's image primitive.

use std::io::Cursor;

use image::{GrayImage, ImageFormat, Luma, imageops};
use qrcode::{EcLevel, QrCode};

use crate::error::FacturaError;
use crate::template::element::BarcodeFormat;

/// Nominal QR edge length in pixels; the actual output is the nearest
/// multiple of the module count at or below this.
const QR_NOMINAL_PX: u32 = 256;

/// Encode `content` as a QR code PNG (error correction level M).
pub fn encode_qr(content: &str) -> Result<Vec<u8>, FacturaError> {
    png_bytes(qr_image(content)?)
}

/// Encode `content` as a barcode PNG of the requested pixel dimensions.
pub fn encode_barcode(
    content: &str,
    format: BarcodeFormat,
    width_px: u32,
    height_px: u32,
) -> Result<Vec<u8>, FacturaError> {
    let width_px = width_px.max(1);
    let height_px = height_px.max(1);

    let modules = match format {
        BarcodeFormat::Code128 => {
            // Code 128 requires a character-set prefix; Set B covers the
            // widest range of printable characters.
            let prefixed = format!("\u{0181}{}", content);
            barcoders::sym::code128::Code128::new(&prefixed)
                .map_err(|e| FacturaError::Encode(format!("Code128: {:?}", e)))?
                .encode()
        }
        BarcodeFormat::Code39 => barcoders::sym::code39::Code39::new(content)
            .map_err(|e| FacturaError::Encode(format!("Code39: {:?}", e)))?
            .encode(),
        BarcodeFormat::Ean13 => barcoders::sym::ean13::EAN13::new(content)
            .map_err(|e| FacturaError::Encode(format!("EAN13: {:?}", e)))?
            .encode(),
        BarcodeFormat::Qr => {
            // QR through the barcode path: encode square, then scale to the
            // requested placement size.
            let qr = qr_image(content)?;
            let scaled = imageops::resize(&qr, width_px, height_px, imageops::FilterType::Nearest);
            return png_bytes(scaled);
        }
    };

    if modules.is_empty() {
        return Err(FacturaError::Encode(format!(
            "{} produced no modules",
            format.name()
        )));
    }

    // Stretch the module run over the requested width; bars span the full
    // height.
    let mut img = GrayImage::from_pixel(width_px, height_px, Luma([255]));
    for x in 0..width_px {
        let module = modules[(x as usize * modules.len()) / width_px as usize];
        if module == 1 {
            for y in 0..height_px {
                img.put_pixel(x, y, Luma([0]));
            }
        }
    }

    png_bytes(img)
}

/// Render a QR matrix to a square grayscale image.
fn qr_image(content: &str) -> Result<GrayImage, FacturaError> {
    let code = QrCode::with_error_correction_level(content, EcLevel::M)
        .map_err(|e| FacturaError::Encode(format!("QR encoding failed: {}", e)))?;

    let size = code.width();
    let cell = (QR_NOMINAL_PX as usize / size).max(1);
    let px = (size * cell) as u32;

    let mut img = GrayImage::from_pixel(px, px, Luma([255]));
    for qy in 0..size {
        for qx in 0..size {
            if code[(qx, qy)] == qrcode::Color::Dark {
                for cy in 0..cell {
                    for cx in 0..cell {
                        img.put_pixel((qx * cell + cx) as u32, (qy * cell + cy) as u32, Luma([0]));
                    }
                }
            }
        }
    }

    Ok(img)
}

fn png_bytes(img: GrayImage) -> Result<Vec<u8>, FacturaError> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .map_err(|e| FacturaError::Encode(format!("PNG serialization failed: {}", e)))?;
    Ok(buf.into_inner())
}
