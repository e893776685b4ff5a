//! QR code export of the share link.

use image::{GrayImage, ImageEncoder, Luma};
use url::Url;

use super::Download;
use crate::error::{CardError, Result};
use crate::link;
use crate::state::CardState;

/// Edge length of the exported QR image in pixels.
pub const QR_SIZE: u32 = 250;
/// File name of the QR download.
pub const QR_FILENAME: &str = "eid-card-qr-code.png";
/// Prompt shown when generating a QR code without a name.
pub const QR_NAME_PROMPT: &str = "Please enter your name before generating the QR code.";

/// Light modules around the symbol.
const QUIET_ZONE: usize = 4;

/// Encode the share link for `state` as a PNG QR code.
///
/// Fails with [`CardError::MissingInput`] before doing any work when the name
/// is blank.
pub fn share_qr(base: &Url, state: &CardState) -> Result<Download> {
    let link = link::encode_with_prompt(base, state, QR_NAME_PROMPT)?;
    let bytes = render_png(link.as_str(), QR_SIZE)?;
    Ok(Download {
        filename: QR_FILENAME.to_string(),
        bytes,
    })
}

/// Render `data` as a square PNG QR code of `size` pixels.
///
/// Modules are drawn at the largest whole-pixel cell size that fits and
/// centered; a payload too dense for `size` grows the image instead of
/// blurring modules.
pub fn render_png(data: &str, size: u32) -> Result<Vec<u8>> {
    let image = render_image(data, size)?;

    let mut png_bytes = Vec::new();
    image::codecs::png::PngEncoder::new(&mut png_bytes)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::L8,
        )
        .map_err(|e| CardError::Image(format!("PNG encoding failed: {}", e)))?;
    Ok(png_bytes)
}

fn render_image(data: &str, size: u32) -> Result<GrayImage> {
    use qrcode::{EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(data.as_bytes(), EcLevel::M)
        .map_err(|e| CardError::Image(format!("QR code generation failed: {}", e)))?;

    let modules = code.width();
    let total = modules + 2 * QUIET_ZONE;
    let cell = (size as usize / total).max(1);
    let side = (size as usize).max(total * cell);
    let offset = (side - total * cell) / 2 + QUIET_ZONE * cell;

    let mut img = GrayImage::from_pixel(side as u32, side as u32, Luma([255u8]));
    for qy in 0..modules {
        for qx in 0..modules {
            if code[(qx, qy)] != qrcode::Color::Dark {
                continue;
            }
            for cy in 0..cell {
                for cx in 0..cell {
                    let px = offset + qx * cell + cx;
                    let py = offset + qy * cell + cy;
                    img.put_pixel(px as u32, py as u32, Luma([0u8]));
                }
            }
        }
    }
    Ok(img)
}
