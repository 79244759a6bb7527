//! Image-to-tensor preprocessing.
//!
//! The model expects a `[1, 3, W, W]` float tensor in channel-first order
//! with values in `[0, 1]`. Incoming images are scaled so their width equals
//! the target edge, read as a square region anchored at the origin, and then
//! transposed from interleaved RGBA to planar RGB.

use image::{imageops::FilterType, DynamicImage};
use ndarray::Array4;

use crate::error::ClassifyError;

/// Edge length of the square model input.
pub const DEFAULT_TARGET_SIZE: u32 = 224;

/// Decode raw file bytes into an image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, ClassifyError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Scale `image` so its width equals `target` and return a `target x target`
/// RGBA buffer read from the origin.
///
/// Rows beyond the scaled height are zero-filled; rows past the square are
/// cropped.
pub fn scale_to_square(image: &DynamicImage, target: u32) -> Vec<u8> {
    let scale = target as f32 / image.width() as f32;
    let height = ((image.height() as f32 * scale).round() as u32).max(1);
    let resized = image
        .resize_exact(target, height, FilterType::Triangle)
        .to_rgba8();

    let row_bytes = target as usize * 4;
    let mut buf = vec![0u8; target as usize * row_bytes];
    let rows = height.min(target) as usize;
    buf[..rows * row_bytes].copy_from_slice(&resized.as_raw()[..rows * row_bytes]);
    buf
}

/// Build the normalized channel-first tensor from a square RGBA buffer.
///
/// The buffer must hold exactly `target * target * 4` bytes. Anything else
/// aborts the request instead of silently truncating.
pub fn tensor_from_rgba(buf: &[u8], target: u32) -> Result<Array4<f32>, ClassifyError> {
    let side = target as usize;
    let expected = side * side * 4;
    if buf.len() != expected {
        return Err(ClassifyError::TensorShapeMismatch {
            expected,
            actual: buf.len(),
        });
    }

    let mut tensor = Array4::<f32>::zeros((1, 3, side, side));
    for y in 0..side {
        for x in 0..side {
            let px = (y * side + x) * 4;
            for c in 0..3 {
                tensor[[0, c, y, x]] = buf[px + c] as f32 / 255.0;
            }
        }
    }
    Ok(tensor)
}

/// Full preprocessing step: decode, scale and convert in one go.
pub fn preprocess(bytes: &[u8], target: u32) -> Result<Array4<f32>, ClassifyError> {
    let image = decode_image(bytes)?;
    let pixels = scale_to_square(&image, target);
    tensor_from_rgba(&pixels, target)
}
