//! Frame conversion and transformation utilities.

use image::RgbImage;

use super::types::{CameraError, Frame};
use crate::blend;

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let height = frame.height as usize;
    let bpp = Frame::BYTES_PER_PIXEL;

    for y in 0..height {
        let row_start = y * width * bpp;
        let row = &mut frame.data[row_start..row_start + width * bpp];

        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}

/// Encode a frame as JPEG.
pub fn frame_to_jpeg(frame: Frame) -> Result<Vec<u8>, CameraError> {
    let (width, height) = (frame.width, frame.height);
    let image = RgbImage::from_raw(width, height, frame.data).ok_or_else(|| {
        CameraError::EncodeFailed(format!("frame buffer does not match {}x{}", width, height))
    })?;
    blend::encode_jpeg(&image).map_err(|e| CameraError::EncodeFailed(e.to_string()))
}
