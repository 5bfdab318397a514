//! Intensity blending between the original and the styled image.
//!
//! The blend is a per-channel linear mix, `(1 - t) * original + t * styled`
//! with `t = intensity / 100`, evaluated on a canvas the size of the styled
//! image. The original is resized to that canvas first.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::RgbImage;

/// JPEG quality for blended results and camera snapshots.
pub const JPEG_QUALITY: u8 = 95;

/// Upper end of the intensity range.
pub const MAX_INTENSITY: u8 = 100;

#[derive(Debug, thiserror::Error)]
pub enum BlendError {
    #[error("failed to decode {which} image: {source}")]
    Decode {
        which: &'static str,
        #[source]
        source: image::ImageError,
    },

    #[error("failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("decode task failed: {0}")]
    Join(String),
}

/// Decode any supported raster format to RGB.
pub fn decode(bytes: &[u8]) -> Result<RgbImage, image::ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgb8())
}

/// Encode an RGB raster as JPEG at [`JPEG_QUALITY`].
pub fn encode_jpeg(image: &RgbImage) -> Result<Vec<u8>, BlendError> {
    let mut buf = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buf, JPEG_QUALITY);
    image.write_with_encoder(encoder).map_err(BlendError::Encode)?;
    Ok(buf)
}

/// Resize `image` to `width`x`height` unless it already has that size.
pub(crate) fn fit_to(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, FilterType::Triangle)
    }
}

/// Composite `original` and `styled` at `intensity` percent (clamped to 100).
///
/// Intensity 0 yields the resized original and 100 yields `styled`, exactly.
pub fn blend(original: &RgbImage, styled: &RgbImage, intensity: u8) -> RgbImage {
    let t = f32::from(intensity.min(MAX_INTENSITY)) / 100.0;
    let (width, height) = styled.dimensions();
    let original = fit_to(original, width, height);

    let mut out = RgbImage::new(width, height);
    for ((dst, o), s) in out.pixels_mut().zip(original.pixels()).zip(styled.pixels()) {
        for c in 0..3 {
            let mixed = (1.0 - t) * f32::from(o.0[c]) + t * f32::from(s.0[c]);
            dst.0[c] = mixed.round().clamp(0.0, 255.0) as u8;
        }
    }
    out
}

/// Decode both sources concurrently and wait for both.
pub async fn decode_pair(
    original: Vec<u8>,
    styled: Vec<u8>,
) -> Result<(RgbImage, RgbImage), BlendError> {
    let original_task = tokio::task::spawn_blocking(move || decode(&original));
    let styled_task = tokio::task::spawn_blocking(move || decode(&styled));

    let (original, styled) = tokio::try_join!(original_task, styled_task)
        .map_err(|e| BlendError::Join(e.to_string()))?;

    let original = original.map_err(|source| BlendError::Decode {
        which: "original",
        source,
    })?;
    let styled = styled.map_err(|source| BlendError::Decode {
        which: "styled",
        source,
    })?;
    Ok((original, styled))
}

/// Decode, blend and re-encode as JPEG.
pub async fn blend_to_jpeg(
    original: Vec<u8>,
    styled: Vec<u8>,
    intensity: u8,
) -> Result<Vec<u8>, BlendError> {
    let (original, styled) = decode_pair(original, styled).await?;
    tokio::task::spawn_blocking(move || encode_jpeg(&blend(&original, &styled, intensity)))
        .await
        .map_err(|e| BlendError::Join(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgb};
    use std::io::Cursor;

    fn solid(width: u32, height: u32, color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, Rgb(color))
    }

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_intensity_zero_is_original() {
        let original = solid(4, 3, [10, 200, 30]);
        let styled = solid(4, 3, [250, 0, 128]);
        assert_eq!(blend(&original, &styled, 0), original);
    }

    #[test]
    fn test_intensity_hundred_is_styled() {
        let original = solid(4, 3, [10, 200, 30]);
        let styled = solid(4, 3, [250, 0, 128]);
        assert_eq!(blend(&original, &styled, 100), styled);
    }

    #[test]
    fn test_intensity_forty_mixes_linearly() {
        let original = solid(2, 2, [100, 0, 200]);
        let styled = solid(2, 2, [200, 250, 0]);
        let out = blend(&original, &styled, 40);
        // 0.6 * original + 0.4 * styled
        assert_eq!(out.get_pixel(1, 1), &Rgb([140, 100, 120]));
    }

    #[test]
    fn test_intensity_is_clamped() {
        let original = solid(1, 1, [0, 0, 0]);
        let styled = solid(1, 1, [90, 90, 90]);
        assert_eq!(blend(&original, &styled, 250), styled);
    }

    #[test]
    fn test_canvas_takes_styled_dimensions() {
        let original = solid(8, 6, [50, 50, 50]);
        let styled = solid(4, 3, [50, 50, 50]);
        let out = blend(&original, &styled, 50);
        assert_eq!(out.dimensions(), (4, 3));
        assert_eq!(out.get_pixel(0, 0), &Rgb([50, 50, 50]));
    }

    #[test]
    fn test_encode_jpeg_produces_jpeg() {
        let bytes = encode_jpeg(&solid(8, 8, [1, 2, 3])).unwrap();
        assert_eq!(&bytes[..2], &[0xff, 0xd8]);
        assert_eq!(decode(&bytes).unwrap().dimensions(), (8, 8));
    }

    #[tokio::test]
    async fn test_decode_pair_joins_both() {
        let a = png_bytes(&solid(3, 2, [1, 1, 1]));
        let b = png_bytes(&solid(5, 4, [2, 2, 2]));
        let (original, styled) = decode_pair(a, b).await.unwrap();
        assert_eq!(original.dimensions(), (3, 2));
        assert_eq!(styled.dimensions(), (5, 4));
    }

    #[tokio::test]
    async fn test_decode_pair_reports_which_failed() {
        let good = png_bytes(&solid(1, 1, [0, 0, 0]));
        let err = decode_pair(good, b"not an image".to_vec()).await.unwrap_err();
        assert!(matches!(err, BlendError::Decode { which: "styled", .. }));
    }

    #[tokio::test]
    async fn test_blend_to_jpeg_uses_styled_size() {
        let a = png_bytes(&solid(10, 10, [0, 0, 0]));
        let b = png_bytes(&solid(6, 4, [255, 255, 255]));
        let jpeg = blend_to_jpeg(a, b, 100).await.unwrap();
        assert_eq!(decode(&jpeg).unwrap().dimensions(), (6, 4));
    }
}
