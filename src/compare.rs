//! Before/after comparison with a movable divider.

use image::RgbImage;

use crate::blend::{self, BlendError};
use crate::data_url::DataUrl;

/// Divider position when a comparison opens.
pub const DEFAULT_DIVIDER: u8 = 50;

/// Split-reveal view: the current blended result covers the left
/// `divider` percent and the original shows through on the right.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    blended: DataUrl,
    original: DataUrl,
    divider: u8,
}

impl Comparison {
    pub fn new(blended: DataUrl, original: DataUrl) -> Self {
        Self {
            blended,
            original,
            divider: DEFAULT_DIVIDER,
        }
    }

    pub fn blended(&self) -> &DataUrl {
        &self.blended
    }

    pub fn original(&self) -> &DataUrl {
        &self.original
    }

    pub fn divider(&self) -> u8 {
        self.divider
    }

    /// Move the divider, clamped to 0–100.
    pub fn set_divider(&mut self, percent: u8) {
        self.divider = percent.min(100);
    }

    /// Render the split view at the blended result's size.
    pub fn render(&self) -> Result<RgbImage, BlendError> {
        let blended = blend::decode(self.blended.data()).map_err(|source| BlendError::Decode {
            which: "blended",
            source,
        })?;
        let original = blend::decode(self.original.data()).map_err(|source| BlendError::Decode {
            which: "original",
            source,
        })?;

        let (width, height) = blended.dimensions();
        let original = blend::fit_to(&original, width, height);
        let split = split_column(width, self.divider);

        Ok(RgbImage::from_fn(width, height, |x, y| {
            if x < split {
                *blended.get_pixel(x, y)
            } else {
                *original.get_pixel(x, y)
            }
        }))
    }
}

/// First column that shows the original.
fn split_column(width: u32, divider: u8) -> u32 {
    (u64::from(width) * u64::from(divider.min(100)) / 100) as u32
}
