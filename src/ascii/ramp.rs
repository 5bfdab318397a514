//! Brightness to character mapping.

/// Darkest (space) to brightest. Suits dark terminals.
pub const DENSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Character for a luminance value.
pub fn shade(luminance: u8) -> char {
    let index = usize::from(luminance) * (DENSITY_RAMP.len() - 1) / 255;
    DENSITY_RAMP[index]
}
