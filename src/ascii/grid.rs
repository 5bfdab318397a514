//! Character-cell geometry and per-cell luminance.

use crate::camera::Frame;

/// Terminal cells are roughly twice as tall as they are wide.
pub const CHAR_ASPECT_RATIO: f32 = 2.0;

/// Largest grid within `max_columns` x `max_rows` that shows a
/// `width` x `height` picture without stretching it.
///
/// Returns `(0, 0)` when either side is empty.
pub fn cell_grid(width: u32, height: u32, max_columns: u16, max_rows: u16) -> (u16, u16) {
    if width == 0 || height == 0 || max_columns == 0 || max_rows == 0 {
        return (0, 0);
    }

    // Columns needed per row for the picture to look right.
    let columns_per_row = width as f32 / height as f32 * CHAR_ASPECT_RATIO;

    let rows = (max_columns as f32 / columns_per_row).round() as u16;
    if rows <= max_rows {
        return (max_columns, rows.max(1));
    }
    let columns = (max_rows as f32 * columns_per_row).round() as u16;
    (columns.clamp(1, max_columns), max_rows)
}

/// Average luminance (ITU-R BT.601) of each cell, row-major.
///
/// The result holds `columns * rows` values. Cells smaller than a pixel
/// repeat the pixel under them.
pub fn luminance_grid(frame: &Frame, columns: u16, rows: u16) -> Vec<u8> {
    let width = frame.width as usize;
    let height = frame.height as usize;
    if columns == 0 || rows == 0 || width == 0 || height == 0 {
        return Vec::new();
    }

    let columns = columns as usize;
    let rows = rows as usize;
    let mut cells = Vec::with_capacity(columns * rows);

    for cy in 0..rows {
        let (y0, y1) = span(cy, rows, height);
        for cx in 0..columns {
            let (x0, x1) = span(cx, columns, width);

            let mut sum = 0u64;
            let mut count = 0u64;
            for y in y0..y1 {
                for x in x0..x1 {
                    let i = (y * width + x) * Frame::BYTES_PER_PIXEL;
                    if let Some(rgb) = frame.data.get(i..i + Frame::BYTES_PER_PIXEL) {
                        sum += u64::from(luma(rgb[0], rgb[1], rgb[2]));
                        count += 1;
                    }
                }
            }
            cells.push(if count == 0 { 0 } else { (sum / count) as u8 });
        }
    }
    cells
}

/// Pixel range under cell `index` of `cells` spread across `pixels`. Never empty.
fn span(index: usize, cells: usize, pixels: usize) -> (usize, usize) {
    let start = index * pixels / cells;
    let end = ((index + 1) * pixels / cells).max(start + 1).min(pixels);
    (start, end)
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    ((299 * u32::from(r) + 587 * u32::from(g) + 114 * u32::from(b)) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_grid_keeps_aspect() {
        // 4:3 at twice-as-tall cells needs 8 columns per 3 rows.
        assert_eq!(cell_grid(640, 480, 80, 80), (80, 30));
        // Height-limited.
        assert_eq!(cell_grid(640, 480, 80, 15), (40, 15));
    }

    #[test]
    fn test_cell_grid_wide_frame_gets_one_row() {
        assert_eq!(cell_grid(1000, 10, 20, 10), (20, 1));
    }

    #[test]
    fn test_cell_grid_empty() {
        assert_eq!(cell_grid(0, 480, 80, 24), (0, 0));
        assert_eq!(cell_grid(640, 480, 0, 24), (0, 0));
    }

    #[test]
    fn test_luma_weights() {
        assert_eq!(luma(255, 255, 255), 255);
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 149);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_luminance_grid_averages_cells() {
        // Left half black, right half white.
        let mut data = Vec::new();
        for _ in 0..2 {
            data.extend_from_slice(&[0, 0, 0, 0, 0, 0, 255, 255, 255, 255, 255, 255]);
        }
        let frame = Frame {
            data,
            width: 4,
            height: 2,
        };
        assert_eq!(luminance_grid(&frame, 2, 1), vec![0, 255]);
        assert_eq!(luminance_grid(&frame, 1, 1), vec![127]);
    }

    #[test]
    fn test_luminance_grid_upscales() {
        let frame = Frame {
            data: vec![200, 200, 200],
            width: 1,
            height: 1,
        };
        assert_eq!(luminance_grid(&frame, 3, 2), vec![200; 6]);
    }
}
