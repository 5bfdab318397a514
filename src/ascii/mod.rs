//! ASCII rendering of camera frames for the terminal preview.
//!
//! A frame is reduced to one luminance value per character cell
//! ([`luminance_grid`]), sized so the picture keeps its proportions on a
//! terminal ([`cell_grid`]), and each cell is drawn with a character from a
//! density ramp ([`shade`]).

mod grid;
mod ramp;

pub use grid::{cell_grid, luminance_grid, CHAR_ASPECT_RATIO};
pub use ramp::{shade, DENSITY_RAMP};

use crate::camera::Frame;

/// Render `frame` as text at most `max_columns` wide and `max_rows` tall.
///
/// Every row ends with a newline. Empty when nothing fits.
pub fn render_frame(frame: &Frame, max_columns: u16, max_rows: u16) -> String {
    let (columns, rows) = cell_grid(frame.width, frame.height, max_columns, max_rows);
    if columns == 0 || rows == 0 {
        return String::new();
    }

    let cells = luminance_grid(frame, columns, rows);
    let mut text = String::with_capacity(cells.len() + rows as usize);
    for row in cells.chunks(columns as usize) {
        text.extend(row.iter().map(|&luma| shade(luma)));
        text.push('\n');
    }
    text
}
