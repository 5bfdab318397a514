//! Live camera preview redrawn in place on the terminal.

use std::io::{self, Write};

use crate::ascii;
use crate::camera::Frame;

const HIDE_CURSOR: &str = "\x1b[?25l";
const SHOW_CURSOR: &str = "\x1b[?25h";

/// Draws each preview frame over the previous one.
#[derive(Debug)]
pub struct TerminalPreview {
    columns: u16,
    max_rows: u16,
    drawn_rows: usize,
    started: bool,
}

impl TerminalPreview {
    /// A preview `columns` characters wide. Zero draws nothing.
    pub fn new(columns: u16) -> Self {
        Self {
            columns,
            max_rows: columns,
            drawn_rows: 0,
            started: false,
        }
    }

    /// A preview that draws nothing.
    pub fn disabled() -> Self {
        Self::new(0)
    }

    pub fn is_enabled(&self) -> bool {
        self.columns > 0
    }

    /// Draw `frame`, replacing the one drawn before it.
    pub fn draw<W: Write>(&mut self, out: &mut W, frame: &Frame) -> io::Result<()> {
        if !self.is_enabled() {
            return Ok(());
        }
        let text = ascii::render_frame(frame, self.columns, self.max_rows);

        let mut output = String::with_capacity(text.len() + 16);
        if !self.started {
            output.push_str(HIDE_CURSOR);
            self.started = true;
        } else if self.drawn_rows > 0 {
            // Back to the first line of the previous frame.
            output.push_str(&format!("\x1b[{}F", self.drawn_rows));
        }
        output.push_str(&text);
        self.drawn_rows = text.lines().count();

        out.write_all(output.as_bytes())?;
        out.flush()
    }

    /// Restore the cursor. The last frame stays on screen.
    pub fn finish<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.started {
            return Ok(());
        }
        self.started = false;
        self.drawn_rows = 0;
        out.write_all(SHOW_CURSOR.as_bytes())?;
        out.flush()
    }
}
