//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;
mod preview;

pub use args::{Args, Command, ConfigAction, OutputArgs};
pub use commands::{
    capture_and_convert, convert_file, ensure_style_available, handle_config_action, list_styles,
    run_preview, until_cancelled, CommandError, Context, TerminalObserver,
    CANCELLED_MESSAGE, CAPTURE_CANCELLED_MESSAGE, COMPARISON_FILE_NAME,
};
pub use enums::Category;
pub use preview::TerminalPreview;
