//! CLI argument parsing with clap.

use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

use super::enums::Category;

/// Parse and validate a percentage (0-100)
fn parse_percent(s: &str) -> Result<u8, String> {
    let pct: u8 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid percentage", s))?;
    if pct > 100 {
        return Err(format!("Percentage must be between 0 and 100, got {}", pct));
    }
    Ok(pct)
}

/// Apply artistic styles to images and videos through a style conversion server
#[derive(Parser, Debug)]
#[command(name = "style-converter")]
#[command(version, about = "Apply artistic styles to images and videos", long_about = None)]
#[command(after_help = "EXAMPLES:
    # List anime styles
    style-converter styles --category anime

    # Sepia at 40% intensity, with a before/after comparison
    style-converter convert photo.jpg --style sepia --intensity 40 --compare 50

    # Snapshot the webcam and convert it
    style-converter capture --style candy --camera 1")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Server origin (overrides STYLE_API_URL and the config file)
    #[arg(long, global = true)]
    pub server: Option<String>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available styles
    Styles {
        /// Only show one category
        #[arg(long, default_value = "all")]
        category: Category,
    },
    /// Upload a file, apply a style and save the result
    Convert {
        /// Image or video to convert
        file: PathBuf,

        /// Style to apply (see `styles`)
        #[arg(long, short)]
        style: String,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Snapshot the camera, apply a style and save the result
    Capture {
        /// Style to apply (see `styles`)
        #[arg(long, short)]
        style: String,

        /// Camera device index (overrides the config file)
        #[arg(long)]
        camera: Option<u32>,

        /// Do not mirror the snapshot
        #[arg(long)]
        no_mirror: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Options shared by `convert` and `capture`.
#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    /// Blend intensity for images (0 = original, 100 = fully styled)
    #[arg(long, short, default_value = "100", value_parser = parse_percent)]
    pub intensity: u8,

    /// Also save a before/after comparison split at this percentage
    #[arg(long, value_parser = parse_percent)]
    pub compare: Option<u8>,

    /// Output directory (overrides the config file)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Leave the uploaded media on the server
    #[arg(long)]
    pub keep_remote: bool,

    /// Print results to stdout as data: URLs instead of writing files
    #[arg(long)]
    pub data_url: bool,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}
