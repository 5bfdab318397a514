//! Terminal rendering of the session.
//!
//! [`ViewState`] is derived from a [`Session`] and says what would be
//! visible; its `Display` impl and [`style_grid`] produce the text the CLI
//! prints.

use std::fmt;

use crate::session::{Session, StyledResult};
use crate::styles::{self, StyleCategory};

/// What the interface shows for a session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewState {
    /// Original media preview and the "change file" affordance.
    pub preview: bool,
    pub preview_is_video: bool,
    /// Style selection section.
    pub style_section: bool,
    pub remove_button: bool,
    /// Loader over the result area.
    pub loader: bool,
    /// Long-running notice for video conversions.
    pub processing_info: bool,
    /// Failure placeholder in the result area.
    pub placeholder: Option<&'static str>,
    /// A styled image or video is on display.
    pub result: bool,
    /// Intensity control (images only).
    pub intensity_control: bool,
    pub compare_button: bool,
    pub download_button: bool,
    pub add_another_button: bool,
    pub active_style: Option<String>,
    pub intensity: u8,
}

impl ViewState {
    pub fn from_session(session: &Session) -> Self {
        let has_media = session.media_id().is_some();
        let loading = session.is_loading();
        // A previous result stays in the session while a new one loads.
        let styled = if loading { None } else { session.styled() };
        let blended = !loading && session.blended().is_some();
        let downloadable = match styled {
            Some(StyledResult::Video { .. }) => true,
            Some(StyledResult::Image { .. }) => blended,
            None => false,
        };

        Self {
            preview: has_media,
            preview_is_video: has_media && session.is_video(),
            style_section: has_media,
            remove_button: has_media,
            loader: loading,
            processing_info: loading && session.is_video(),
            placeholder: session.failure(),
            result: styled.is_some(),
            intensity_control: matches!(styled, Some(StyledResult::Image { .. })),
            compare_button: blended,
            download_button: downloadable,
            add_another_button: styled.is_some(),
            active_style: session.active_style().map(str::to_string),
            intensity: session.intensity(),
        }
    }
}

impl fmt::Display for ViewState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.preview {
            return writeln!(f, "No media loaded. Upload an image or video to begin.");
        }

        let kind = if self.preview_is_video { "video" } else { "image" };
        writeln!(f, "Media: {} ready", kind)?;

        if let Some(style) = &self.active_style {
            writeln!(
                f,
                "Style: {} {}",
                styles::icon(style),
                styles::display_name(style)
            )?;
        }
        if self.loader {
            writeln!(f, "Converting...")?;
        }
        if self.processing_info {
            writeln!(f, "Video processing can take several minutes.")?;
        }
        if let Some(placeholder) = self.placeholder {
            writeln!(f, "{}", placeholder)?;
        }
        if self.intensity_control {
            writeln!(f, "Intensity: {}%", self.intensity)?;
        }

        let mut actions = Vec::new();
        if self.compare_button {
            actions.push("compare");
        }
        if self.download_button {
            actions.push("download");
        }
        if self.add_another_button {
            actions.push("add another");
        }
        if self.remove_button {
            actions.push("remove");
        }
        if !actions.is_empty() {
            writeln!(f, "Actions: {}", actions.join(", "))?;
        }
        Ok(())
    }
}

/// One line per style in `category`, active style marked with `*`.
///
/// The `All` listing also names each style's category.
pub fn style_grid(styles: &[String], category: StyleCategory, active: Option<&str>) -> String {
    let visible = styles::filter_styles(styles, category);
    if visible.is_empty() {
        return format!("No {} styles available\n", category.label().to_lowercase());
    }

    let width = visible.iter().map(|s| s.len()).max().unwrap_or(0);
    let mut output = String::new();
    for style in &visible {
        let marker = if active == Some(style.as_str()) { '*' } else { ' ' };
        let mut line = format!(
            "{} {} {:<width$}  {}",
            marker,
            styles::icon(style),
            style,
            styles::display_name(style),
            width = width
        );
        if category == StyleCategory::All {
            if let Some(group) = StyleCategory::of(style) {
                line.push_str(&format!(" ({})", group.label()));
            }
        }
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}
