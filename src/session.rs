//! Session state machine.
//!
//! A [`Session`] is the single record of the media currently being worked
//! on. All transitions are synchronous and free of I/O so they can be driven
//! and tested without a backend; the workflow controller performs the I/O
//! and feeds the results back in.
//!
//! Every reset and every conversion request bumps a generation counter.
//! Results carry the generation they were requested under and are dropped
//! when it is no longer current, so a slow response can never overwrite a
//! newer one or resurrect removed media.

use std::path::{Path, PathBuf};

use crate::api::{ConvertedMedia, UploadResponse};
use crate::compare::Comparison;
use crate::data_url::DataUrl;

/// Intensity of a fresh styled result.
pub const DEFAULT_INTENSITY: u8 = 100;

/// Placeholder shown where the styled result would be after a failure.
pub const CONVERSION_FAILED_PLACEHOLDER: &str = "Conversion failed. Try again.";

/// Transitions the current state does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Please upload an image or video first")]
    NoMedia,

    #[error("Intensity and comparison are only available for images")]
    VideoSession,

    #[error("Apply a style first")]
    NoStyledImage,
}

/// The styled output currently held by the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StyledResult {
    Image {
        /// Converted image as returned by the backend.
        styled: DataUrl,
        /// Current blend of original and styled, once computed.
        blended: Option<DataUrl>,
    },
    Video {
        blob: ConvertedMedia,
    },
}

/// Identifies one conversion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionTicket {
    pub generation: u64,
    pub media_id: String,
    pub style: String,
    pub is_video: bool,
}

/// Everything needed to compute a blend outside the session.
#[derive(Debug, Clone)]
pub struct BlendInputs {
    pub generation: u64,
    pub intensity: u8,
    pub original: Vec<u8>,
    pub styled: Vec<u8>,
}

/// A file ready to be saved.
#[derive(Clone, PartialEq, Eq)]
pub struct Download {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Download {
    /// The file as a `data:` URL.
    pub fn to_data_url(&self) -> DataUrl {
        DataUrl::new(self.mime_type.clone(), self.bytes.clone())
    }

    /// Write into `dir`, creating it if needed. Returns the written path.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    media_id: Option<String>,
    is_video: bool,
    original: Option<DataUrl>,
    styled: Option<StyledResult>,
    intensity: u8,
    active_style: Option<String>,
    pending: Option<u64>,
    failure: Option<&'static str>,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            media_id: None,
            is_video: false,
            original: None,
            styled: None,
            intensity: DEFAULT_INTENSITY,
            active_style: None,
            pending: None,
            failure: None,
            generation: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_id(&self) -> Option<&str> {
        self.media_id.as_deref()
    }

    pub fn is_video(&self) -> bool {
        self.is_video
    }

    pub fn original(&self) -> Option<&DataUrl> {
        self.original.as_ref()
    }

    pub fn styled(&self) -> Option<&StyledResult> {
        self.styled.as_ref()
    }

    pub fn intensity(&self) -> u8 {
        self.intensity
    }

    pub fn active_style(&self) -> Option<&str> {
        self.active_style.as_deref()
    }

    /// Whether a conversion for the current generation is in flight.
    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn failure(&self) -> Option<&'static str> {
        self.failure
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// The blended image currently on display, if any.
    pub fn blended(&self) -> Option<&DataUrl> {
        match &self.styled {
            Some(StyledResult::Image { blended, .. }) => blended.as_ref(),
            _ => None,
        }
    }

    /// Drop everything and start a new generation.
    ///
    /// Returns the media identifier that was current, so the caller can
    /// release it on the backend.
    pub fn reset(&mut self) -> Option<String> {
        let previous = self.media_id.take();
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
        previous
    }

    /// Record a successful upload made under `generation`.
    ///
    /// Returns `false` (and changes nothing) when the session moved on while
    /// the upload was in flight.
    pub fn accept_upload(
        &mut self,
        generation: u64,
        response: &UploadResponse,
        original: DataUrl,
    ) -> bool {
        if generation != self.generation {
            return false;
        }
        self.media_id = Some(response.media_id.clone());
        self.is_video = response.is_video;
        self.original = Some(original);
        true
    }

    /// Start a conversion to `style`.
    ///
    /// The previous result stays available until the new one arrives.
    pub fn begin_conversion(&mut self, style: &str) -> Result<ConversionTicket, SessionError> {
        let media_id = self.media_id.clone().ok_or(SessionError::NoMedia)?;

        self.generation += 1;
        self.active_style = Some(style.to_string());
        self.pending = Some(self.generation);
        self.failure = None;

        Ok(ConversionTicket {
            generation: self.generation,
            media_id,
            style: style.to_string(),
            is_video: self.is_video,
        })
    }

    /// Whether results for `ticket` should still be applied.
    pub fn is_current(&self, ticket: &ConversionTicket) -> bool {
        ticket.generation == self.generation
            && self.media_id.as_deref() == Some(ticket.media_id.as_str())
    }

    /// Apply a conversion result. Returns `false` for superseded tickets.
    pub fn complete_conversion(&mut self, ticket: &ConversionTicket, result: ConvertedMedia) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        self.failure = None;
        if self.is_video {
            self.styled = Some(StyledResult::Video { blob: result });
        } else {
            self.intensity = DEFAULT_INTENSITY;
            self.styled = Some(StyledResult::Image {
                styled: DataUrl::new(result.content_type, result.bytes),
                blended: None,
            });
        }
        true
    }

    /// Record a failed conversion. Returns `false` for superseded tickets.
    pub fn fail_conversion(&mut self, ticket: &ConversionTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.pending = None;
        self.styled = None;
        self.failure = Some(CONVERSION_FAILED_PLACEHOLDER);
        true
    }

    /// Drop a fresh styled image whose first blend could not be produced.
    ///
    /// Returns `false` when the session moved on or a blend already exists.
    pub fn fail_blend(&mut self, generation: u64) -> bool {
        if generation != self.generation {
            return false;
        }
        if !matches!(self.styled, Some(StyledResult::Image { blended: None, .. })) {
            return false;
        }
        self.styled = None;
        self.failure = Some(CONVERSION_FAILED_PLACEHOLDER);
        true
    }

    /// Set the blend intensity (clamped to 100). Images with a styled result only.
    pub fn set_intensity(&mut self, percent: u8) -> Result<u8, SessionError> {
        self.require_styled_image()?;
        self.intensity = percent.min(100);
        Ok(self.intensity)
    }

    /// Snapshot the sources for a blend at the current intensity.
    pub fn blend_inputs(&self) -> Result<BlendInputs, SessionError> {
        let styled = self.require_styled_image()?;
        let original = self.original.as_ref().ok_or(SessionError::NoMedia)?;
        Ok(BlendInputs {
            generation: self.generation,
            intensity: self.intensity,
            original: original.data().to_vec(),
            styled: styled.data().to_vec(),
        })
    }

    /// Store a computed blend. Dropped when the session or intensity moved on.
    pub fn store_blend(&mut self, generation: u64, intensity: u8, result: DataUrl) -> bool {
        if generation != self.generation || intensity != self.intensity {
            return false;
        }
        match &mut self.styled {
            Some(StyledResult::Image { blended, .. }) => {
                *blended = Some(result);
                true
            }
            _ => false,
        }
    }

    /// Open a comparison of the current blend against the original.
    pub fn comparison(&self) -> Result<Comparison, SessionError> {
        self.require_styled_image()?;
        let original = self.original.clone().ok_or(SessionError::NoMedia)?;
        let blended = self.blended().cloned().ok_or(SessionError::NoStyledImage)?;
        Ok(Comparison::new(blended, original))
    }

    /// The file a download would produce right now.
    pub fn download(&self) -> Option<Download> {
        match self.styled.as_ref()? {
            StyledResult::Video { blob } => {
                let ext = if blob.content_type.contains("gif") {
                    "gif"
                } else {
                    "mp4"
                };
                Some(Download {
                    file_name: format!("styled-video.{}", ext),
                    mime_type: blob.content_type.clone(),
                    bytes: blob.bytes.clone(),
                })
            }
            StyledResult::Image { blended, .. } => {
                let blended = blended.as_ref()?;
                Some(Download {
                    file_name: "styled-image.jpg".to_string(),
                    mime_type: blended.mime_type().to_string(),
                    bytes: blended.data().to_vec(),
                })
            }
        }
    }

    fn require_styled_image(&self) -> Result<&DataUrl, SessionError> {
        if self.media_id.is_none() {
            return Err(SessionError::NoMedia);
        }
        if self.is_video {
            return Err(SessionError::VideoSession);
        }
        match &self.styled {
            Some(StyledResult::Image { styled, .. }) => Ok(styled),
            _ => Err(SessionError::NoStyledImage),
        }
    }
}
