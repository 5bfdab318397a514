//! Base64 data URLs for locally held media.

use std::fmt;

use base64::Engine;

use crate::media::MediaFile;

/// An in-memory payload that renders as a `data:<mime>;base64,<payload>` URL.
///
/// The CLI prints this form with `--data-url`.
#[derive(Clone, PartialEq, Eq)]
pub struct DataUrl {
    mime_type: String,
    data: Vec<u8>,
}

impl fmt::Debug for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataUrl")
            .field("mime_type", &self.mime_type)
            .field("len", &self.data.len())
            .finish()
    }
}

impl DataUrl {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data,
        }
    }

    /// Read a media file as a data URL.
    pub fn from_media(file: &MediaFile) -> Self {
        Self::new(file.mime_type(), file.bytes().to_vec())
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

}

impl fmt::Display for DataUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "data:{};base64,{}",
            self.mime_type,
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}
