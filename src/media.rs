//! Media files and intake validation.
//!
//! A [`MediaFile`] is the in-memory equivalent of a picked or
//! camera-captured file. [`validate_media`] applies the client-side type and
//! size policy before anything is sent to the backend.

use std::fmt;
use std::path::Path;

/// Maximum accepted upload size (50 MiB), matching the backend limit.
pub const MAX_UPLOAD_BYTES: u64 = 50 * 1024 * 1024;

/// Container extensions accepted even when the declared type is wrong.
///
/// Animated GIFs in particular are often reported with an empty or generic type.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov", "mkv", "webm", "gif"];

const ACCEPTED_TYPE_PREFIXES: &[&str] = &["image/", "video/"];

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// Where a candidate file came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntakeSource {
    FilePicker,
    Camera,
}

impl fmt::Display for IntakeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntakeSource::FilePicker => write!(f, "file picker"),
            IntakeSource::Camera => write!(f, "camera"),
        }
    }
}

/// A named blob with a declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct MediaFile {
    name: String,
    mime_type: String,
    bytes: Vec<u8>,
}

impl fmt::Debug for MediaFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl MediaFile {
    /// Create a media file from memory.
    ///
    /// An empty `mime_type` is replaced by `application/octet-stream`.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        let mime_type = mime_type.into();
        let mime_type = if mime_type.trim().is_empty() {
            FALLBACK_MIME_TYPE.to_string()
        } else {
            mime_type
        };
        Self {
            name: name.into(),
            mime_type,
            bytes,
        }
    }

    /// Read a file from disk, guessing its type from the extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let mime_type = mime_type_for_name(&name);
        Ok(Self::new(name, mime_type, bytes))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// Lower-cased extension of the file name, if any.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
    }

    /// Whether the name ends in a known video container extension.
    pub fn has_video_extension(&self) -> bool {
        self.extension()
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()))
    }
}

/// Guess a media type from a file name.
pub fn mime_type_for_name(name: &str) -> &'static str {
    let ext = Path::new(name)
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        _ => FALLBACK_MIME_TYPE,
    }
}

/// Reasons a candidate file is rejected before upload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please select an image or video file ('{name}' is {mime_type})")]
    UnsupportedType { name: String, mime_type: String },

    #[error("File too large. Maximum {}MB allowed.", MAX_UPLOAD_BYTES / (1024 * 1024))]
    TooLarge { size: u64 },
}

/// Check a file against the intake policy.
///
/// Accepts `image/*` and `video/*` types, plus any file whose name ends in a
/// [`VIDEO_EXTENSIONS`] entry. Rejects anything over [`MAX_UPLOAD_BYTES`].
pub fn validate_media(file: &MediaFile) -> Result<(), ValidationError> {
    let mime = file.mime_type().to_ascii_lowercase();
    let type_ok = ACCEPTED_TYPE_PREFIXES
        .iter()
        .any(|prefix| mime.starts_with(prefix));

    if !type_ok && !file.has_video_extension() {
        return Err(ValidationError::UnsupportedType {
            name: file.name().to_string(),
            mime_type: file.mime_type().to_string(),
        });
    }

    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ValidationError::TooLarge { size: file.size() });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_image_and_video_types() {
        let jpeg = MediaFile::new("photo.jpg", "image/jpeg", vec![0; 16]);
        let mp4 = MediaFile::new("clip.mp4", "video/mp4", vec![0; 16]);
        assert!(validate_media(&jpeg).is_ok());
        assert!(validate_media(&mp4).is_ok());
    }

    #[test]
    fn test_accepts_misreported_gif_by_extension() {
        let gif = MediaFile::new("Party.GIF", "application/octet-stream", vec![0; 16]);
        assert!(validate_media(&gif).is_ok());
    }

    #[test]
    fn test_rejects_other_types() {
        let pdf = MediaFile::new("doc.pdf", "application/pdf", vec![0; 16]);
        let err = validate_media(&pdf).unwrap_err();
        assert!(matches!(err, ValidationError::UnsupportedType { .. }));
        assert!(err.to_string().contains("image or video"));
    }

    #[test]
    fn test_size_limit_is_inclusive() {
        let at_limit = MediaFile::new("a.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize]);
        assert!(validate_media(&at_limit).is_ok());

        let over = MediaFile::new("b.png", "image/png", vec![0; MAX_UPLOAD_BYTES as usize + 1]);
        assert_eq!(
            validate_media(&over),
            Err(ValidationError::TooLarge {
                size: MAX_UPLOAD_BYTES + 1
            })
        );
    }

    #[test]
    fn test_too_large_message() {
        let err = ValidationError::TooLarge { size: 1 };
        assert_eq!(err.to_string(), "File too large. Maximum 50MB allowed.");
    }

    #[test]
    fn test_empty_mime_falls_back() {
        let file = MediaFile::new("x.bin", "", vec![]);
        assert_eq!(file.mime_type(), "application/octet-stream");
    }

    #[test]
    fn test_mime_type_for_name() {
        assert_eq!(mime_type_for_name("a.JPG"), "image/jpeg");
        assert_eq!(mime_type_for_name("b.mov"), "video/quicktime");
        assert_eq!(mime_type_for_name("c.webm"), "video/webm");
        assert_eq!(mime_type_for_name("noext"), "application/octet-stream");
    }

    #[test]
    fn test_from_path_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("still.png");
        std::fs::write(&path, [1u8, 2, 3]).unwrap();

        let file = MediaFile::from_path(&path).unwrap();
        assert_eq!(file.name(), "still.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), 3);
    }

    #[test]
    fn test_intake_source_display() {
        assert_eq!(IntakeSource::FilePicker.to_string(), "file picker");
        assert_eq!(IntakeSource::Camera.to_string(), "camera");
    }
}
