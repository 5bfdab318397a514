//! The backend seam consumed by the workflow controller.

use async_trait::async_trait;
use serde::Deserialize;

use super::error::ApiError;
use crate::media::MediaFile;

/// Response body of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadResponse {
    /// Opaque identifier issued by the backend.
    pub media_id: String,
    /// Whether the backend classified the upload as a video.
    #[serde(default)]
    pub is_video: bool,
}

/// Raw result of a style conversion.
#[derive(Clone, PartialEq, Eq)]
pub struct ConvertedMedia {
    pub bytes: Vec<u8>,
    /// Declared `Content-Type`, always `image/*` or `video/*`.
    pub content_type: String,
}

impl std::fmt::Debug for ConvertedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertedMedia")
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Acknowledgement of a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DeleteAck {
    #[serde(default)]
    pub message: Option<String>,
}

/// Remote operations offered by the style conversion service.
#[async_trait]
pub trait Backend: Send + Sync {
    /// List the style identifiers, in backend order.
    async fn list_styles(&self) -> Result<Vec<String>, ApiError>;

    /// Upload a media file and obtain its identifier.
    async fn upload_media(&self, file: &MediaFile) -> Result<UploadResponse, ApiError>;

    /// Convert previously uploaded media to the given style.
    async fn convert_style(&self, media_id: &str, style: &str)
        -> Result<ConvertedMedia, ApiError>;

    /// Delete previously uploaded media.
    async fn delete_media(&self, media_id: &str) -> Result<DeleteAck, ApiError>;
}
