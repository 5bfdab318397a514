//! Error types for backend operations.
//!
//! Every remote call normalizes its failure into an [`ApiError`] that carries
//! a human-readable message suitable for showing to the user as-is.

/// Message used when a conversion exceeds the client-side timeout.
pub const PROCESSING_TIMEOUT_MESSAGE: &str =
    "Processing timeout: the conversion took longer than 5 minutes. Try a shorter video or a smaller image.";

/// Fallback message for upload failures without a parseable detail.
pub const UPLOAD_FAILED_MESSAGE: &str = "Upload failed";

/// Fallback message for delete failures without a parseable detail.
pub const DELETE_FAILED_MESSAGE: &str = "Delete failed";

/// Errors returned by the style conversion backend.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Backend URL not configured")]
    MissingBaseUrl,

    #[error("HTTP client setup failed: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Failed to fetch styles: {0}")]
    Fetch(String),

    #[error("{0}")]
    Upload(String),

    #[error(transparent)]
    Conversion(#[from] ConversionError),

    #[error("{0}")]
    Delete(String),
}

impl ApiError {
    /// Whether this error is a conversion that ran past the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ApiError::Conversion(ConversionError::Timeout))
    }
}

/// The ways a style conversion can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// The backend returned a structured `{detail}` body.
    #[error("{0}")]
    Detail(String),

    /// The backend failed without a structured body (e.g. an HTML error page).
    #[error("Server error (HTTP {status}): the server could not process this media. Please try again.")]
    Server {
        /// HTTP status code of the failed response
        status: u16,
    },

    #[error("{}", PROCESSING_TIMEOUT_MESSAGE)]
    Timeout,

    /// A success status whose body is neither an image nor a video.
    #[error("Unexpected response from server (content type: {content_type})")]
    UnexpectedResponse {
        /// The declared `Content-Type`, empty when missing
        content_type: String,
    },

    #[error("Network error: {0}")]
    Network(String),
}
