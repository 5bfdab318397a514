//! StyleClient - handles communication with the style conversion backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use super::backend::{Backend, ConvertedMedia, DeleteAck, UploadResponse};
use super::error::{ApiError, ConversionError, DELETE_FAILED_MESSAGE, UPLOAD_FAILED_MESSAGE};
use crate::media::MediaFile;

/// The environment variable that overrides the backend origin.
pub const STYLE_API_URL_ENV: &str = "STYLE_API_URL";

/// Default backend origin.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Default client-side bound on a single conversion (5 minutes).
pub const DEFAULT_CONVERT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default connection timeout (10 seconds).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Response from the styles endpoint.
#[derive(Debug, Deserialize)]
struct StylesResponse {
    styles: Vec<String>,
}

/// FastAPI-style error body.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Extract the `detail` message from an error body.
///
/// Returns `None` for non-JSON bodies (HTML error pages, empty bodies) and
/// for JSON without a usable detail. Non-string details (validation error
/// lists) are rendered as compact JSON.
fn parse_detail(body: &str) -> Option<String> {
    let parsed: ErrorBody = serde_json::from_str(body).ok()?;
    match parsed.detail? {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => (!s.trim().is_empty()).then_some(s),
        other => Some(other.to_string()),
    }
}

fn is_media_content_type(content_type: &str) -> bool {
    let lower = content_type.trim().to_ascii_lowercase();
    lower.starts_with("image/") || lower.starts_with("video/")
}

fn classify_transport_error(error: reqwest::Error) -> ConversionError {
    if error.is_timeout() {
        ConversionError::Timeout
    } else {
        ConversionError::Network(error.to_string())
    }
}

/// Client for the style conversion HTTP API.
pub struct StyleClient {
    base_url: String,
    convert_timeout: Duration,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for StyleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StyleClient")
            .field("base_url", &self.base_url)
            .field("convert_timeout", &self.convert_timeout)
            .finish_non_exhaustive()
    }
}

impl StyleClient {
    /// Create a client for the origin in `STYLE_API_URL`, or the default
    /// local origin when the variable is unset.
    pub fn new() -> Result<Self, ApiError> {
        let base_url =
            std::env::var(STYLE_API_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    /// Create a client for an explicit origin.
    ///
    /// Useful for testing against a mock server.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, DEFAULT_CONVERT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    /// Create a client with custom conversion and connection timeouts.
    pub fn with_timeouts(
        base_url: impl Into<String>,
        convert_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self, ApiError> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ApiError::MissingBaseUrl);
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(ApiError::Client)?;

        Ok(Self {
            base_url,
            convert_timeout,
            http_client,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get the conversion timeout.
    pub fn convert_timeout(&self) -> Duration {
        self.convert_timeout
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl Backend for StyleClient {
    async fn list_styles(&self) -> Result<Vec<String>, ApiError> {
        let response = self
            .http_client
            .get(self.url("/api/styles"))
            .send()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ApiError::Fetch(format!("HTTP {}", response.status())));
        }

        let body: StylesResponse = response
            .json()
            .await
            .map_err(|e| ApiError::Fetch(e.to_string()))?;
        Ok(body.styles)
    }

    async fn upload_media(&self, file: &MediaFile) -> Result<UploadResponse, ApiError> {
        let part = Part::bytes(file.bytes().to_vec())
            .file_name(file.name().to_string())
            .mime_str(file.mime_type())
            .map_err(|e| ApiError::Upload(format!("{}: {}", UPLOAD_FAILED_MESSAGE, e)))?;
        let form = Form::new().part("file", part);

        let response = self
            .http_client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ApiError::Upload(format!("{}: {}", UPLOAD_FAILED_MESSAGE, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_detail(&body).unwrap_or_else(|| UPLOAD_FAILED_MESSAGE.to_string());
            log::warn!("Upload of '{}' rejected with {}: {}", file.name(), status, message);
            return Err(ApiError::Upload(message));
        }

        response
            .json::<UploadResponse>()
            .await
            .map_err(|e| ApiError::Upload(format!("Invalid upload response: {}", e)))
    }

    async fn convert_style(
        &self,
        media_id: &str,
        style: &str,
    ) -> Result<ConvertedMedia, ApiError> {
        let form = Form::new()
            .text("media_id", media_id.to_string())
            .text("style", style.to_string());

        let response = self
            .http_client
            .post(self.url("/api/convert"))
            .multipart(form)
            .timeout(self.convert_timeout)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = match parse_detail(&body) {
                Some(detail) => ConversionError::Detail(detail),
                None => ConversionError::Server {
                    status: status.as_u16(),
                },
            };
            log::error!("Conversion of {} to '{}' failed with {}", media_id, style, status);
            return Err(error.into());
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !is_media_content_type(&content_type) {
            return Err(ConversionError::UnexpectedResponse { content_type }.into());
        }

        let bytes = response.bytes().await.map_err(classify_transport_error)?;
        Ok(ConvertedMedia {
            bytes: bytes.to_vec(),
            content_type,
        })
    }

    async fn delete_media(&self, media_id: &str) -> Result<DeleteAck, ApiError> {
        let response = self
            .http_client
            .delete(self.url(&format!("/api/delete/{}", media_id)))
            .send()
            .await
            .map_err(|e| ApiError::Delete(format!("{}: {}", DELETE_FAILED_MESSAGE, e)))?;

        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = parse_detail(&body).unwrap_or_else(|| DELETE_FAILED_MESSAGE.to_string());
            return Err(ApiError::Delete(message));
        }

        // A success with an unexpected body is still a successful delete.
        Ok(response.json::<DeleteAck>().await.unwrap_or_default())
    }
}
