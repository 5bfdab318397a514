//! Unit and mock HTTP tests for StyleClient.
//!
//! These tests cover:
//! - Client creation and configuration
//! - Request formatting for the four endpoints
//! - Error message normalization
//! - Conversion timeouts

use std::time::Duration;

use style_converter::api::{
    ApiError, Backend, ConversionError, StyleClient, DEFAULT_CONVERT_TIMEOUT,
    DELETE_FAILED_MESSAGE, PROCESSING_TIMEOUT_MESSAGE, UPLOAD_FAILED_MESSAGE,
};
use style_converter::media::MediaFile;

// === Client Creation Tests ===

#[test]
fn test_with_base_url_trims_trailing_slash() {
    let client = StyleClient::with_base_url("http://localhost:8000/").unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000");
    assert_eq!(client.convert_timeout(), DEFAULT_CONVERT_TIMEOUT);
}

#[test]
fn test_with_base_url_empty_returns_error() {
    let result = StyleClient::with_base_url("  ");
    assert!(matches!(result, Err(ApiError::MissingBaseUrl)));
}

#[test]
fn test_with_timeouts() {
    let client = StyleClient::with_timeouts(
        "http://gpu-box:8000",
        Duration::from_secs(30),
        Duration::from_secs(2),
    )
    .unwrap();
    assert_eq!(client.convert_timeout(), Duration::from_secs(30));
}

// === Mock HTTP Server Tests ===

mod mock_http_tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn photo() -> MediaFile {
        MediaFile::new("photo.png", "image/png", vec![0x89, b'P', b'N', b'G'])
    }

    // --- styles ---

    #[tokio::test]
    async fn test_list_styles_returns_backend_order() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/styles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "styles": ["sepia", "candy", "hayao"]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let styles = client.list_styles().await.unwrap();
        assert_eq!(styles, vec!["sepia", "candy", "hayao"]);
    }

    #[tokio::test]
    async fn test_list_styles_server_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/styles"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.list_styles().await.unwrap_err();
        assert!(matches!(err, ApiError::Fetch(_)));
        assert!(err.to_string().starts_with("Failed to fetch styles"));
    }

    // --- upload ---

    #[tokio::test]
    async fn test_upload_sends_multipart_file_field() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .and(body_string_contains("name=\"file\""))
            .and(body_string_contains("filename=\"photo.png\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "media_id": "abc123",
                "is_video": false,
                "filename": "abc123.png"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let response = client.upload_media(&photo()).await.unwrap();
        assert_eq!(response.media_id, "abc123");
        assert!(!response.is_video);
    }

    #[tokio::test]
    async fn test_upload_reports_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
                "detail": "Unsupported file type"
            })))
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.upload_media(&photo()).await.unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type");
    }

    #[tokio::test]
    async fn test_upload_non_json_error_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/upload"))
            .respond_with(
                ResponseTemplate::new(502).set_body_raw("<html>Bad Gateway</html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.upload_media(&photo()).await.unwrap_err();
        assert_eq!(err.to_string(), UPLOAD_FAILED_MESSAGE);
    }

    // --- convert ---

    #[tokio::test]
    async fn test_convert_returns_bytes_and_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .and(body_string_contains("name=\"media_id\""))
            .and(body_string_contains("abc123"))
            .and(body_string_contains("name=\"style\""))
            .and(body_string_contains("sepia"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0xff, 0xd8, 0xff, 0xd9], "image/jpeg"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let converted = client.convert_style("abc123", "sepia").await.unwrap();
        assert_eq!(converted.bytes, vec![0xff, 0xd8, 0xff, 0xd9]);
        assert_eq!(converted.content_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_convert_html_error_mentions_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_raw("<html>Internal Server Error</html>", "text/html"),
            )
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.convert_style("abc123", "sepia").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Conversion(ConversionError::Server { status: 500 })
        ));
        assert!(err.to_string().contains("500"));
        assert!(!err.to_string().contains("html"));
    }

    #[tokio::test]
    async fn test_convert_reports_detail() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "detail": "Media not found"
            })))
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.convert_style("gone", "sepia").await.unwrap_err();
        assert_eq!(err.to_string(), "Media not found");
    }

    #[tokio::test]
    async fn test_convert_rejects_non_media_content_type() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "ok"})),
            )
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.convert_style("abc123", "sepia").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Conversion(ConversionError::UnexpectedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_convert_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/convert"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw(vec![1, 2, 3], "video/mp4")
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_timeouts(
            mock_server.uri(),
            Duration::from_millis(50),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = client.convert_style("clip", "hayao").await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), PROCESSING_TIMEOUT_MESSAGE);
    }

    #[tokio::test]
    async fn test_convert_unreachable_server_is_network_error() {
        let client = StyleClient::with_base_url("http://127.0.0.1:9").unwrap();
        let err = client.convert_style("abc123", "sepia").await.unwrap_err();
        assert!(matches!(
            err,
            ApiError::Conversion(ConversionError::Network(_))
        ));
    }

    // --- delete ---

    #[tokio::test]
    async fn test_delete_sends_media_id_in_path() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/delete/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "message": "Media deleted successfully"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let ack = client.delete_media("abc123").await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("Media deleted successfully"));
    }

    #[tokio::test]
    async fn test_delete_failure_uses_fallback() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/api/delete/abc123"))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .mount(&mock_server)
            .await;

        let client = StyleClient::with_base_url(mock_server.uri()).unwrap();
        let err = client.delete_media("abc123").await.unwrap_err();
        assert!(matches!(err, ApiError::Delete(_)));
        assert_eq!(err.to_string(), DELETE_FAILED_MESSAGE);
    }
}
