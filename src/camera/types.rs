//! Camera types and data structures.

use std::fmt;

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// High resolution (1280x720) - default for snapshots
    pub const HIGH: Resolution = Resolution {
        width: 1280,
        height: 720,
    };

    /// Bytes in one RGB24 frame at this resolution.
    pub fn frame_len(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HIGH
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A captured camera frame in RGB24.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Raw pixel data, row-major, 3 bytes per pixel
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl Frame {
    pub const BYTES_PER_PIXEL: usize = 3;
}

/// Settings for camera capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
    /// Mirror horizontally (selfie mode)
    pub mirror: bool,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
            mirror: true,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug)]
pub enum CameraError {
    /// The ffmpeg binary is not installed
    FfmpegNotFound,
    /// Failed to open camera
    OpenFailed(String),
    /// Camera permission denied
    PermissionDenied,
    /// Camera device not found at specified index
    DeviceNotFound(u32),
    /// The stream stopped delivering frames
    StreamFailed(String),
    /// `start()` called while already previewing
    AlreadyRunning,
    /// `capture()` called without a live preview
    NotPreviewing,
    /// The snapshot could not be encoded
    EncodeFailed(String),
    /// Camera capture is not supported on this platform
    Unsupported,
}

impl fmt::Display for CameraError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraError::FfmpegNotFound => {
                write!(f, "FFmpeg not found. Install ffmpeg to use the camera.")
            }
            CameraError::OpenFailed(msg) => write!(f, "Failed to open camera: {}", msg),
            CameraError::PermissionDenied => write!(f, "Camera access denied or not available"),
            CameraError::DeviceNotFound(index) => {
                write!(f, "Camera device {} not found", index)
            }
            CameraError::StreamFailed(msg) => write!(f, "Camera stream failed: {}", msg),
            CameraError::AlreadyRunning => write!(f, "Camera preview is already running"),
            CameraError::NotPreviewing => write!(f, "Camera preview is not running"),
            CameraError::EncodeFailed(msg) => write!(f, "Failed to encode snapshot: {}", msg),
            CameraError::Unsupported => {
                write!(f, "Camera capture is not supported on this platform")
            }
        }
    }
}

impl std::error::Error for CameraError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolution_default() {
        assert_eq!(Resolution::default(), Resolution::HIGH);
        assert_eq!(Resolution::HIGH.to_string(), "1280x720");
    }

    #[test]
    fn test_frame_len() {
        assert_eq!(Resolution::HIGH.frame_len(), 1280 * 720 * 3);
    }

    #[test]
    fn test_camera_settings_default() {
        let settings = CameraSettings::default();
        assert_eq!(settings.device_index, 0);
        assert_eq!(settings.fps, 30);
        assert!(settings.mirror); // Default to selfie mode
    }

    #[test]
    fn test_camera_error_display() {
        assert_eq!(
            CameraError::PermissionDenied.to_string(),
            "Camera access denied or not available"
        );
        assert_eq!(
            CameraError::OpenFailed("busy".to_string()).to_string(),
            "Failed to open camera: busy"
        );
        assert!(CameraError::DeviceNotFound(5).to_string().contains('5'));
    }
}
