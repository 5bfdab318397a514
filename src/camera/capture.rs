//! Camera capture handle: Idle -> Previewing -> Idle.

use super::device::{CameraDevice, CameraStream};
use super::frame_utils::{frame_to_jpeg, mirror_horizontal};
use super::types::{CameraError, CameraSettings, Frame};
use crate::media::MediaFile;

/// File name given to camera snapshots.
pub const CAPTURE_FILE_NAME: &str = "camera-capture.jpg";

enum CaptureState<S> {
    Idle,
    Previewing(S),
}

/// Camera capture handle.
///
/// Owns at most one live stream. The stream is released on every way out
/// of the preview: [`stop`](Self::stop), a successful or failed
/// [`capture`](Self::capture), and dropping the handle.
pub struct CameraCapture<D: CameraDevice> {
    device: D,
    settings: CameraSettings,
    state: CaptureState<D::Stream>,
}

impl<D: CameraDevice> std::fmt::Debug for CameraCapture<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_previewing", &self.is_previewing())
            .finish_non_exhaustive()
    }
}

impl<D: CameraDevice> CameraCapture<D> {
    pub fn new(device: D, settings: CameraSettings) -> Self {
        Self {
            device,
            settings,
            state: CaptureState::Idle,
        }
    }

    /// Get the current camera settings.
    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn is_previewing(&self) -> bool {
        matches!(self.state, CaptureState::Previewing(_))
    }

    /// Request camera access and start previewing.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If a preview is already live
    /// * Any error from the device; the handle stays idle
    pub fn start(&mut self) -> Result<(), CameraError> {
        if self.is_previewing() {
            return Err(CameraError::AlreadyRunning);
        }

        match self.device.open(&self.settings) {
            Ok(stream) => {
                log::info!("Camera {} previewing", self.settings.device_index);
                self.state = CaptureState::Previewing(stream);
                Ok(())
            }
            Err(e) => {
                log::error!("Camera error: {}", e);
                Err(e)
            }
        }
    }

    /// Read the next live frame without leaving the preview.
    ///
    /// A failed read releases the stream.
    pub fn preview_frame(&mut self) -> Result<Frame, CameraError> {
        let CaptureState::Previewing(stream) = &mut self.state else {
            return Err(CameraError::NotPreviewing);
        };
        match stream.read_frame() {
            Ok(mut frame) => {
                if self.settings.mirror {
                    mirror_horizontal(&mut frame);
                }
                Ok(frame)
            }
            Err(e) => {
                self.stop();
                Err(e)
            }
        }
    }

    /// Snapshot the current frame as a JPEG file and return to idle.
    pub fn capture(&mut self) -> Result<MediaFile, CameraError> {
        let mut stream = match std::mem::replace(&mut self.state, CaptureState::Idle) {
            CaptureState::Previewing(stream) => stream,
            CaptureState::Idle => return Err(CameraError::NotPreviewing),
        };

        let frame = stream.read_frame();
        stream.release();

        let mut frame = frame?;
        if self.settings.mirror {
            mirror_horizontal(&mut frame);
        }
        let jpeg = frame_to_jpeg(frame)?;
        Ok(MediaFile::new(CAPTURE_FILE_NAME, "image/jpeg", jpeg))
    }

    /// Release the stream, if any, and return to idle.
    pub fn stop(&mut self) {
        if let CaptureState::Previewing(mut stream) =
            std::mem::replace(&mut self.state, CaptureState::Idle)
        {
            stream.release();
        }
    }
}

impl<D: CameraDevice> Drop for CameraCapture<D> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::types::Resolution;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct Counters {
        opened: Arc<AtomicUsize>,
        released: Arc<AtomicUsize>,
    }

    struct FakeStream {
        counters: Counters,
        fail_read: bool,
        released: bool,
    }

    impl CameraStream for FakeStream {
        fn read_frame(&mut self) -> Result<Frame, CameraError> {
            if self.fail_read {
                return Err(CameraError::StreamFailed("unplugged".to_string()));
            }
            Ok(Frame {
                data: vec![10, 20, 30, 40, 50, 60],
                width: 2,
                height: 1,
            })
        }

        fn release(&mut self) {
            if !self.released {
                self.released = true;
                self.counters.released.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct FakeDevice {
        counters: Counters,
        deny: bool,
        fail_read: bool,
    }

    impl CameraDevice for FakeDevice {
        type Stream = FakeStream;

        fn open(&mut self, _settings: &CameraSettings) -> Result<FakeStream, CameraError> {
            if self.deny {
                return Err(CameraError::PermissionDenied);
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(FakeStream {
                counters: self.counters.clone(),
                fail_read: self.fail_read,
                released: false,
            })
        }
    }

    fn capture_with(deny: bool, fail_read: bool) -> (CameraCapture<FakeDevice>, Counters) {
        let counters = Counters::default();
        let device = FakeDevice {
            counters: counters.clone(),
            deny,
            fail_read,
        };
        let settings = CameraSettings {
            resolution: Resolution {
                width: 2,
                height: 1,
            },
            mirror: false,
            ..CameraSettings::default()
        };
        (CameraCapture::new(device, settings), counters)
    }

    #[test]
    fn test_denied_stays_idle() {
        let (mut camera, counters) = capture_with(true, false);
        assert!(matches!(camera.start(), Err(CameraError::PermissionDenied)));
        assert!(!camera.is_previewing());
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_capture_returns_jpeg_and_releases() {
        let (mut camera, counters) = capture_with(false, false);
        camera.start().unwrap();
        assert!(camera.is_previewing());

        let file = camera.capture().unwrap();
        assert_eq!(file.name(), CAPTURE_FILE_NAME);
        assert_eq!(file.mime_type(), "image/jpeg");
        assert_eq!(&file.bytes()[..2], &[0xff, 0xd8]);
        assert!(!camera.is_previewing());
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_read_still_releases() {
        let (mut camera, counters) = capture_with(false, true);
        camera.start().unwrap();
        assert!(matches!(camera.capture(), Err(CameraError::StreamFailed(_))));
        assert!(!camera.is_previewing());
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_preview_frame_keeps_previewing() {
        let (mut camera, counters) = capture_with(false, false);
        camera.start().unwrap();
        let frame = camera.preview_frame().unwrap();
        assert_eq!((frame.width, frame.height), (2, 1));
        assert!(camera.is_previewing());
        assert_eq!(counters.released.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_failed_preview_frame_releases() {
        let (mut camera, counters) = capture_with(false, true);
        camera.start().unwrap();
        assert!(camera.preview_frame().is_err());
        assert!(!camera.is_previewing());
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_capture_when_idle() {
        let (mut camera, _) = capture_with(false, false);
        assert!(matches!(camera.capture(), Err(CameraError::NotPreviewing)));
    }

    #[test]
    fn test_start_twice() {
        let (mut camera, counters) = capture_with(false, false);
        camera.start().unwrap();
        assert!(matches!(camera.start(), Err(CameraError::AlreadyRunning)));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_is_idempotent() {
        let (mut camera, counters) = capture_with(false, false);
        camera.stop();
        camera.start().unwrap();
        camera.stop();
        camera.stop();
        assert!(!camera.is_previewing());
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_stream() {
        let (mut camera, counters) = capture_with(false, false);
        camera.start().unwrap();
        drop(camera);
        assert_eq!(counters.released.load(Ordering::SeqCst), 1);
    }
}
