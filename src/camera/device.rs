//! Camera devices and live streams.
//!
//! [`FfmpegCamera`] reads the platform camera through an `ffmpeg` child
//! process that writes raw RGB24 frames to stdout. The child holds the
//! device lock, so releasing a stream means killing it.

use std::io::Read;
use std::process::{Child, ChildStdout, Command, Stdio};

use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Stderr fragments that indicate the OS refused camera access.
const PERMISSION_KEYWORDS: &[&str] = &[
    "permission denied",
    "not authorized",
    "not permitted",
    "access denied",
];

/// A live camera stream. Owns the device until released.
pub trait CameraStream: Send {
    /// Read the most recent frame.
    fn read_frame(&mut self) -> Result<Frame, CameraError>;

    /// Release the device. Must be idempotent.
    fn release(&mut self);
}

/// Something that can open a camera stream.
pub trait CameraDevice {
    type Stream: CameraStream;

    fn open(&mut self, settings: &CameraSettings) -> Result<Self::Stream, CameraError>;
}

/// Camera backed by an `ffmpeg` subprocess.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfmpegCamera;

impl FfmpegCamera {
    pub fn new() -> Self {
        Self
    }
}

/// Generate FFmpeg input arguments for the platform camera.
pub fn ffmpeg_input_args(settings: &CameraSettings) -> Result<Vec<String>, CameraError> {
    let (format, device) = if cfg!(target_os = "macos") {
        ("avfoundation", settings.device_index.to_string())
    } else if cfg!(target_os = "linux") {
        ("v4l2", format!("/dev/video{}", settings.device_index))
    } else {
        return Err(CameraError::Unsupported);
    };

    Ok(vec![
        "-f".to_string(),
        format.to_string(),
        "-framerate".to_string(),
        settings.fps.to_string(),
        "-video_size".to_string(),
        settings.resolution.to_string(),
        "-i".to_string(),
        device,
    ])
}

/// Generate FFmpeg output arguments: raw RGB24 frames at exactly `resolution`.
pub fn ffmpeg_output_args(resolution: Resolution) -> Vec<String> {
    vec![
        "-vf".to_string(),
        format!("scale={}:{}", resolution.width, resolution.height),
        "-pix_fmt".to_string(),
        "rgb24".to_string(),
        "-f".to_string(),
        "rawvideo".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
        "-".to_string(),
    ]
}

/// Map ffmpeg's stderr to a camera error.
fn classify_stderr(device_index: u32, stderr: &str) -> CameraError {
    let lower = stderr.to_lowercase();
    if PERMISSION_KEYWORDS.iter().any(|k| lower.contains(k)) {
        CameraError::PermissionDenied
    } else if lower.contains("no such file or directory") || lower.contains("no such device") {
        CameraError::DeviceNotFound(device_index)
    } else {
        let msg = stderr.trim();
        CameraError::OpenFailed(if msg.is_empty() {
            "ffmpeg exited without producing a frame".to_string()
        } else {
            msg.to_string()
        })
    }
}

impl CameraDevice for FfmpegCamera {
    type Stream = FfmpegStream;

    fn open(&mut self, settings: &CameraSettings) -> Result<FfmpegStream, CameraError> {
        let mut args = ffmpeg_input_args(settings)?;
        args.extend(ffmpeg_output_args(settings.resolution));

        let mut command = Command::new("ffmpeg");
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        // Keep terminal Ctrl+C away from the child; the stream is released explicitly.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let mut child = command
            .spawn()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => CameraError::FfmpegNotFound,
                _ => CameraError::OpenFailed(e.to_string()),
            })?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CameraError::OpenFailed("no stdout from ffmpeg".to_string()))?;

        let mut stream = FfmpegStream {
            child: Some(child),
            stdout,
            resolution: settings.resolution,
            device_index: settings.device_index,
        };

        // The first frame proves the device is readable.
        stream.read_frame()?;
        Ok(stream)
    }
}

/// A running `ffmpeg` camera capture.
pub struct FfmpegStream {
    child: Option<Child>,
    stdout: ChildStdout,
    resolution: Resolution,
    device_index: u32,
}

impl std::fmt::Debug for FfmpegStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FfmpegStream")
            .field("resolution", &self.resolution)
            .field("running", &self.child.is_some())
            .finish_non_exhaustive()
    }
}

impl FfmpegStream {
    /// Kill the child and turn its stderr into an error.
    fn fail(&mut self) -> CameraError {
        let Some(mut child) = self.child.take() else {
            return CameraError::StreamFailed("stream already released".to_string());
        };
        let _ = child.kill();
        let mut stderr = String::new();
        if let Some(mut pipe) = child.stderr.take() {
            let _ = pipe.read_to_string(&mut stderr);
        }
        let _ = child.wait();
        classify_stderr(self.device_index, &stderr)
    }
}

impl CameraStream for FfmpegStream {
    fn read_frame(&mut self) -> Result<Frame, CameraError> {
        if self.child.is_none() {
            return Err(CameraError::StreamFailed("stream already released".to_string()));
        }
        let mut data = vec![0u8; self.resolution.frame_len()];
        if self.stdout.read_exact(&mut data).is_err() {
            return Err(self.fail());
        }
        Ok(Frame {
            data,
            width: self.resolution.width,
            height: self.resolution.height,
        })
    }

    fn release(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
            log::debug!("Released camera {}", self.device_index);
        }
    }
}

impl Drop for FfmpegStream {
    fn drop(&mut self) {
        self.release();
    }
}
