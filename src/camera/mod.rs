//! Camera capture: live preview and single-frame snapshots.
//!
//! - Device access via the [`CameraDevice`] / [`CameraStream`] traits
//! - An ffmpeg-backed implementation in [`FfmpegCamera`]
//! - The preview/capture state machine in [`CameraCapture`]

mod capture;
mod device;
mod frame_utils;
mod types;

pub use capture::{CameraCapture, CAPTURE_FILE_NAME};
pub use device::{
    ffmpeg_input_args, ffmpeg_output_args, CameraDevice, CameraStream, FfmpegCamera, FfmpegStream,
};
pub use frame_utils::{frame_to_jpeg, mirror_horizontal};
pub use types::{CameraError, CameraSettings, Frame, Resolution};
