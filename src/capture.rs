//! Capture flow: acquire one still frame of the fridge, from a camera stream or an upload.
//!
//! The camera stream is held by a [`CameraStreamGuard`] and released whenever
//! the guard is dropped: after a snapshot, when an upload replaces the stream,
//! on retake, or when the flow itself goes away.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::errors::{error_logging, AppError, AppResult};
use crate::gateway::ImagePayload;

/// JPEG quality used for captured and uploaded frames
pub const CAPTURE_JPEG_QUALITY: u8 = 80;

lazy_static! {
    static ref DATA_URL_PREFIX: Regex =
        Regex::new(r"^data:image/(png|jpeg|jpg);base64,").expect("Invalid data URL regex pattern");
}

/// A live frame source
pub trait CameraStream: Send {
    /// Grab the current frame
    fn grab_frame(&mut self) -> AppResult<DynamicImage>;

    /// Release the device. Called exactly once, by the guard.
    fn stop(&mut self);
}

/// A device that can open a stream (rear-facing when there is a choice)
pub trait Camera: Send + Sync {
    fn open(&self) -> AppResult<Box<dyn CameraStream>>;
}

/// RAII guard for an open camera stream that ensures release on drop
pub struct CameraStreamGuard {
    stream: Box<dyn CameraStream>,
}

impl CameraStreamGuard {
    fn new(stream: Box<dyn CameraStream>) -> Self {
        Self { stream }
    }

    fn grab_frame(&mut self) -> AppResult<DynamicImage> {
        self.stream.grab_frame()
    }
}

impl Drop for CameraStreamGuard {
    fn drop(&mut self) {
        self.stream.stop();
        debug!("Camera stream released");
    }
}

impl std::fmt::Debug for CameraStreamGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CameraStreamGuard")
    }
}

/// Where the capture flow currently is
#[derive(Debug, Default)]
pub enum CaptureState {
    /// Camera off, nothing captured
    #[default]
    Idle,
    Streaming(CameraStreamGuard),
    Captured(ImagePayload),
}

/// Camera/upload state for the home view
#[derive(Debug, Default)]
pub struct CaptureFlow {
    state: CaptureState,
    camera_error: bool,
}

impl CaptureFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    pub fn is_streaming(&self) -> bool {
        matches!(self.state, CaptureState::Streaming(_))
    }

    pub fn captured(&self) -> Option<&ImagePayload> {
        match &self.state {
            CaptureState::Captured(image) => Some(image),
            _ => None,
        }
    }

    /// Message key for the inline camera status, when the camera could not be opened
    pub fn status_key(&self) -> Option<&'static str> {
        self.camera_error.then_some("camera-unavailable")
    }

    /// Open the camera. On failure the flow stays idle and the status asks for an upload.
    pub fn start_camera(&mut self, camera: &dyn Camera) -> bool {
        // Drop any previous stream before opening a new one
        self.state = CaptureState::Idle;
        match camera.open() {
            Ok(stream) => {
                self.state = CaptureState::Streaming(CameraStreamGuard::new(stream));
                self.camera_error = false;
                info!("Camera stream started");
                true
            }
            Err(e) => {
                error_logging::log_device_error(&e, "camera", "open");
                self.camera_error = true;
                false
            }
        }
    }

    /// Release the camera without capturing
    pub fn stop_camera(&mut self) {
        if self.is_streaming() {
            self.state = CaptureState::Idle;
        }
    }

    /// Take a still from the live stream and stop the camera
    pub fn snap(&mut self) -> AppResult<&ImagePayload> {
        let CaptureState::Streaming(guard) = &mut self.state else {
            return Err(AppError::Device("Camera is not streaming".to_string()));
        };
        let frame = guard.grab_frame()?;
        let payload = encode_jpeg(&frame)?;
        // Replacing the state drops the guard, which stops the stream
        self.state = CaptureState::Captured(payload);
        self.captured()
            .ok_or_else(|| AppError::Internal("capture vanished".to_string()))
    }

    /// Use a photo file instead of the camera
    pub fn upload_file(&mut self, path: &Path) -> AppResult<&ImagePayload> {
        let image = image::open(path).map_err(|e| {
            AppError::Validation(format!("Unable to read image {}: {}", path.display(), e))
        })?;
        let payload = encode_jpeg(&image)?;
        self.state = CaptureState::Captured(payload);
        self.camera_error = false;
        self.captured()
            .ok_or_else(|| AppError::Internal("capture vanished".to_string()))
    }

    /// Use an inline `data:image/...;base64,` photo
    pub fn upload_data_url(&mut self, data_url: &str) -> AppResult<&ImagePayload> {
        let payload = decode_data_url(data_url)?;
        self.state = CaptureState::Captured(payload);
        self.camera_error = false;
        self.captured()
            .ok_or_else(|| AppError::Internal("capture vanished".to_string()))
    }

    /// Discard the capture and reopen the camera
    pub fn retake(&mut self, camera: &dyn Camera) -> bool {
        self.state = CaptureState::Idle;
        self.start_camera(camera)
    }

    /// Hand off the captured frame, leaving the flow idle
    pub fn confirm(&mut self) -> Option<ImagePayload> {
        match std::mem::take(&mut self.state) {
            CaptureState::Captured(image) => Some(image),
            other => {
                self.state = other;
                None
            }
        }
    }
}

/// Re-encode a frame as JPEG at capture quality
pub fn encode_jpeg(image: &DynamicImage) -> AppResult<ImagePayload> {
    let mut bytes = Vec::new();
    let rgb = image.to_rgb8();
    JpegEncoder::new_with_quality(&mut bytes, CAPTURE_JPEG_QUALITY)
        .encode_image(&rgb)
        .map_err(|e| AppError::Device(format!("JPEG encoding failed: {}", e)))?;
    Ok(ImagePayload {
        mime_type: "image/jpeg".to_string(),
        bytes,
    })
}

/// Strip the data URL prefix and decode the base64 body.
///
/// Inputs without a recognized prefix are treated as bare base64 JPEG data.
pub fn decode_data_url(data_url: &str) -> AppResult<ImagePayload> {
    let trimmed = data_url.trim();
    let (mime_type, body) = match DATA_URL_PREFIX.captures(trimmed) {
        Some(captures) => {
            let subtype = match &captures[1] {
                "png" => "png",
                _ => "jpeg",
            };
            let prefix_len = captures.get(0).map_or(0, |m| m.end());
            (format!("image/{}", subtype), &trimmed[prefix_len..])
        }
        None => {
            warn!("Image data has no data URL prefix, assuming JPEG");
            ("image/jpeg".to_string(), trimmed)
        }
    };

    let bytes = STANDARD
        .decode(body)
        .map_err(|e| AppError::Validation(format!("Invalid base64 image data: {}", e)))?;
    if bytes.is_empty() {
        return Err(AppError::Validation("Image data is empty".to_string()));
    }
    Ok(ImagePayload { mime_type, bytes })
}

/// A "camera" that serves frames from an image file; used by the terminal front end
#[derive(Debug, Clone)]
pub struct FileCamera {
    path: PathBuf,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

struct FileCameraStream {
    path: PathBuf,
}

impl CameraStream for FileCameraStream {
    fn grab_frame(&mut self) -> AppResult<DynamicImage> {
        image::open(&self.path).map_err(|e| AppError::Device(format!("Frame unavailable: {}", e)))
    }

    fn stop(&mut self) {}
}

impl Camera for FileCamera {
    fn open(&self) -> AppResult<Box<dyn CameraStream>> {
        if !self.path.is_file() {
            return Err(AppError::Device(format!(
                "No camera frame source at {}",
                self.path.display()
            )));
        }
        Ok(Box::new(FileCameraStream {
            path: self.path.clone(),
        }))
    }
}

/// Platforms without a camera
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCamera;

impl Camera for NoCamera {
    fn open(&self) -> AppResult<Box<dyn CameraStream>> {
        Err(AppError::Device("No camera available".to_string()))
    }
}
