//! Workflow controller.
//!
//! Drives one [`Session`] through upload, style selection, conversion,
//! intensity blending, comparison, download and removal. Backend I/O goes
//! through the [`Backend`] trait; user-facing failures go to an
//! [`Observer`]. The session lock is only ever held between awaits, so
//! overlapping operations interleave at await points and are reconciled by
//! the session's generation counter.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::task::JoinHandle;

use crate::api::{ApiError, Backend, UploadResponse};
use crate::blend::{self, BlendError};
use crate::camera::{CameraCapture, CameraDevice, CameraError};
use crate::compare::Comparison;
use crate::data_url::DataUrl;
use crate::media::{validate_media, IntakeSource, MediaFile, ValidationError};
use crate::render::ViewState;
use crate::session::{Download, Session, SessionError};
use crate::styles::{self, StyleCategory};

/// Receives user-visible failures and background diagnostics.
pub trait Observer: Send + Sync {
    /// Show a blocking, user-visible failure message.
    fn alert(&self, message: &str);

    /// A detached operation failed. Never shown as an alert.
    fn background_failure(&self, operation: &str, error: &ApiError) {
        log::error!("{} failed in background: {}", operation, error);
    }
}

/// Observer that only writes to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn alert(&self, message: &str) {
        log::error!("{}", message);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Failed to upload: {0}")]
    Upload(#[source] ApiError),

    #[error("Style conversion failed: {0}")]
    Conversion(#[source] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Image processing failed: {0}")]
    Blend(#[from] BlendError),

    #[error(transparent)]
    Camera(#[from] CameraError),
}

impl WorkflowError {
    /// Whether this is a conversion that hit the client timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, WorkflowError::Conversion(e) if e.is_timeout())
    }
}

/// Result of an intake that passed validation and upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntakeOutcome {
    Accepted(UploadResponse),
    /// Another intake or a removal happened while uploading.
    Superseded,
}

/// Result of a style selection that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionOutcome {
    Image,
    Video,
    /// A newer selection or a removal happened while converting.
    Superseded,
}

pub struct Workflow {
    backend: Arc<dyn Backend>,
    observer: Arc<dyn Observer>,
    session: Mutex<Session>,
    styles: Mutex<Vec<String>>,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("session", &*self.session())
            .finish_non_exhaustive()
    }
}

impl Workflow {
    pub fn new(backend: Arc<dyn Backend>, observer: Arc<dyn Observer>) -> Self {
        Self {
            backend,
            observer,
            session: Mutex::new(Session::new()),
            styles: Mutex::new(Vec::new()),
        }
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Surface a failure to the user and hand it back for propagation.
    fn report(&self, error: WorkflowError) -> WorkflowError {
        self.observer.alert(&error.to_string());
        error
    }

    /// A copy of the current session.
    pub fn snapshot(&self) -> Session {
        self.session().clone()
    }

    /// What the rendering layer should show right now.
    pub fn view(&self) -> ViewState {
        ViewState::from_session(&self.session())
    }

    /// Fetch the style list. On failure the list stays empty.
    pub async fn load_styles(&self) -> Vec<String> {
        match self.backend.list_styles().await {
            Ok(list) => {
                log::info!("Loaded {} styles", list.len());
                let mut styles = self.styles.lock().unwrap_or_else(PoisonError::into_inner);
                *styles = list.clone();
                list
            }
            Err(e) => {
                log::error!("Failed to load styles: {}", e);
                Vec::new()
            }
        }
    }

    /// Loaded styles in `category`, in backend order.
    pub fn styles_in(&self, category: StyleCategory) -> Vec<String> {
        let styles = self.styles.lock().unwrap_or_else(PoisonError::into_inner);
        styles::filter_styles(&styles, category)
    }

    /// Validate and upload a candidate file, then keep it for preview.
    ///
    /// The session is reset before uploading and only receives the media
    /// (identifier and preview) once the backend has accepted it.
    pub async fn intake(
        &self,
        file: MediaFile,
        source: IntakeSource,
    ) -> Result<IntakeOutcome, WorkflowError> {
        validate_media(&file).map_err(|e| self.report(e.into()))?;

        let generation = {
            let mut session = self.session();
            session.reset();
            session.generation()
        };

        log::info!("Uploading {} ({} bytes) from {}", file.name(), file.size(), source);
        let response = self
            .backend
            .upload_media(&file)
            .await
            .map_err(|e| self.report(WorkflowError::Upload(e)))?;

        let original = DataUrl::from_media(&file);
        let accepted = self.session().accept_upload(generation, &response, original);
        if !accepted {
            log::warn!("Discarding upload {}: session moved on", response.media_id);
            return Ok(IntakeOutcome::Superseded);
        }

        log::info!(
            "Upload successful: media {} (video: {})",
            response.media_id,
            response.is_video
        );
        Ok(IntakeOutcome::Accepted(response))
    }

    /// Snapshot the camera and feed the frame through [`intake`](Self::intake).
    pub async fn intake_capture<D: CameraDevice>(
        &self,
        camera: &mut CameraCapture<D>,
    ) -> Result<IntakeOutcome, WorkflowError> {
        let file = camera.capture().map_err(|e| self.report(e.into()))?;
        self.intake(file, IntakeSource::Camera).await
    }

    /// Convert the current media to `style` and display the result.
    pub async fn select_style(&self, style: &str) -> Result<ConversionOutcome, WorkflowError> {
        let begun = self.session().begin_conversion(style);
        let ticket = begun.map_err(|e| self.report(e.into()))?;

        log::info!("Applying style {} to media {}", ticket.style, ticket.media_id);
        let result = self
            .backend
            .convert_style(&ticket.media_id, &ticket.style)
            .await;

        match result {
            Ok(converted) => {
                let size = converted.bytes.len();
                let applied = self.session().complete_conversion(&ticket, converted);
                if !applied {
                    log::warn!("Discarding superseded {} result", ticket.style);
                    return Ok(ConversionOutcome::Superseded);
                }
                log::info!("Style {} applied, {} bytes", ticket.style, size);

                if ticket.is_video {
                    return Ok(ConversionOutcome::Video);
                }
                if let Err(e) = self.recompose().await {
                    // An unblendable result is a failed conversion.
                    self.session().fail_blend(ticket.generation);
                    return Err(e);
                }
                Ok(ConversionOutcome::Image)
            }
            Err(e) => {
                let current = self.session().fail_conversion(&ticket);
                if !current {
                    log::warn!("Ignoring failure of superseded {} conversion: {}", ticket.style, e);
                    return Ok(ConversionOutcome::Superseded);
                }
                Err(self.report(WorkflowError::Conversion(e)))
            }
        }
    }

    /// Change the blend intensity and recompute the displayed image.
    pub async fn set_intensity(&self, percent: u8) -> Result<(), WorkflowError> {
        let set = self.session().set_intensity(percent);
        set.map_err(|e| self.report(e.into()))?;
        self.recompose().await
    }

    /// Blend original and styled at the session's current intensity.
    async fn recompose(&self) -> Result<(), WorkflowError> {
        let inputs = self.session().blend_inputs();
        let inputs = inputs.map_err(|e| self.report(e.into()))?;

        let jpeg = blend::blend_to_jpeg(inputs.original, inputs.styled, inputs.intensity)
            .await
            .map_err(|e| self.report(e.into()))?;

        let stored = self.session().store_blend(
            inputs.generation,
            inputs.intensity,
            DataUrl::new("image/jpeg", jpeg),
        );
        if !stored {
            log::debug!("Dropping blend at {}%: superseded", inputs.intensity);
        }
        Ok(())
    }

    /// Open the before/after comparison (images only).
    pub fn comparison(&self) -> Result<Comparison, WorkflowError> {
        let comparison = self.session().comparison();
        comparison.map_err(|e| self.report(e.into()))
    }

    /// The file a download would produce, if there is one.
    pub fn download(&self) -> Option<Download> {
        self.session().download()
    }

    /// Forget the current media and ask the backend to delete it.
    ///
    /// The delete runs detached; its effects are not guaranteed and its
    /// failure only reaches [`Observer::background_failure`]. The handle is
    /// returned for callers that want to wait before shutting down. Must be
    /// called from within a tokio runtime.
    pub fn remove(&self) -> Option<JoinHandle<()>> {
        let media_id = self.session().reset()?;

        log::info!("Deleting media {}", media_id);
        let backend = Arc::clone(&self.backend);
        let observer = Arc::clone(&self.observer);
        Some(tokio::spawn(async move {
            if let Err(e) = backend.delete_media(&media_id).await {
                observer.background_failure("delete", &e);
            }
        }))
    }

    /// Remove the current media so a new file can be picked.
    ///
    /// Same as [`remove`](Self::remove); the caller opens its file picker
    /// afterwards.
    pub fn add_another(&self) -> Option<JoinHandle<()>> {
        log::debug!("Add another: clearing current media");
        self.remove()
    }
}
