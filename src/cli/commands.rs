//! Subcommand handlers.

use std::future::Future;
use std::io::{BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::Duration;

use super::args::{ConfigAction, OutputArgs};
use super::enums::Category;
use super::preview::TerminalPreview;
use crate::api::{ApiError, StyleClient};
use crate::blend;
use crate::camera::{CameraCapture, CameraDevice, FfmpegCamera};
use crate::config::{self, Config};
use crate::data_url::DataUrl;
use crate::media::{IntakeSource, MediaFile};
use crate::render;
use crate::workflow::{ConversionOutcome, IntakeOutcome, Observer, Workflow, WorkflowError};

/// Set by the Ctrl+C handler.
static CTRLC_RECEIVED: AtomicBool = AtomicBool::new(false);

/// How often a running upload or conversion checks for Ctrl+C.
const CANCEL_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// File name of the saved before/after comparison.
pub const COMPARISON_FILE_NAME: &str = "comparison.jpg";

pub const CAPTURE_CANCELLED_MESSAGE: &str = "Capture cancelled";
pub const CANCELLED_MESSAGE: &str = "Cancelled";

/// How a subcommand failed.
#[derive(Debug)]
pub enum CommandError {
    /// Already shown to the user by the observer.
    Alerted,
    Failed(String),
}

impl From<String> for CommandError {
    fn from(message: String) -> Self {
        CommandError::Failed(message)
    }
}

impl From<WorkflowError> for CommandError {
    fn from(_: WorkflowError) -> Self {
        CommandError::Alerted
    }
}

/// Prints alerts to stderr.
#[derive(Debug, Default)]
pub struct TerminalObserver;

impl Observer for TerminalObserver {
    fn alert(&self, message: &str) {
        eprintln!("Error: {}", message);
    }

    fn background_failure(&self, operation: &str, error: &ApiError) {
        log::warn!("{} failed in background: {}", operation, error);
        eprintln!("Warning: {} failed: {}", operation, error);
    }
}

/// Shared state for subcommands that talk to the server.
pub struct Context {
    pub config: Config,
    pub server: Option<String>,
}

impl Context {
    pub fn load(config_path: Option<&Path>, server: Option<String>) -> Result<Self, CommandError> {
        let config = Config::load(config_path).map_err(|e| e.to_string())?;
        Ok(Self { config, server })
    }

    fn base_url(&self) -> String {
        self.config.resolve_base_url(self.server.as_deref())
    }

    fn workflow(&self) -> Result<Workflow, CommandError> {
        let client = StyleClient::with_timeouts(
            self.base_url(),
            self.config.convert_timeout(),
            self.config.connect_timeout(),
        )
        .map_err(|e| format!("Failed to create client: {}", e))?;
        log::debug!("Using server {}", client.base_url());
        Ok(Workflow::new(Arc::new(client), Arc::new(TerminalObserver)))
    }

    fn output_dir(&self, output: &OutputArgs) -> PathBuf {
        output
            .output
            .clone()
            .unwrap_or_else(|| self.config.output_dir())
    }

    /// Preview width, or a disabled preview when stderr is not a terminal.
    fn preview(&self) -> TerminalPreview {
        if std::io::stderr().is_terminal() {
            TerminalPreview::new(self.config.camera.preview_columns)
        } else {
            TerminalPreview::disabled()
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CommandError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| CommandError::Failed(format!("Failed to create async runtime: {}", e)))
}

fn setup_ctrlc_handler() -> Result<(), CommandError> {
    ctrlc::set_handler(|| CTRLC_RECEIVED.store(true, Ordering::SeqCst))
        .map_err(|e| CommandError::Failed(format!("Failed to set Ctrl+C handler: {}", e)))
}

/// List styles from the server, optionally restricted to one category.
pub fn list_styles(ctx: &Context, category: Category) -> Result<(), CommandError> {
    let workflow = ctx.workflow()?;
    let rt = runtime()?;

    let styles = rt.block_on(workflow.load_styles());
    if styles.is_empty() {
        return Err(format!(
            "No styles available. Is the server running at {}?",
            ctx.base_url()
        )
        .into());
    }

    print!("{}", render::style_grid(&styles, category.into(), None));
    Ok(())
}

/// Upload a file, apply a style and save the results.
pub fn convert_file(
    ctx: &Context,
    path: &Path,
    style: &str,
    output: &OutputArgs,
) -> Result<(), CommandError> {
    let file = MediaFile::from_path(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    let workflow = ctx.workflow()?;
    let rt = runtime()?;

    rt.block_on(ensure_style_available(&workflow, style))?;
    setup_ctrlc_handler()?;

    rt.block_on(async {
        let run = async {
            let intake = workflow.intake(file, IntakeSource::FilePicker).await;
            finish(ctx, &workflow, intake, style, output).await
        };
        until_cancelled(&workflow, &CTRLC_RECEIVED, output.keep_remote, run).await
    })
}

/// Preview the camera until Enter, snapshot, then convert like [`convert_file`].
pub fn capture_and_convert(
    ctx: &Context,
    style: &str,
    device: Option<u32>,
    no_mirror: bool,
    output: &OutputArgs,
) -> Result<(), CommandError> {
    let mut settings = ctx.config.camera_settings();
    if let Some(index) = device {
        settings.device_index = index;
    }
    if no_mirror {
        settings.mirror = false;
    }

    let workflow = ctx.workflow()?;
    let rt = runtime()?;
    rt.block_on(ensure_style_available(&workflow, style))?;

    let mut camera = CameraCapture::new(FfmpegCamera::new(), settings);
    camera.start().map_err(|e| e.to_string())?;
    setup_ctrlc_handler()?;

    let (enter_tx, enter_rx) = mpsc::channel();
    std::thread::spawn(move || {
        let mut line = String::new();
        let _ = std::io::stdin().lock().read_line(&mut line);
        let _ = enter_tx.send(());
    });

    eprintln!("Camera ready. Press Enter to capture, Ctrl+C to cancel.");
    let mut preview = ctx.preview();
    run_preview(
        &mut camera,
        &enter_rx,
        &CTRLC_RECEIVED,
        &mut preview,
        &mut std::io::stderr(),
    )?;

    rt.block_on(async {
        let run = async {
            let intake = workflow.intake_capture(&mut camera).await;
            finish(ctx, &workflow, intake, style, output).await
        };
        until_cancelled(&workflow, &CTRLC_RECEIVED, output.keep_remote, run).await
    })
}

/// Draw live frames until a message arrives on `enter` or `cancel` is set.
///
/// The camera keeps previewing on success so the caller can capture. On
/// cancel or failure the stream is released.
pub fn run_preview<D: CameraDevice, W: Write>(
    camera: &mut CameraCapture<D>,
    enter: &mpsc::Receiver<()>,
    cancel: &AtomicBool,
    preview: &mut TerminalPreview,
    out: &mut W,
) -> Result<(), CommandError> {
    let result = preview_loop(camera, enter, cancel, preview, out);
    if let Err(e) = preview.finish(out) {
        log::debug!("Failed to restore cursor: {}", e);
    }
    result
}

fn preview_loop<D: CameraDevice, W: Write>(
    camera: &mut CameraCapture<D>,
    enter: &mpsc::Receiver<()>,
    cancel: &AtomicBool,
    preview: &mut TerminalPreview,
    out: &mut W,
) -> Result<(), CommandError> {
    let mut frames: u64 = 0;
    loop {
        if cancel.load(Ordering::SeqCst) {
            return cancel_preview(camera);
        }
        if enter.recv_timeout(Duration::from_millis(1)).is_ok() {
            log::debug!("Capturing after {} preview frames", frames);
            return Ok(());
        }
        match camera.preview_frame() {
            Ok(frame) => {
                if let Err(e) = preview.draw(out, &frame) {
                    log::warn!("Failed to draw preview: {}", e);
                }
                frames += 1;
            }
            // Ctrl+C can end the stream before the flag is seen.
            Err(_) if cancel.load(Ordering::SeqCst) => return cancel_preview(camera),
            Err(e) => return Err(e.to_string().into()),
        }
    }
}

fn cancel_preview<D: CameraDevice>(camera: &mut CameraCapture<D>) -> Result<(), CommandError> {
    camera.stop();
    Err(CommandError::Failed(CAPTURE_CANCELLED_MESSAGE.to_string()))
}

/// Fail early on a style the server does not list.
///
/// An unreachable style list is not an error here; the conversion reports it.
pub async fn ensure_style_available(workflow: &Workflow, style: &str) -> Result<(), CommandError> {
    let styles = workflow.load_styles().await;
    if !styles.is_empty() && !styles.iter().any(|s| s == style) {
        return Err(format!(
            "Unknown style '{}'. Run 'style-converter styles' to see what is available.",
            style
        )
        .into());
    }
    Ok(())
}

/// Run `operation` until it finishes or `cancel` is set.
///
/// On cancel the operation is dropped and the uploaded media is removed,
/// unless `keep_remote`.
pub async fn until_cancelled<F>(
    workflow: &Workflow,
    cancel: &AtomicBool,
    keep_remote: bool,
    operation: F,
) -> Result<(), CommandError>
where
    F: Future<Output = Result<(), CommandError>>,
{
    tokio::select! {
        result = operation => result,
        () = wait_for(cancel) => {
            eprintln!("\nReceived Ctrl+C, cancelling...");
            if !keep_remote {
                if let Some(handle) = workflow.remove() {
                    if let Err(e) = handle.await {
                        log::warn!("Delete task failed: {}", e);
                    }
                }
            }
            Err(CANCELLED_MESSAGE.to_string().into())
        }
    }
}

async fn wait_for(flag: &AtomicBool) {
    while !flag.load(Ordering::SeqCst) {
        tokio::time::sleep(CANCEL_POLL_INTERVAL).await;
    }
}

/// Convert the uploaded media, save outputs, then release the remote copy.
async fn finish(
    ctx: &Context,
    workflow: &Workflow,
    intake: Result<IntakeOutcome, WorkflowError>,
    style: &str,
    output: &OutputArgs,
) -> Result<(), CommandError> {
    let IntakeOutcome::Accepted(upload) = intake? else {
        return Err("Upload was superseded".to_string().into());
    };
    eprintln!("Uploaded {}", upload.media_id);

    let result = convert_and_save(ctx, workflow, style, output).await;

    if output.keep_remote {
        eprintln!("Keeping {} on the server", upload.media_id);
    } else if let Some(handle) = workflow.remove() {
        if let Err(e) = handle.await {
            log::warn!("Delete task failed: {}", e);
        }
    }
    result
}

async fn convert_and_save(
    ctx: &Context,
    workflow: &Workflow,
    style: &str,
    output: &OutputArgs,
) -> Result<(), CommandError> {
    if workflow.snapshot().is_video() {
        eprintln!("Processing video. This can take several minutes.");
    }
    let outcome = workflow.select_style(style).await?;

    if output.intensity != 100 {
        match outcome {
            ConversionOutcome::Image => workflow.set_intensity(output.intensity).await?,
            ConversionOutcome::Video => eprintln!("Intensity only applies to images, ignoring it"),
            ConversionOutcome::Superseded => {}
        }
    }

    // Keep stdout for the URLs when printing them.
    if output.data_url {
        eprint!("{}", workflow.view());
    } else {
        print!("{}", workflow.view());
    }

    let dir = ctx.output_dir(output);
    let download = workflow
        .download()
        .ok_or_else(|| "Nothing to download".to_string())?;
    if output.data_url {
        println!("{}", download.to_data_url());
    } else {
        let path = download
            .save_to(&dir)
            .map_err(|e| format!("Failed to save {}: {}", download.file_name, e))?;
        println!("Saved {}", path.display());
    }

    if let Some(divider) = output.compare {
        if outcome == ConversionOutcome::Video {
            eprintln!("Comparison is only available for images");
        } else {
            let mut comparison = workflow.comparison()?;
            comparison.set_divider(divider);
            let jpeg = comparison
                .render()
                .and_then(|image| blend::encode_jpeg(&image))
                .map_err(|e| format!("Failed to render comparison: {}", e))?;
            if output.data_url {
                println!("{}", DataUrl::new("image/jpeg", jpeg));
            } else {
                std::fs::create_dir_all(&dir)
                    .map_err(|e| format!("Failed to create {}: {}", dir.display(), e))?;
                let path = dir.join(COMPARISON_FILE_NAME);
                std::fs::write(&path, jpeg)
                    .map_err(|e| format!("Failed to save {}: {}", path.display(), e))?;
                println!("Saved {}", path.display());
            }
        }
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(
    ctx: &Context,
    path: Option<&Path>,
    action: ConfigAction,
) -> Result<(), CommandError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            println!("Server: {}", ctx.base_url());
            println!();
            print!("{}", ctx.config.to_toml().map_err(|e| e.to_string())?);
        }
        ConfigAction::Init => {
            config::init(&config_path).map_err(|e| e.to_string())?;
            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
