//! Configuration file handling for style-converter.
//!
//! Loads configuration from `<config dir>/style-converter/config.toml` or a custom path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::api::{DEFAULT_BASE_URL, STYLE_API_URL_ENV};
use crate::camera::{CameraSettings, Resolution};

/// Written by `config init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# style-converter configuration

[server]
# Origin of the style conversion backend. STYLE_API_URL and --server override it.
# base_url = "http://localhost:8000"

[client]
# Client-side limit for a single conversion, in seconds.
convert_timeout_secs = 300
connect_timeout_secs = 10

[camera]
device = 0
mirror = true
# width = 1280
# height = 720
# Width of the live ASCII preview in characters. 0 turns it off.
preview_columns = 64

[output]
# Where downloads are written. Defaults to the current directory.
# dir = "."
"#;

/// Configuration file structure for style-converter.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct ServerConfig {
    pub base_url: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ClientConfig {
    #[serde(default = "default_convert_timeout")]
    pub convert_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            convert_timeout_secs: default_convert_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(default = "default_preview_columns")]
    pub preview_columns: u16,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            mirror: true,
            width: None,
            height: None,
            preview_columns: default_preview_columns(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq)]
pub struct OutputConfig {
    pub dir: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_preview_columns() -> u16 {
    64
}

fn default_convert_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    10
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
                path: path.clone(),
                source: e,
            })?;
            let config: Config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.clone(),
                source: e,
            })?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Backend origin: `cli_override`, then `STYLE_API_URL`, then the
    /// config file, then the default local origin.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> String {
        let env = std::env::var(STYLE_API_URL_ENV).ok();
        self.base_url_from(cli_override, env.as_deref())
    }

    fn base_url_from(&self, cli_override: Option<&str>, env: Option<&str>) -> String {
        [cli_override, env, self.server.base_url.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|url| !url.is_empty())
            .unwrap_or(DEFAULT_BASE_URL)
            .to_string()
    }

    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.client.convert_timeout_secs)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.client.connect_timeout_secs)
    }

    /// Camera settings with file values applied over the defaults.
    pub fn camera_settings(&self) -> CameraSettings {
        let defaults = CameraSettings::default();
        CameraSettings {
            device_index: self.camera.device,
            resolution: Resolution {
                width: self.camera.width.unwrap_or(defaults.resolution.width),
                height: self.camera.height.unwrap_or(defaults.resolution.height),
            },
            mirror: self.camera.mirror,
            ..defaults
        }
    }

    /// Directory downloads are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output.dir.clone().unwrap_or_else(|| PathBuf::from("."))
    }

    /// Render as TOML for `config show`.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeError)
    }
}

/// Write the default template to `path`. Refuses to overwrite.
pub fn init(path: &Path) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::AlreadyExists(path.to_path_buf()));
    }
    let io_err = |e| ConfigError::IoError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG_TEMPLATE).map_err(io_err)?;
    Ok(())
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    SerializeError(toml::ser::Error),
    AlreadyExists(PathBuf),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::SerializeError(source) => {
                write!(f, "Failed to render config: {}", source)
            }
            ConfigError::AlreadyExists(path) => {
                write!(f, "Config file '{}' already exists", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            ConfigError::SerializeError(source) => Some(source),
            ConfigError::AlreadyExists(_) => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("style-converter").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/style-converter/config.toml")
        })
}
