use crate::directory::DeprovisionMode;
use crate::workflows::deprovision::pacing::{RateLimit, DIRECTORY_REQUESTS_PER_SECOND};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

const DEFAULT_API_URL: &str = "https://api.zoom.us/v1/";

/// Top-level configuration for a deprovisioning run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub zoom: ZoomConfig,
    pub run: RunConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Reads credentials and run settings from the environment (and `.env`).
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let zoom = ZoomConfig::from_env()?;
        Self::with_zoom(zoom)
    }

    /// Like [`AppConfig::load`], but takes the API credentials from a JSON
    /// file with `root_request_url`, `api_key`, `api_secret` and `data_type`.
    pub fn load_with_api_file(path: &Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        let zoom = ZoomConfig::from_json_path(path)?;
        Self::with_zoom(zoom)
    }

    fn with_zoom(zoom: ZoomConfig) -> Result<Self, ConfigError> {
        let mode_raw = env::var("DEPROVISION_MODE").unwrap_or_else(|_| "delete".to_string());
        let mode =
            DeprovisionMode::parse(&mode_raw).ok_or(ConfigError::InvalidMode(mode_raw.clone()))?;

        let requests_per_second = parse_number(
            "DEPROVISION_RATE_LIMIT",
            DIRECTORY_REQUESTS_PER_SECOND as u64,
        )? as usize;
        if !(1..=DIRECTORY_REQUESTS_PER_SECOND).contains(&requests_per_second) {
            return Err(ConfigError::RateLimitOutOfRange(requests_per_second));
        }

        let log_dir = PathBuf::from(
            env::var("DEPROVISION_LOG_DIR").unwrap_or_else(|_| "logs".to_string()),
        );
        let confirmation_phrase = env::var("DEPROVISION_CONFIRMATION_PHRASE")
            .ok()
            .map(|phrase| phrase.trim().to_string())
            .filter(|phrase| !phrase.is_empty());
        let log_level = env::var("DEPROVISION_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            zoom,
            run: RunConfig {
                mode,
                requests_per_second,
                log_dir,
                confirmation_phrase,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Connection settings for the Zoom v1 API.
#[derive(Clone)]
pub struct ZoomConfig {
    pub root_request_url: String,
    pub api_key: String,
    pub api_secret: String,
    pub data_type: String,
    pub timeout_secs: u64,
}

impl fmt::Debug for ZoomConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZoomConfig")
            .field("root_request_url", &self.root_request_url)
            .field("data_type", &self.data_type)
            .field("timeout_secs", &self.timeout_secs)
            .finish_non_exhaustive()
    }
}

impl ZoomConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            root_request_url: env::var("ZOOM_API_URL")
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            api_key: required("ZOOM_API_KEY")?,
            api_secret: required("ZOOM_API_SECRET")?,
            data_type: env::var("ZOOM_DATA_TYPE").unwrap_or_else(|_| "JSON".to_string()),
            timeout_secs: parse_number("ZOOM_TIMEOUT_SECS", 30)?,
        })
    }

    pub fn from_json_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::ApiFile {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ApiConfigFile =
            serde_json::from_str(&raw).map_err(|source| ConfigError::ApiFileFormat {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self {
            root_request_url: file.root_request_url,
            api_key: file.api_key,
            api_secret: file.api_secret,
            data_type: file.data_type.unwrap_or_else(|| "JSON".to_string()),
            timeout_secs: parse_number("ZOOM_TIMEOUT_SECS", 30)?,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ApiConfigFile {
    root_request_url: String,
    api_key: String,
    api_secret: String,
    #[serde(default)]
    data_type: Option<String>,
}

/// What the run does and how fast.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub mode: DeprovisionMode,
    pub requests_per_second: usize,
    pub log_dir: PathBuf,
    pub confirmation_phrase: Option<String>,
}

impl RunConfig {
    pub fn rate_limit(&self) -> RateLimit {
        RateLimit::per_second(self.requests_per_second)
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    env::var(var)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or(ConfigError::MissingVar(var))
}

fn parse_number(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidNumber { var: &'static str, value: String },
    InvalidMode(String),
    RateLimitOutOfRange(usize),
    ApiFile { path: PathBuf, source: std::io::Error },
    ApiFileFormat { path: PathBuf, source: serde_json::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingVar(var) => write!(f, "{var} must be set"),
            ConfigError::InvalidNumber { var, value } => {
                write!(f, "{var} must be a whole number, got '{value}'")
            }
            ConfigError::InvalidMode(value) => write!(
                f,
                "DEPROVISION_MODE must be 'delete' or 'deactivate', got '{value}'"
            ),
            ConfigError::RateLimitOutOfRange(value) => write!(
                f,
                "DEPROVISION_RATE_LIMIT must be between 1 and {DIRECTORY_REQUESTS_PER_SECOND}, got {value}"
            ),
            ConfigError::ApiFile { path, .. } => {
                write!(f, "unable to read API config file {}", path.display())
            }
            ConfigError::ApiFileFormat { path, .. } => {
                write!(f, "API config file {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::ApiFile { source, .. } => Some(source),
            ConfigError::ApiFileFormat { source, .. } => Some(source),
            ConfigError::MissingVar(_)
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidMode(_)
            | ConfigError::RateLimitOutOfRange(_) => None,
        }
    }
}
