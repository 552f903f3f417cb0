//! Configuration management for LabFlow Server

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::ocr::OcrSettings;
use crate::structuring::GeminiConfig;

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub gemini: GeminiConfig,
    pub ocr: OcrSettings,
    pub batch: BatchConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub cors_origins: CorsOrigins,
}

#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Documents processed in parallel
    pub concurrency: usize,
}

/// Allowed cross-origin callers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorsOrigins {
    Any,
    List(Vec<String>),
}

impl CorsOrigins {
    /// Parse a comma-separated origin list; `*` allows any origin
    pub fn parse(raw: &str) -> Self {
        let origins: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|origin| !origin.is_empty())
            .map(str::to_string)
            .collect();

        if origins.iter().any(|origin| origin == "*") {
            CorsOrigins::Any
        } else {
            CorsOrigins::List(origins)
        }
    }
}

const DEFAULT_CORS_ORIGINS: &str = "http://localhost,http://127.0.0.1,null";

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let api_key = lookup("GEMINI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::Missing("GEMINI_API_KEY"))?;

        let defaults = OcrSettings::default();

        Ok(Config {
            server: ServerConfig {
                host: var("SERVER_HOST", "0.0.0.0"),
                port: parse_var(&lookup, "SERVER_PORT", 8000)?,
                max_upload_bytes: parse_var(&lookup, "MAX_UPLOAD_BYTES", 50 * 1024 * 1024)?,
                cors_origins: CorsOrigins::parse(&var("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)),
            },
            gemini: GeminiConfig {
                api_key,
                model: var("GEMINI_MODEL", "gemini-2.5-flash"),
                base_url: var("GEMINI_BASE_URL", "https://generativelanguage.googleapis.com"),
                timeout: Duration::from_secs(parse_var(&lookup, "GEMINI_TIMEOUT_SECS", 120)?),
            },
            ocr: OcrSettings {
                tesseract_cmd: var("TESSERACT_CMD", &defaults.tesseract_cmd),
                language: var("OCR_LANGUAGE", &defaults.language),
                dpi: parse_var(&lookup, "OCR_DPI", defaults.dpi)?,
                ..defaults
            },
            batch: BatchConfig {
                concurrency: parse_var::<usize, _>(&lookup, "BATCH_CONCURRENCY", 2)?.max(1),
            },
        })
    }
}

fn parse_var<T, F>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
