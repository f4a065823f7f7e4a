//! Server configuration
//!
//! Layered as defaults, then an optional TOML file, then `DSP_BLOCK__*`
//! environment variables.

use feature_engine::{DspError, PngRasterizer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "DSP_BLOCK_CONFIG";

/// Config file used when the environment does not name one
pub const DEFAULT_CONFIG_PATH: &str = "dsp-block.toml";

/// Errors while loading configuration or assets it points to
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Failed to read font {path}: {source}")]
    FontRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid pipeline setup: {0}")]
    Pipeline(#[from] DspError),
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// `EnvFilter` directive, e.g. `info` or `api=debug,feature_engine=debug`
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
    /// Largest accepted request body (bytes)
    pub max_body_bytes: usize,
    /// TrueType/OpenType font used for the image caption
    pub font_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 4446,
            log_level: "info".to_string(),
            log_json: false,
            max_body_bytes: 32 * 1024 * 1024,
            font_path: None,
        }
    }
}

impl ServerConfig {
    /// Load from the file named by `DSP_BLOCK_CONFIG` (or `dsp-block.toml`) and the environment
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());
        Self::load_from(Path::new(&path))
    }

    /// Load from a specific file; a missing file falls back to defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix("DSP_BLOCK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Socket address string for the listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Image backend, with the configured caption font when one is set
    pub fn rasterizer(&self) -> Result<PngRasterizer, ConfigError> {
        match &self.font_path {
            Some(path) => {
                let bytes = std::fs::read(path).map_err(|source| ConfigError::FontRead {
                    path: path.clone(),
                    source,
                })?;
                Ok(PngRasterizer::from_font_bytes(bytes)?)
            }
            None => Ok(PngRasterizer::new()),
        }
    }
}
