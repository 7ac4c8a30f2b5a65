//! Application configuration file support.
//!
//! Reads `m7box.toml`. Every field has a default, so a missing file or a
//! partial file both yield a usable configuration.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::models::IngestOptions;
use crate::services::dashboard::{confirmation_time_columns, DashboardSettings, DATE};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "M7BOX_CONFIG";

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("No m7box.toml found in standard locations")]
    NotFound,
}

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub ingest: IngestSettings,
    #[serde(default)]
    pub binning: BinningSettings,
    #[serde(default)]
    pub metrics: MetricSettings,
    #[serde(default)]
    pub axis: AxisSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Request body limit for uploads, in megabytes.
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

/// Columns whose text is parsed into times of day or dates on upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestSettings {
    #[serde(default = "confirmation_time_columns")]
    pub time_columns: Vec<String>,
    #[serde(default = "default_date_columns")]
    pub date_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinningSettings {
    #[serde(default = "default_retracement_width")]
    pub retracement_width: f64,
    #[serde(default = "default_extension_width")]
    pub extension_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSettings {
    #[serde(default = "default_retracement_thresholds")]
    pub retracement_thresholds: Vec<f64>,
    #[serde(default = "default_extension_thresholds")]
    pub extension_thresholds: Vec<f64>,
}

/// Preferred first/last bin labels of the chart windows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisSettings {
    #[serde(default = "default_retracement_focus")]
    pub retracement_focus: (String, String),
    #[serde(default = "default_extension_focus")]
    pub extension_focus: (String, String),
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_body_limit_mb() -> usize {
    50
}

fn default_date_columns() -> Vec<String> {
    vec![DATE.to_string()]
}

fn default_retracement_width() -> f64 {
    DashboardSettings::default().retracement_width
}

fn default_extension_width() -> f64 {
    DashboardSettings::default().extension_width
}

fn default_retracement_thresholds() -> Vec<f64> {
    DashboardSettings::default().retracement_thresholds
}

fn default_extension_thresholds() -> Vec<f64> {
    DashboardSettings::default().extension_thresholds
}

fn default_retracement_focus() -> (String, String) {
    DashboardSettings::default().retracement_focus
}

fn default_extension_focus() -> (String, String) {
    DashboardSettings::default().extension_focus
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_mb: default_body_limit_mb(),
        }
    }
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            time_columns: confirmation_time_columns(),
            date_columns: default_date_columns(),
        }
    }
}

impl Default for BinningSettings {
    fn default() -> Self {
        Self {
            retracement_width: default_retracement_width(),
            extension_width: default_extension_width(),
        }
    }
}

impl Default for MetricSettings {
    fn default() -> Self {
        Self {
            retracement_thresholds: default_retracement_thresholds(),
            extension_thresholds: default_extension_thresholds(),
        }
    }
}

impl Default for AxisSettings {
    fn default() -> Self {
        Self {
            retracement_focus: default_retracement_focus(),
            extension_focus: default_extension_focus(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Returns
    /// * `Err(ConfigError)` if the file cannot be read, parsed or validated
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location.
    ///
    /// Searches for `m7box.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("m7box.toml"),
            PathBuf::from("backend/m7box.toml"),
            PathBuf::from("../m7box.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Err(ConfigError::NotFound)
    }

    /// Configuration for the server binary.
    ///
    /// `M7BOX_CONFIG` names an explicit file; otherwise the default locations
    /// are searched and defaults are used when nothing is found. `HOST` and
    /// `PORT` override the server address.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => match Self::from_default_location() {
                Ok(config) => config,
                Err(ConfigError::NotFound) => {
                    log::info!("No m7box.toml found, using default configuration");
                    Self::default()
                }
                Err(e) => return Err(e),
            },
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply `HOST` and `PORT` from the environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(host) = std::env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("PORT must be a port number, got '{}'", port)))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, width) in [
            ("binning.retracement_width", self.binning.retracement_width),
            ("binning.extension_width", self.binning.extension_width),
        ] {
            if !(width.is_finite() && width > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, width
                )));
            }
        }
        let mut thresholds = self
            .metrics
            .retracement_thresholds
            .iter()
            .chain(&self.metrics.extension_thresholds);
        if thresholds.any(|t| !t.is_finite()) {
            return Err(ConfigError::Invalid(
                "metric thresholds must be finite".to_string(),
            ));
        }
        if self.server.body_limit_mb == 0 {
            return Err(ConfigError::Invalid(
                "server.body_limit_mb must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Socket address string `host:port`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn body_limit_bytes(&self) -> usize {
        self.server.body_limit_mb * 1024 * 1024
    }

    pub fn ingest_options(&self) -> IngestOptions {
        IngestOptions {
            time_columns: self.ingest.time_columns.clone(),
            date_columns: self.ingest.date_columns.clone(),
        }
    }

    pub fn dashboard_settings(&self) -> DashboardSettings {
        DashboardSettings {
            retracement_width: self.binning.retracement_width,
            extension_width: self.binning.extension_width,
            retracement_thresholds: self.metrics.retracement_thresholds.clone(),
            extension_thresholds: self.metrics.extension_thresholds.clone(),
            retracement_focus: self.axis.retracement_focus.clone(),
            extension_focus: self.axis.extension_focus.clone(),
        }
    }
}
