//! Editor configuration management
//!
//! Settings live in `<config_dir>/BlockPage/config.json`. Missing or broken
//! files fall back to defaults.

use crate::host::HostOptions;
use blockpage_control::DEFAULT_BASE_URL;
use blockpage_core::{IVec2, LogConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Layout service base URL
    pub api_base_url: String,
    /// Per-request timeout in seconds (none = no timeout)
    pub request_timeout_secs: Option<u64>,
    /// Page opened at startup
    pub start_page: String,
    /// Developer mode at startup
    pub developer_mode: bool,
    /// Window size relative block sizes refer to
    pub viewport: IVec2,
    /// Container blocks are positioned in
    pub container: IVec2,
    /// Where new blocks appear
    pub default_position: IVec2,
    /// Logging settings
    pub log: LogConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let host = HostOptions::default();
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: Some(30),
            start_page: "/home".to_string(),
            developer_mode: false,
            viewport: host.viewport,
            container: host.container,
            default_position: host.default_position,
            log: LogConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Default location of the config file
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("BlockPage");
            p.push("config.json");
            p
        })
    }

    /// Load configuration from the default location
    pub fn load() -> Self {
        Self::config_path()
            .map(|path| Self::load_from(&path))
            .unwrap_or_default()
    }

    /// Load configuration from `path`, falling back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match fs::read_to_string(path).map(|content| serde_json::from_str(&content)) {
            Ok(Ok(config)) => config,
            Ok(Err(e)) => {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Could not read config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<(), std::io::Error> {
        match Self::config_path() {
            Some(path) => self.save_to(&path),
            None => Ok(()),
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Request timeout as a duration
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Host geometry settings
    pub fn host_options(&self) -> HostOptions {
        HostOptions {
            container: self.container,
            viewport: self.viewport,
            default_position: self.default_position,
        }
    }
}
