// Configuration types module
// Defines all configuration-related data structures

use crate::logger::AccessLogFormat;
use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub site: SiteConfig,
    pub http: HttpConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Site configuration - what gets served and how misses are answered
#[derive(Debug, Deserialize, Clone)]
pub struct SiteConfig {
    /// Build output directory of the single-page application
    pub root_dir: PathBuf,
    /// Root document served for `/` and for SPA fallback
    pub index_file: String,
    /// Serve the root document for unknown paths instead of 404
    pub spa_fallback: bool,
    /// Printed when the build directory is missing at startup
    pub build_hint: String,
}

impl SiteConfig {
    /// Path of the root document on disk
    pub fn index_path(&self) -> PathBuf {
        self.root_dir.join(&self.index_file)
    }
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub access_log: bool,
    /// `common` or `json`
    #[serde(default)]
    pub access_log_format: AccessLogFormat,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a connection may wait for the next request head
    pub idle_timeout: u64,
}
