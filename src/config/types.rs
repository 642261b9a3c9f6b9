// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub files: FilesConfig,
    /// Served routes, matched in order
    #[serde(default = "default_routes")]
    pub routes: Vec<RouteConfig>,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Minimum level: error, warn, info or debug
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (optional, stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (optional, stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    /// Seconds a client may take to send request headers; zero disables
    pub read_timeout: u64,
    pub max_connections: Option<u64>,
}

/// File serving configuration shared by every route
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FilesConfig {
    /// Tried in order when a shared folder is requested
    pub index_files: Vec<String>,
    /// Bytes read from disk per streamed chunk
    pub chunk_size: usize,
    /// Chunks buffered between the file reader and the connection
    pub stream_buffer: usize,
}

/// Serving strategy of a route
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Stream files, with index-file fallback for folders
    Share,
    /// Range-aware file serving
    Directory,
    /// Folder listings and whole-file reads
    Browser,
}

impl fmt::Display for RouteKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Share => "share",
            Self::Directory => "directory",
            Self::Browser => "browser",
        })
    }
}

/// One `[[routes]]` entry
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct RouteConfig {
    /// Path pattern, e.g. `/public/*`
    pub pattern: String,
    #[serde(rename = "type")]
    pub kind: RouteKind,
    /// Served folder; relative paths are taken from the working directory
    pub root: String,
}

impl RouteConfig {
    pub fn new(pattern: &str, kind: RouteKind, root: &str) -> Self {
        Self {
            pattern: pattern.to_string(),
            kind,
            root: root.to_string(),
        }
    }
}

/// Routes served when the configuration names none
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("/public/*", RouteKind::Share, "public"),
        RouteConfig::new("/public/", RouteKind::Share, "public"),
        RouteConfig::new("/files/*", RouteKind::Browser, "."),
        RouteConfig::new("/media/*", RouteKind::Directory, "public"),
    ]
}
