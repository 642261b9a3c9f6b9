// Configuration module entry point
// Loads, validates and exposes the server configuration

mod state;
mod types;

use crate::fs;
use crate::handler::ShareConfig;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Re-export public types
pub use state::AppState;
pub use types::{
    default_routes, Config, FilesConfig, LoggingConfig, PerformanceConfig, RouteConfig, RouteKind,
    ServerConfig,
};

/// Configuration rejected at startup
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Load(#[from] config::ConfigError),
    #[error("files.chunk_size must be greater than zero")]
    ZeroChunkSize,
    #[error("files.index_files must name at least one file")]
    NoIndexFiles,
    #[error("route pattern '{0}' must start with '/'")]
    BadPattern(String),
    #[error("invalid listen address: {0}")]
    BadAddress(String),
    #[error("cannot resolve route root '{root}': {source}")]
    Root {
        root: String,
        #[source]
        source: fs::FileError,
    },
}

impl Config {
    /// Load configuration from specified file path (without extension)
    ///
    /// The file is optional; `SHARE_`-prefixed environment variables override
    /// it, with `__` between nested keys (`SHARE_SERVER__PORT=9000`).
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix("SHARE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("files.index_files", vec!["index.html", "index.htm"])?
            .set_default("files.chunk_size", 64)?
            .set_default("files.stream_buffer", 16)?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.files.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.files.index_files.is_empty() {
            return Err(ConfigError::NoIndexFiles);
        }
        if let Some(route) = self.routes.iter().find(|r| !r.pattern.starts_with('/')) {
            return Err(ConfigError::BadPattern(route.pattern.clone()));
        }
        self.get_socket_addr().map(|_| ())
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| ConfigError::BadAddress(format!("{e}")))
    }

    /// Handler settings for `route`, with a relative root anchored at the
    /// current working directory
    pub fn share_config(&self, route: &RouteConfig) -> Result<ShareConfig, ConfigError> {
        let root = if Path::new(&route.root).is_absolute() {
            PathBuf::from(&route.root)
        } else {
            let cwd = fs::current_working_directory().map_err(|source| ConfigError::Root {
                root: route.root.clone(),
                source,
            })?;
            Path::new(&cwd).join(&route.root)
        };

        Ok(ShareConfig::new(root)
            .with_index_files(self.files.index_files.clone())
            .with_chunk_size(self.files.chunk_size))
    }
}
