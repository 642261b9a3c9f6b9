//! Request handler module
//!
//! File-serving strategies plus the dispatch entry point that feeds them
//! routed requests.

pub mod listing;
pub mod request;
pub mod resolve;
pub mod router;
pub mod services;
pub mod static_files;

use crate::http::HttpResponse;
use std::path::PathBuf;
use std::sync::Arc;

// Re-export main entry point
pub use request::RequestView;
pub use router::handle_request;
pub use static_files::{directory, directory_browser, share_files_from_directory};

/// A request handler bound to a route
///
/// Handlers touch the filesystem synchronously; the router runs them on the
/// blocking pool.
pub type Handler = Arc<dyn Fn(&RequestView) -> HttpResponse + Send + Sync>;

/// Index files tried, in order, for folder requests
pub const DEFAULT_INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Bytes read per streamed chunk
pub const DEFAULT_CHUNK_SIZE: usize = 64;

/// Immutable settings a serving strategy is built with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareConfig {
    pub root: PathBuf,
    pub index_files: Vec<String>,
    pub chunk_size: usize,
}

impl ShareConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: DEFAULT_INDEX_FILES.iter().map(ToString::to_string).collect(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    #[must_use]
    pub fn with_index_files(mut self, index_files: Vec<String>) -> Self {
        self.index_files = index_files;
        self
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}
