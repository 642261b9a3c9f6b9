//! Static file sharing over HTTP/1.1
//!
//! Three serving strategies bound to path patterns: plain sharing with
//! index-file fallback, single-range partial content, and a directory
//! browser. Files are streamed from disk in fixed-size chunks.

pub mod config;
pub mod fs;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;
