//! Logger module
//!
//! Logging utilities for the file server:
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Level-filtered debug, info, warning and error lines
//! - File-based logging support
//!
//! Before [`init`] runs every message goes to stdout/stderr unfiltered.

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::LogLevel;

use crate::config::Config;
use hyper::{Method, Uri, Version};
use std::net::SocketAddr;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &Config) -> std::io::Result<()> {
    let level = config
        .logging
        .level
        .parse()
        .map_err(|e: String| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    writer::init(
        level,
        config.logging.access_log_file.as_deref(),
        config.logging.error_log_file.as_deref(),
    )
}

fn write_info(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_info(level, message),
        None => println!("{message}"),
    }
}

fn write_error(level: LogLevel, message: &str) {
    match writer::get() {
        Some(w) => w.write_error(level, message),
        None => eprintln!("{message}"),
    }
}

fn write_access(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    let info = |message: &str| write_info(LogLevel::Info, message);
    info("======================================");
    info("File server started");
    info(&format!("Listening on: http://{addr}"));
    info(&format!("Log level: {}", config.logging.level));
    if let Some(workers) = config.server.workers {
        info(&format!("Worker threads: {workers}"));
    }
    for route in &config.routes {
        info(&format!(
            "Route: {} -> {} '{}'",
            route.pattern, route.kind, route.root
        ));
    }
    if let Some(ref path) = config.logging.access_log_file {
        info(&format!("Access log: {path}"));
    }
    if let Some(ref path) = config.logging.error_log_file {
        info(&format!("Error log: {path}"));
    }
    info("======================================\n");
}

pub fn log_server_stop() {
    write_info(LogLevel::Info, "Shutdown signal received, server stopping");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(
        LogLevel::Debug,
        &format!("[Connection] Accepted from: {peer_addr}"),
    );
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(
        LogLevel::Error,
        &format!("[ERROR] Failed to serve connection: {err:?}"),
    );
}

pub fn log_request(method: &Method, uri: &Uri, version: Version) {
    write_info(
        LogLevel::Debug,
        &format!("[Request] {method} {uri} {version:?}"),
    );
}

pub fn log_debug(message: &str) {
    write_info(LogLevel::Debug, &format!("[DEBUG] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(LogLevel::Warn, &format!("[WARN] {message}"));
}

pub fn log_error(message: &str) {
    write_error(LogLevel::Error, &format!("[ERROR] {message}"));
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_access(&entry.format(format));
}
