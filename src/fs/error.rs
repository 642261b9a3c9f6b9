//! File access error taxonomy

use std::io;
use thiserror::Error;

/// Failure raised by the file access layer
///
/// Every variant carries the platform's description of the last error
/// (the `strerror` text of the underlying `errno`).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FileError {
    #[error("failed to open file: {0}")]
    OpenFailed(String),
    #[error("failed to read file: {0}")]
    ReadFailed(String),
    #[error("failed to write file: {0}")]
    WriteFailed(String),
    #[error("failed to seek file: {0}")]
    SeekFailed(String),
    #[error("failed to get current working directory: {0}")]
    CwdFailed(String),
}

impl FileError {
    pub(crate) fn open(err: &io::Error) -> Self {
        Self::OpenFailed(describe(err))
    }

    pub(crate) fn read(err: &io::Error) -> Self {
        Self::ReadFailed(describe(err))
    }

    pub(crate) fn write(err: &io::Error) -> Self {
        Self::WriteFailed(describe(err))
    }

    pub(crate) fn seek(err: &io::Error) -> Self {
        Self::SeekFailed(describe(err))
    }

    pub(crate) fn cwd(err: &io::Error) -> Self {
        Self::CwdFailed(describe(err))
    }
}

/// Render an I/O error the way `strerror(errno)` would, falling back to the
/// raw error number when the platform gives no text
fn describe(err: &io::Error) -> String {
    let text = err.to_string();
    if text.is_empty() {
        err.raw_os_error()
            .map_or_else(|| "Unknown error".to_string(), |code| format!("Error: {code}"))
    } else {
        text
    }
}
