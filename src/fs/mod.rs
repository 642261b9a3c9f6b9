//! Platform file access module
//!
//! Thin wrapper over the OS file primitives with an explicit error taxonomy.
//! A [`FileHandle`] owns its descriptor and releases it when dropped, so every
//! exit path (early return, `?`, panic unwinding) closes the file exactly once.

mod error;
mod file;

pub use error::FileError;
pub use file::{
    current_working_directory, with_file_opened_for_read_write, with_file_opened_for_reading,
    with_new_file_opened_for_writing, Chunks, FileHandle,
};
