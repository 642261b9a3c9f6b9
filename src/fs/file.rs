//! Owned file handle and scoped-acquisition helpers

use super::error::FileError;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Seek, SeekFrom, Write};
use std::iter::FusedIterator;
use std::path::Path;

/// An open OS file, exclusively owned by whoever opened it
///
/// Dropping the handle closes the descriptor. [`FileHandle::close`] only makes
/// the release point explicit; it consumes the handle so it cannot run twice.
#[derive(Debug)]
pub struct FileHandle {
    file: File,
}

impl FileHandle {
    /// Open an existing file for reading (`rb`)
    ///
    /// Directories are refused here so callers never stream a directory
    /// descriptor as if it were file content.
    pub fn open_for_reading(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let handle = Self::open_with(path.as_ref(), OpenOptions::new().read(true))?;
        match handle.file.metadata() {
            Ok(meta) if meta.is_dir() => Err(FileError::OpenFailed("Is a directory".to_string())),
            Ok(_) => Ok(handle),
            Err(e) => Err(FileError::open(&e)),
        }
    }

    /// Create or truncate a file for writing (`wb`)
    pub fn open_for_writing(path: impl AsRef<Path>) -> Result<Self, FileError> {
        Self::open_with(
            path.as_ref(),
            OpenOptions::new().write(true).create(true).truncate(true),
        )
    }

    /// Open an existing file for reading and writing (`r+b`)
    pub fn open_for_read_write(path: impl AsRef<Path>) -> Result<Self, FileError> {
        Self::open_with(path.as_ref(), OpenOptions::new().read(true).write(true))
    }

    fn open_with(path: &Path, options: &OpenOptions) -> Result<Self, FileError> {
        let file = options.open(path).map_err(|e| FileError::open(&e))?;
        Ok(Self { file })
    }

    /// Size of the file in bytes, as reported by the open descriptor
    pub fn size(&self) -> Result<u64, FileError> {
        self.file
            .metadata()
            .map(|meta| meta.len())
            .map_err(|e| FileError::read(&e))
    }

    /// Fill `buf` from the current position
    ///
    /// Returns `buf.len()` unless end-of-file is reached first, in which case
    /// the shorter count is returned. A short count therefore always means EOF.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize, FileError> {
        let mut filled = 0;
        while filled < buf.len() {
            let remaining = buf.len() - filled;
            match self.file.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) if n > remaining => {
                    return Err(FileError::ReadFailed(
                        "Unknown file read error occurred.".to_string(),
                    ));
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(FileError::read(&e)),
            }
        }
        Ok(filled)
    }

    /// Read everything from the current position to end-of-file
    pub fn read_to_end(&mut self) -> Result<Vec<u8>, FileError> {
        let mut content = Vec::new();
        self.file
            .read_to_end(&mut content)
            .map_err(|e| FileError::read(&e))?;
        Ok(content)
    }

    /// Lazy sequence of chunks of at most `chunk_size` bytes until end-of-file
    pub fn chunks(&mut self, chunk_size: usize) -> Chunks<'_> {
        Chunks {
            handle: self,
            chunk_size,
            remaining: None,
            done: false,
        }
    }

    /// Like [`FileHandle::chunks`], but stops after `limit` bytes
    pub fn chunks_limited(&mut self, chunk_size: usize, limit: u64) -> Chunks<'_> {
        Chunks {
            handle: self,
            chunk_size,
            remaining: Some(limit),
            done: false,
        }
    }

    /// Write all of `data`; a partial write is reported as a failure
    pub fn write(&mut self, data: &[u8]) -> Result<(), FileError> {
        if data.is_empty() {
            return Ok(());
        }
        self.file.write_all(data).map_err(|e| FileError::write(&e))
    }

    /// Move to an absolute offset from the start of the file
    pub fn seek(&mut self, offset: u64) -> Result<(), FileError> {
        self.file
            .seek(SeekFrom::Start(offset))
            .map(|_| ())
            .map_err(|e| FileError::seek(&e))
    }

    /// Release the descriptor now
    pub fn close(self) {
        drop(self);
    }
}

/// Chunked reader returned by [`FileHandle::chunks`]
///
/// Ends after the first short read (end-of-file), after the byte limit is
/// exhausted, or after yielding a single error.
#[derive(Debug)]
pub struct Chunks<'a> {
    handle: &'a mut FileHandle,
    chunk_size: usize,
    remaining: Option<u64>,
    done: bool,
}

impl Iterator for Chunks<'_> {
    type Item = Result<Vec<u8>, FileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.chunk_size == 0 {
            return None;
        }

        let want = match self.remaining {
            Some(0) => return None,
            Some(left) => usize::try_from(left).map_or(self.chunk_size, |l| l.min(self.chunk_size)),
            None => self.chunk_size,
        };

        let mut buf = vec![0; want];
        match self.handle.read(&mut buf) {
            Ok(0) => {
                self.done = true;
                None
            }
            Ok(n) => {
                if n < want {
                    self.done = true;
                }
                buf.truncate(n);
                if let Some(left) = self.remaining.as_mut() {
                    *left = left.saturating_sub(n as u64);
                }
                Some(Ok(buf))
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl FusedIterator for Chunks<'_> {}

/// Current working directory of the process as a UTF-8 string
pub fn current_working_directory() -> Result<String, FileError> {
    let path = std::env::current_dir().map_err(|e| FileError::cwd(&e))?;
    path.into_os_string().into_string().map_err(|_| {
        FileError::CwdFailed("Could not convert the working directory to a string".to_string())
    })
}

/// Open `path` for reading, run `f`, and close the file on every exit path
pub fn with_file_opened_for_reading<T, E, F>(path: impl AsRef<Path>, f: F) -> Result<T, E>
where
    F: FnOnce(&mut FileHandle) -> Result<T, E>,
    E: From<FileError>,
{
    let mut file = FileHandle::open_for_reading(path)?;
    f(&mut file)
}

/// Create or truncate `path`, run `f`, and close the file on every exit path
pub fn with_new_file_opened_for_writing<T, E, F>(path: impl AsRef<Path>, f: F) -> Result<T, E>
where
    F: FnOnce(&mut FileHandle) -> Result<T, E>,
    E: From<FileError>,
{
    let mut file = FileHandle::open_for_writing(path)?;
    f(&mut file)
}

/// Open `path` for reading and writing, run `f`, and close the file on every exit path
pub fn with_file_opened_for_read_write<T, E, F>(path: impl AsRef<Path>, f: F) -> Result<T, E>
where
    F: FnOnce(&mut FileHandle) -> Result<T, E>,
    E: From<FileError>,
{
    let mut file = FileHandle::open_for_read_write(path)?;
    f(&mut file)
}
