//! Incremental response writer
//!
//! A [`BodyWriter`] is the capability a handler hands back to produce a body
//! chunk by chunk. The transport runs it once after the status line and
//! headers are committed; it may call [`ResponseWriter::write`] any number of
//! times and must not write after it returns.

use crate::fs::FileError;
use hyper::body::Bytes;
use std::fmt;
use std::io;
use thiserror::Error;
use tokio::sync::mpsc;

/// Sink accepting body chunks
pub trait ResponseWriter {
    /// Hand one chunk to the transport, blocking until it is accepted
    fn write(&mut self, chunk: &[u8]) -> io::Result<()>;
}

impl ResponseWriter for Vec<u8> {
    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.extend_from_slice(chunk);
        Ok(())
    }
}

/// Writer feeding a streaming hyper body through a bounded channel
///
/// Must run on a thread that may block (tokio's blocking pool).
#[derive(Debug)]
pub struct ChannelWriter {
    tx: mpsc::Sender<Bytes>,
}

impl ChannelWriter {
    pub const fn new(tx: mpsc::Sender<Bytes>) -> Self {
        Self { tx }
    }
}

impl ResponseWriter for ChannelWriter {
    fn write(&mut self, chunk: &[u8]) -> io::Result<()> {
        if chunk.is_empty() {
            return Ok(());
        }
        self.tx
            .blocking_send(Bytes::copy_from_slice(chunk))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "response stream closed"))
    }
}

/// Why a body writer stopped early
#[derive(Debug, Error)]
pub enum WriteError {
    /// Reading the source file failed; the body is truncated
    #[error(transparent)]
    File(#[from] FileError),
    /// The transport stopped accepting chunks (client went away)
    #[error("response stream closed: {0}")]
    Closed(#[from] io::Error),
}

type WriteFn = Box<dyn FnOnce(&mut dyn ResponseWriter) -> Result<(), WriteError> + Send>;

/// One-shot body producer
pub struct BodyWriter(WriteFn);

impl BodyWriter {
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut dyn ResponseWriter) -> Result<(), WriteError> + Send + 'static,
    {
        Self(Box::new(f))
    }

    /// Writer emitting `data` as a single chunk
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        Self::new(move |out| Ok(out.write(&data)?))
    }

    /// Run the producer against `out`
    pub fn write_to(self, out: &mut dyn ResponseWriter) -> Result<(), WriteError> {
        (self.0)(out)
    }
}

impl fmt::Debug for BodyWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BodyWriter(..)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec_writer_collects_chunks() {
        let writer = BodyWriter::new(|out| {
            out.write(b"hello ")?;
            out.write(b"world")?;
            Ok(())
        });
        let mut body = Vec::new();
        writer.write_to(&mut body).unwrap();
        assert_eq!(body, b"hello world");
    }

    #[test]
    fn test_closed_channel_is_terminal() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut out = ChannelWriter::new(tx);
        let err = BodyWriter::from_bytes("data").write_to(&mut out).unwrap_err();
        assert!(matches!(err, WriteError::Closed(_)));
    }

    #[test]
    fn test_channel_writer_delivers_in_order() {
        let (tx, mut rx) = mpsc::channel(4);
        let producer = std::thread::spawn(move || {
            let mut out = ChannelWriter::new(tx);
            for chunk in [&b"a"[..], b"bc", b"", b"def"] {
                out.write(chunk).unwrap();
            }
        });
        let mut received = Vec::new();
        while let Some(chunk) = rx.blocking_recv() {
            received.extend_from_slice(&chunk);
        }
        producer.join().unwrap();
        assert_eq!(received, b"abcdef");
    }
}
