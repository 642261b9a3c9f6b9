//! Response body type
//!
//! [`ServeBody`] is either a buffered payload, a stream of chunks produced by a
//! [`BodyWriter`](super::writer::BodyWriter) on the blocking pool, or empty.

use http_body_util::Full;
use hyper::body::{Body, Bytes, Frame, SizeHint};
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

#[derive(Debug, Default)]
pub enum ServeBody {
    /// Whole body already in memory
    Full(Full<Bytes>),
    /// Chunks arriving from a body writer; ends when the writer drops its sender
    Stream(mpsc::Receiver<Bytes>),
    /// No body (404 without text, 416, HEAD)
    #[default]
    Empty,
}

impl ServeBody {
    pub fn full(data: impl Into<Bytes>) -> Self {
        Self::Full(Full::new(data.into()))
    }
}

impl Body for ServeBody {
    type Data = Bytes;
    type Error = Infallible;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut() {
            Self::Full(full) => Pin::new(full).poll_frame(cx),
            Self::Stream(rx) => rx
                .poll_recv(cx)
                .map(|chunk| chunk.map(|data| Ok(Frame::data(data)))),
            Self::Empty => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match self {
            Self::Full(full) => full.is_end_stream(),
            Self::Stream(_) => false,
            Self::Empty => true,
        }
    }

    fn size_hint(&self) -> SizeHint {
        match self {
            Self::Full(full) => full.size_hint(),
            Self::Stream(_) => SizeHint::default(),
            Self::Empty => SizeHint::with_exact(0),
        }
    }
}
