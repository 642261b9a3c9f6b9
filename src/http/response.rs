//! HTTP response building module
//!
//! [`HttpResponse`] is what file-serving handlers produce; the builders here
//! turn it into a hyper response, running any body writer on the blocking pool.

use super::body::ServeBody;
use super::writer::{BodyWriter, ChannelWriter, WriteError};
use crate::logger;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use tokio::sync::mpsc;

/// Buffered body of an [`HttpResponse::Ok`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseBody {
    Html(String),
    Text(String),
}

/// Handler outcome, independent of the transport
#[derive(Debug)]
pub enum HttpResponse {
    /// 200 with a buffered body
    Ok(ResponseBody),
    /// 404
    NotFound,
    /// 400 with a plain-text diagnostic
    BadRequest(String),
    /// Arbitrary status and headers; the body, if any, is produced by `writer`
    Raw {
        status: StatusCode,
        headers: Vec<(&'static str, String)>,
        writer: Option<BodyWriter>,
    },
}

impl HttpResponse {
    /// Raw response with a single in-memory body chunk
    pub fn raw_bytes(
        status: StatusCode,
        mut headers: Vec<(&'static str, String)>,
        data: impl Into<Bytes>,
    ) -> Self {
        let data = data.into();
        headers.push(("Content-Length", data.len().to_string()));
        Self::Raw {
            status,
            headers,
            writer: Some(BodyWriter::from_bytes(data)),
        }
    }

    /// 416 without body or `Content-Range`
    pub const fn range_not_satisfiable() -> Self {
        Self::Raw {
            status: StatusCode::RANGE_NOT_SATISFIABLE,
            headers: Vec::new(),
            writer: None,
        }
    }

    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Ok(_) => StatusCode::OK,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Raw { status, .. } => *status,
        }
    }

    /// Value of a header set on a raw response
    pub fn header(&self, name: &str) -> Option<&str> {
        match self {
            Self::Raw { headers, .. } => headers
                .iter()
                .find(|(n, _)| n.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Produce the whole body in memory
    pub fn into_body_bytes(self) -> Result<Vec<u8>, WriteError> {
        match self {
            Self::Ok(ResponseBody::Html(s) | ResponseBody::Text(s)) | Self::BadRequest(s) => {
                Ok(s.into_bytes())
            }
            Self::NotFound => Ok(NOT_FOUND_BODY.as_bytes().to_vec()),
            Self::Raw { writer: None, .. } => Ok(Vec::new()),
            Self::Raw {
                writer: Some(writer),
                ..
            } => {
                let mut body = Vec::new();
                writer.write_to(&mut body)?;
                Ok(body)
            }
        }
    }
}

const NOT_FOUND_BODY: &str = "404 Not Found";

/// Convert a handler outcome into a hyper response
///
/// Raw bodies are streamed: the writer runs on tokio's blocking pool and each
/// chunk waits for room in a channel of `stream_buffer` chunks. A read error
/// after the headers went out can only truncate the body, so it is logged.
/// For HEAD requests the writer is dropped without running.
pub fn build_response(
    response: HttpResponse,
    is_head: bool,
    stream_buffer: usize,
) -> Response<ServeBody> {
    match response {
        HttpResponse::Ok(ResponseBody::Html(html)) => build_html_response(html, is_head),
        HttpResponse::Ok(ResponseBody::Text(text)) => {
            build_text_response(StatusCode::OK, text, is_head)
        }
        HttpResponse::NotFound => build_404_response(),
        HttpResponse::BadRequest(message) => build_400_response(message),
        HttpResponse::Raw {
            status,
            headers,
            writer,
        } => {
            let body = match writer {
                Some(writer) if !is_head => spawn_body_writer(writer, stream_buffer),
                _ => ServeBody::Empty,
            };
            let mut builder = Response::builder().status(status);
            for (name, value) in headers {
                builder = builder.header(name, value);
            }
            builder.body(body).unwrap_or_else(|e| {
                log_build_error(status.as_str(), &e);
                Response::new(ServeBody::Empty)
            })
        }
    }
}

fn spawn_body_writer(writer: BodyWriter, stream_buffer: usize) -> ServeBody {
    let (tx, rx) = mpsc::channel(stream_buffer.max(1));
    tokio::task::spawn_blocking(move || {
        let mut out = ChannelWriter::new(tx);
        match writer.write_to(&mut out) {
            Ok(()) => {}
            Err(WriteError::Closed(e)) => {
                logger::log_debug(&format!("Client stopped reading response: {e}"));
            }
            Err(WriteError::File(e)) => {
                logger::log_warning(&format!("Response body truncated: {e}"));
            }
        }
    });
    ServeBody::Stream(rx)
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ServeBody> {
    build_text_response(StatusCode::NOT_FOUND, NOT_FOUND_BODY.to_string(), false)
}

/// Build 400 Bad Request response with a diagnostic
pub fn build_400_response(message: String) -> Response<ServeBody> {
    build_text_response(StatusCode::BAD_REQUEST, message, false)
}

/// Build 405 Method Not Allowed response
pub fn build_405_response() -> Response<ServeBody> {
    Response::builder()
        .status(StatusCode::METHOD_NOT_ALLOWED)
        .header("Content-Type", "text/plain")
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(ServeBody::full("405 Method Not Allowed"))
        .unwrap_or_else(|e| {
            log_build_error("405", &e);
            Response::new(ServeBody::Empty)
        })
}

/// Build OPTIONS response
pub fn build_options_response() -> Response<ServeBody> {
    Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header("Allow", "GET, HEAD, OPTIONS")
        .body(ServeBody::Empty)
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(ServeBody::Empty)
        })
}

/// Build generic HTML response
pub fn build_html_response(content: String, is_head: bool) -> Response<ServeBody> {
    let content_length = content.len();
    let body = if is_head {
        ServeBody::Empty
    } else {
        ServeBody::full(content)
    };

    Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error("HTML", &e);
            Response::new(ServeBody::Empty)
        })
}

fn build_text_response(status: StatusCode, text: String, is_head: bool) -> Response<ServeBody> {
    let content_length = text.len();
    let body = if is_head {
        ServeBody::Empty
    } else {
        ServeBody::full(text)
    };

    Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .header("Content-Length", content_length)
        .body(body)
        .unwrap_or_else(|e| {
            log_build_error(status.as_str(), &e);
            Response::new(ServeBody::Empty)
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    logger::log_error(&format!("Failed to build {status} response: {error}"));
}
