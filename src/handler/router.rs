//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method validation, route
//! matching, handler dispatch on the blocking pool, and access logging.

use super::request::RequestView;
use super::services::services_page;
use crate::config::AppState;
use crate::http::{self, response, HttpResponse, ServeBody};
use crate::logger::{self, AccessLogEntry};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<ServeBody>, Infallible> {
    let started = Instant::now();
    let (parts, _) = req.into_parts();
    logger::log_request(&parts.method, &parts.uri, parts.version);

    let response = match check_http_method(&parts.method) {
        Some(resp) => resp,
        None => {
            let is_head = parts.method == Method::HEAD;
            let outcome = route_request(&parts, &state).await;
            http::build_response(outcome, is_head, state.config.files.stream_buffer)
        }
    };

    if state.config.logging.access_log {
        log_access(&parts, &response, peer_addr, started, &state);
    }
    Ok(response)
}

/// Check HTTP method and return appropriate response for non-GET/HEAD methods
fn check_http_method(method: &Method) -> Option<Response<ServeBody>> {
    match *method {
        Method::GET | Method::HEAD => None,
        Method::OPTIONS => Some(response::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(response::build_405_response())
        }
    }
}

/// Match the path and run the route's handler
///
/// Handlers do blocking file I/O, so they run on tokio's blocking pool. An
/// unmatched `/` lists the registered routes; anything else unmatched is 404.
async fn route_request(parts: &Parts, state: &Arc<AppState>) -> HttpResponse {
    let path = parts.uri.path();
    let Some((pattern, handler, params)) = state
        .routes
        .route(path)
        .map(|hit| (hit.pattern.to_string(), Arc::clone(hit.handler), hit.params))
    else {
        if path == "/" {
            return services_page(state.routes.patterns());
        }
        logger::log_debug(&format!("No route for {path}"));
        return HttpResponse::NotFound;
    };

    logger::log_debug(&format!("{path} matched {pattern}"));
    let view = RequestView::from_parts(parts, params);
    match tokio::task::spawn_blocking(move || handler(&view)).await {
        Ok(outcome) => outcome,
        Err(e) => {
            logger::log_error(&format!("Handler for {pattern} did not complete: {e}"));
            HttpResponse::Raw {
                status: hyper::StatusCode::INTERNAL_SERVER_ERROR,
                headers: vec![("Content-Type", "text/plain; charset=utf-8".to_string())],
                writer: Some(http::BodyWriter::from_bytes("500 Internal Server Error")),
            }
        }
    }
}

fn log_access(
    parts: &Parts,
    response: &Response<ServeBody>,
    peer_addr: SocketAddr,
    started: Instant,
    state: &AppState,
) {
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        parts.method.to_string(),
        parts.uri.path().to_string(),
    );
    entry.query = parts.uri.query().map(ToString::to_string);
    entry.http_version = version_label(parts.version).to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get("content-length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok());
    entry.range = header("range");
    entry.referer = header("referer");
    entry.user_agent = header("user-agent");
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

    logger::log_access(&entry, &state.config.logging.access_log_format);
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::handler::{directory, directory_browser, share_files_from_directory, ShareConfig};
    use crate::routing::RouteTable;
    use http_body_util::BodyExt;
    use hyper::StatusCode;
    use std::fs;
    use tempfile::TempDir;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    fn state(dir: &TempDir) -> Arc<AppState> {
        let share = ShareConfig::new(dir.path()).with_chunk_size(4);
        let mut routes = RouteTable::new();
        routes.register("/public/*", share_files_from_directory(share.clone()));
        routes.register("/public/", share_files_from_directory(share.clone()));
        routes.register("/files/*", directory_browser(share.clone()));
        routes.register("/media/*", directory(share));

        let mut config = Config::load_from("does-not-exist").unwrap();
        config.logging.access_log = false;
        Arc::new(AppState::with_routes(config, routes))
    }

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<p>welcome</p>").unwrap();
        fs::write(dir.path().join("notes.txt"), "0123456789").unwrap();
        fs::write(dir.path().join("my notes.txt"), "spaced").unwrap();
        dir
    }

    async fn send(state: &Arc<AppState>, req: Request<()>) -> (StatusCode, hyper::HeaderMap, Vec<u8>) {
        let response = handle_request(req, Arc::clone(state), peer()).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = response.into_body().collect().await.unwrap().to_bytes().to_vec();
        (status, headers, body)
    }

    fn get(uri: &str) -> Request<()> {
        Request::get(uri).body(()).unwrap()
    }

    #[tokio::test]
    async fn test_share_route_streams_file() {
        let dir = fixture();
        let (status, headers, body) = send(&state(&dir), get("/public/notes.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-length"], "10");
        assert_eq!(body, b"0123456789");
    }

    #[tokio::test]
    async fn test_share_root_serves_index() {
        let dir = fixture();
        let (status, _, body) = send(&state(&dir), get("/public/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"<p>welcome</p>");
    }

    #[tokio::test]
    async fn test_percent_encoded_capture() {
        let dir = fixture();
        let (status, _, body) = send(&state(&dir), get("/public/my%20notes.txt")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"spaced");
    }

    #[tokio::test]
    async fn test_range_route() {
        let dir = fixture();
        let req = Request::get("/media/notes.txt")
            .header("Range", "bytes=2-5")
            .body(())
            .unwrap();
        let (status, headers, body) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::PARTIAL_CONTENT);
        assert_eq!(headers["content-range"], "bytes 2-5/10");
        assert_eq!(body, b"2345");

        let req = Request::get("/media/notes.txt")
            .header("Range", "bytes=0-10")
            .body(())
            .unwrap();
        let (status, headers, body) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::RANGE_NOT_SATISFIABLE);
        assert!(headers.get("content-range").is_none());
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_non_utf8_range_is_bad_request() {
        let dir = fixture();
        let req = Request::get("/media/notes.txt")
            .header("Range", hyper::header::HeaderValue::from_bytes(b"\xe9bytes=0-1").unwrap())
            .body(())
            .unwrap();
        let (status, _, body) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body).unwrap().contains("bytes=0-1"));
    }

    #[tokio::test]
    async fn test_head_has_headers_without_body() {
        let dir = fixture();
        let req = Request::head("/public/notes.txt").body(()).unwrap();
        let (status, headers, body) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-length"], "10");
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_traversal_is_not_found() {
        let dir = fixture();
        let (status, _, _) = send(&state(&dir), get("/files/..%2F..%2Fetc%2Fpasswd")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_root_lists_services() {
        let dir = fixture();
        let (status, headers, body) = send(&state(&dir), get("/")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "text/html; charset=utf-8");
        let html = String::from_utf8(body).unwrap();
        assert!(html.starts_with("Available services:<br><ul>"));
        assert!(html.contains("<a href=\"/media/*\">/media/*</a>"));
    }

    #[tokio::test]
    async fn test_unknown_path_and_method() {
        let dir = fixture();
        let (status, _, body) = send(&state(&dir), get("/nowhere")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, b"404 Not Found");

        let req = Request::post("/public/notes.txt").body(()).unwrap();
        let (status, headers, _) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(headers["allow"], "GET, HEAD, OPTIONS");

        let req = Request::options("/").body(()).unwrap();
        let (status, _, _) = send(&state(&dir), req).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}
