//! File serving strategies
//!
//! - [`share_files_from_directory`]: streams a file, with index-file fallback
//!   for folder requests.
//! - [`directory`]: range-aware serving of `root/captured` (200, 206, 416, 400).
//! - [`directory_browser`]: HTML listing for folders, raw content for files.
//!
//! Every unresolvable or unreadable target becomes 404. Streaming bodies are
//! produced after the status line is committed, so a read failure part-way
//! through can only cut the body short; it is logged, not reported to the client.

use super::listing;
use super::request::RequestView;
use super::resolve::{join_captured, resolve_share_path};
use super::{Handler, ShareConfig};
use crate::fs::{with_file_opened_for_reading, FileHandle};
use crate::http::range::{parse_range_header, RangeError};
use crate::http::{mime, BodyWriter, HttpResponse};
use crate::logger;
use hyper::StatusCode;
use std::path::Path;
use std::sync::Arc;

/// Share the files under `config.root`
pub fn share_files_from_directory(config: ShareConfig) -> Handler {
    Arc::new(move |request| serve_shared_file(&config, request))
}

/// Serve `config.root/captured`, honouring a single-range `Range` header
pub fn directory(config: ShareConfig) -> Handler {
    Arc::new(move |request| serve_with_range(&config, request))
}

/// Browse `config.root/captured`: list folders, return files whole
pub fn directory_browser(config: ShareConfig) -> Handler {
    Arc::new(move |request| browse(&config, request))
}

fn serve_shared_file(config: &ShareConfig, request: &RequestView) -> HttpResponse {
    let Some(path) = resolve_share_path(config, request) else {
        logger::log_debug(&format!("Nothing to share for {}", request.path));
        return HttpResponse::NotFound;
    };
    let Some(file) = open_or_log(&path) else {
        return HttpResponse::NotFound;
    };

    let mut headers = vec![("Content-Type", mime::content_type_for(&path).to_string())];
    let length = match file.size() {
        Ok(size) => {
            headers.push(("Content-Length", size.to_string()));
            Some(size)
        }
        Err(_) => None,
    };

    HttpResponse::Raw {
        status: StatusCode::OK,
        headers,
        writer: Some(stream_file(file, 0, length, config.chunk_size)),
    }
}

fn serve_with_range(config: &ShareConfig, request: &RequestView) -> HttpResponse {
    let Some(path) = request
        .first_param()
        .and_then(|captured| join_captured(&config.root, captured))
    else {
        return HttpResponse::NotFound;
    };
    let Some(file) = open_or_log(&path) else {
        return HttpResponse::NotFound;
    };
    let total_size = match file.size() {
        Ok(size) => size,
        Err(e) => {
            logger::log_warning(&format!("Failed to stat '{}': {e}", path.display()));
            return HttpResponse::NotFound;
        }
    };

    let content_type = mime::content_type_for(&path).to_string();
    match parse_range_header(request.header("range"), total_size) {
        Ok(None) => HttpResponse::Raw {
            status: StatusCode::OK,
            headers: vec![
                ("Content-Type", content_type),
                ("Content-Length", total_size.to_string()),
                ("Accept-Ranges", "bytes".to_string()),
            ],
            writer: Some(stream_file(file, 0, Some(total_size), config.chunk_size)),
        },
        Ok(Some(range)) => HttpResponse::Raw {
            status: StatusCode::PARTIAL_CONTENT,
            headers: vec![
                ("Content-Type", content_type),
                ("Content-Length", range.content_length().to_string()),
                ("Content-Range", range.content_range()),
                ("Accept-Ranges", "bytes".to_string()),
            ],
            writer: Some(stream_file(
                file,
                range.start(),
                Some(range.content_length()),
                config.chunk_size,
            )),
        },
        Err(e @ RangeError::BadRequest { .. }) => HttpResponse::BadRequest(e.to_string()),
        Err(e) => {
            logger::log_debug(&format!("{}: {e}", request.path));
            HttpResponse::range_not_satisfiable()
        }
    }
}

fn browse(config: &ShareConfig, request: &RequestView) -> HttpResponse {
    let Some(path) = request
        .first_param()
        .and_then(|captured| join_captured(&config.root, captured))
    else {
        return HttpResponse::NotFound;
    };
    let Ok(metadata) = std::fs::metadata(&path) else {
        return HttpResponse::NotFound;
    };

    if metadata.is_dir() {
        return listing::directory_listing(&path, &request.path);
    }

    match with_file_opened_for_reading(&path, FileHandle::read_to_end) {
        Ok(content) => HttpResponse::raw_bytes(
            StatusCode::OK,
            vec![("Content-Type", mime::content_type_for(&path).to_string())],
            content,
        ),
        Err(e) => {
            logger::log_warning(&format!("Failed to read '{}': {e}", path.display()));
            HttpResponse::NotFound
        }
    }
}

fn open_or_log(path: &Path) -> Option<FileHandle> {
    match FileHandle::open_for_reading(path) {
        Ok(file) => Some(file),
        Err(e) => {
            logger::log_debug(&format!("Cannot open '{}': {e}", path.display()));
            None
        }
    }
}

/// Body writer emitting `length` bytes (or everything) from `start`
///
/// The handle moves into the writer and is closed when it finishes, fails,
/// or is dropped unrun.
fn stream_file(mut file: FileHandle, start: u64, length: Option<u64>, chunk_size: usize) -> BodyWriter {
    BodyWriter::new(move |out| {
        if start > 0 {
            file.seek(start)?;
        }
        let chunks = match length {
            Some(limit) => file.chunks_limited(chunk_size, limit),
            None => file.chunks(chunk_size),
        };
        for chunk in chunks {
            out.write(&chunk?)?;
        }
        file.close();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONTENT: &[u8] = b"The quick brown fox jumps over the lazy dog. 0123456789 abcdefghijklmnopqrstuvwxyz!";

    fn fixture() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fox.txt"), CONTENT).unwrap();
        fs::create_dir(dir.path().join("site")).unwrap();
        fs::write(dir.path().join("site/index.html"), "<h1>home</h1>").unwrap();
        fs::create_dir(dir.path().join("empty")).unwrap();
        dir
    }

    fn file_request(prefix: &str, name: &str) -> RequestView {
        RequestView::new(format!("{prefix}/{name}")).with_param("path", name)
    }

    fn ranged(name: &str, range: &str) -> RequestView {
        file_request("/media", name).with_header("Range", range)
    }

    fn body(response: HttpResponse) -> Vec<u8> {
        response.into_body_bytes().unwrap()
    }

    #[test]
    fn test_share_streams_whole_file() {
        let dir = fixture();
        let handler = share_files_from_directory(ShareConfig::new(dir.path()));
        let response = handler(&file_request("/public", "fox.txt"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("Content-Type"), Some("text/plain; charset=utf-8"));
        assert_eq!(response.header("Content-Length"), Some(CONTENT.len().to_string().as_str()));
        assert!(response.header("Content-Range").is_none());
        assert_eq!(body(response), CONTENT);
    }

    #[test]
    fn test_share_chunk_size_does_not_change_body() {
        let dir = fixture();
        for chunk_size in [1, 7, 64, 4096] {
            let handler = share_files_from_directory(ShareConfig::new(dir.path()).with_chunk_size(chunk_size));
            assert_eq!(body(handler(&file_request("/public", "fox.txt"))), CONTENT);
        }
    }

    #[test]
    fn test_share_index_fallback() {
        let dir = fixture();
        let handler = share_files_from_directory(ShareConfig::new(dir.path()));

        let request = RequestView::new("/public/site/").with_param("path", "site");
        let response = handler(&request);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response), b"<h1>home</h1>");

        let request = RequestView::new("/public/empty/").with_param("path", "empty");
        assert!(matches!(handler(&request), HttpResponse::NotFound));

        assert!(matches!(handler(&RequestView::new("/public/")), HttpResponse::NotFound));
    }

    #[test]
    fn test_share_missing_file_is_not_found() {
        let dir = fixture();
        let handler = share_files_from_directory(ShareConfig::new(dir.path()));
        assert!(matches!(
            handler(&file_request("/public", "nope.txt")),
            HttpResponse::NotFound
        ));
    }

    #[test]
    fn test_range_full_body_without_header() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()));
        let response = handler(&file_request("/media", "fox.txt"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.header("Accept-Ranges"), Some("bytes"));
        assert!(response.header("Content-Range").is_none());
        assert_eq!(body(response), CONTENT);
    }

    #[test]
    fn test_range_partial_content() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()).with_chunk_size(3));
        let n = CONTENT.len();
        for (start, end) in [(0, 0), (0, 9), (4, 18), (n - 1, n - 1), (0, n - 1)] {
            let response = handler(&ranged("fox.txt", &format!("bytes={start}-{end}")));
            assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
            assert_eq!(
                response.header("Content-Range"),
                Some(format!("bytes {start}-{end}/{n}").as_str())
            );
            assert_eq!(
                response.header("Content-Length"),
                Some((end - start + 1).to_string().as_str())
            );
            assert_eq!(body(response), &CONTENT[start..=end]);
        }
    }

    #[test]
    fn test_range_one_past_end_not_satisfiable() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()));
        let response = handler(&ranged("fox.txt", &format!("bytes=0-{}", CONTENT.len())));
        assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
        assert!(response.header("Content-Range").is_none());
        assert!(body(response).is_empty());
    }

    #[test]
    fn test_range_wrong_unit_is_bad_request() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()));
        let response = handler(&ranged("fox.txt", "lines=1-2"));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(String::from_utf8(body(response)).unwrap().contains("lines=1-2"));
    }

    #[test]
    fn test_range_malformed_serves_whole_file() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()));
        for header in ["bytes=abc", "bytes=3-", "bytes=1-2-3"] {
            let response = handler(&ranged("fox.txt", header));
            assert_eq!(response.status(), StatusCode::OK, "{header}");
            assert_eq!(body(response), CONTENT);
        }
    }

    #[test]
    fn test_range_missing_file_or_param() {
        let dir = fixture();
        let handler = directory(ShareConfig::new(dir.path()));
        assert!(matches!(handler(&ranged("absent.bin", "bytes=0-1")), HttpResponse::NotFound));
        assert!(matches!(handler(&RequestView::new("/media/")), HttpResponse::NotFound));
        assert!(matches!(handler(&file_request("/media", "site")), HttpResponse::NotFound));
    }

    #[test]
    fn test_browser_lists_directory() {
        let dir = fixture();
        let handler = directory_browser(ShareConfig::new(dir.path()));
        let response = handler(&RequestView::new("/files/site").with_param("path", "site"));
        assert_eq!(response.status(), StatusCode::OK);
        let html = String::from_utf8(body(response)).unwrap();
        assert!(html.contains("<a href=\"/files/site/index.html\">index.html</a>"));
    }

    #[test]
    fn test_browser_root_listing_has_every_child() {
        let dir = fixture();
        let handler = directory_browser(ShareConfig::new(dir.path()));
        let response = handler(&RequestView::new("/files/.").with_param("path", "."));
        let html = String::from_utf8(body(response)).unwrap();
        for child in ["fox.txt", "site", "empty"] {
            assert!(html.contains(&format!("href=\"/files/./{child}\"")), "{child}");
        }
    }

    #[test]
    fn test_browser_returns_file_content() {
        let dir = fixture();
        let handler = directory_browser(ShareConfig::new(dir.path()));
        let response = handler(&file_request("/files", "fox.txt"));
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body(response), CONTENT);
    }

    #[test]
    fn test_browser_missing_path_is_not_found() {
        let dir = fixture();
        let handler = directory_browser(ShareConfig::new(dir.path()));
        assert!(matches!(handler(&file_request("/files", "ghost")), HttpResponse::NotFound));
        assert!(matches!(handler(&RequestView::new("/files/")), HttpResponse::NotFound));
    }

    #[test]
    fn test_concurrent_downloads_are_independent() {
        let dir = fixture();
        let share = share_files_from_directory(ShareConfig::new(dir.path()).with_chunk_size(5));
        let ranged_handler = directory(ShareConfig::new(dir.path()).with_chunk_size(5));

        let workers: Vec<_> = (0..16)
            .map(|i| {
                let share = Arc::clone(&share);
                let ranged_handler = Arc::clone(&ranged_handler);
                std::thread::spawn(move || {
                    if i % 2 == 0 {
                        body(share(&file_request("/public", "fox.txt")))
                    } else {
                        body(ranged_handler(&ranged("fox.txt", "bytes=10-29")))
                    }
                })
            })
            .collect();

        for (i, worker) in workers.into_iter().enumerate() {
            let received = worker.join().unwrap();
            if i % 2 == 0 {
                assert_eq!(received, CONTENT);
            } else {
                assert_eq!(received, &CONTENT[10..=29]);
            }
        }
    }
}
