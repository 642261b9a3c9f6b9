//! MIME type detection module
//!
//! Maps a served file's extension to a `Content-Type` value.

use std::path::Path;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Get MIME Content-Type for a file path, by extension (case-insensitive)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use static_share::http::mime::content_type_for;
/// assert_eq!(content_type_for(Path::new("index.HTML")), "text/html; charset=utf-8");
/// assert_eq!(content_type_for(Path::new("clip.mp4")), "video/mp4");
/// assert_eq!(content_type_for(Path::new("README")), "application/octet-stream");
/// ```
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return DEFAULT_CONTENT_TYPE;
    };

    match ext.to_ascii_lowercase().as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css",
        "txt" | "md" | "log" => "text/plain; charset=utf-8",
        "csv" => "text/csv",
        "xml" => "application/xml",
        "js" | "mjs" => "application/javascript",
        "json" => "application/json",
        "wasm" => "application/wasm",

        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "webp" => "image/webp",

        // Range requests mostly target media
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "ogv" => "video/ogg",
        "mov" => "video/quicktime",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",

        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",

        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",

        _ => DEFAULT_CONTENT_TYPE,
    }
}
