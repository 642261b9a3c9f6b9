//! Directory listing rendering

use crate::http::{HttpResponse, ResponseBody};
use crate::logger;
use std::fmt::Write;
use std::io;
use std::path::Path;

/// One immediate child of a listed directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: String,
}

/// Immediate entries of `dir`, in the order the platform enumerates them
pub fn list_directory(dir: &Path) -> io::Result<Vec<DirectoryEntry>> {
    std::fs::read_dir(dir)?
        .map(|entry| {
            entry.map(|e| DirectoryEntry {
                name: e.file_name().to_string_lossy().into_owned(),
            })
        })
        .collect()
}

/// Minimal HTML index: the resolved path as a heading, then one table row
/// per entry linking to `{request_path}/{name}`
pub fn render_listing(resolved: &Path, request_path: &str, entries: &[DirectoryEntry]) -> String {
    let mut html = format!(
        "<h3>{}</h3></br><table>",
        escape_html(&resolved.to_string_lossy())
    );
    for entry in entries {
        let name = escape_html(&entry.name);
        let _ = write!(
            html,
            "<tr><td><a href=\"{}/{name}\">{name}</a></td></tr>",
            escape_html(request_path)
        );
    }
    html.push_str("</table>");
    html
}

/// Listing response for `dir`; enumeration failure is reported as 404
pub fn directory_listing(dir: &Path, request_path: &str) -> HttpResponse {
    match list_directory(dir) {
        Ok(entries) => {
            HttpResponse::Ok(ResponseBody::Html(render_listing(dir, request_path, &entries)))
        }
        Err(e) => {
            logger::log_warning(&format!(
                "Failed to list directory '{}': {e}",
                dir.display()
            ));
            HttpResponse::NotFound
        }
    }
}

fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
