//! Request path to filesystem path resolution

use super::request::RequestView;
use super::ShareConfig;
use crate::logger;
use std::path::{Component, Path, PathBuf};

/// Join a captured relative path onto `root` as `root + "/" + captured`
///
/// Returns `None` when the captured value tries to climb out of `root`.
pub fn join_captured(root: &Path, captured: &str) -> Option<PathBuf> {
    if Path::new(captured)
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
        logger::log_warning(&format!("Path traversal attempt blocked: {captured}"));
        return None;
    }

    let mut joined = root.as_os_str().to_os_string();
    joined.push("/");
    joined.push(captured);
    Some(PathBuf::from(joined))
}

/// Pick the file to share for a request
///
/// A request naming a file (path not ending in `/`, with a captured relative
/// path) maps straight to `root/captured` without touching the disk. Otherwise
/// the request denotes a folder and the first configured index file present
/// in it wins. `None` means nothing to serve.
pub fn resolve_share_path(config: &ShareConfig, request: &RequestView) -> Option<PathBuf> {
    let captured = request.first_param();

    if !request.path.ends_with('/') {
        if let Some(captured) = captured {
            return join_captured(&config.root, captured);
        }
    }

    let folder = match captured {
        Some(captured) => join_captured(&config.root, captured)?,
        None => config.root.clone(),
    };

    config.index_files.iter().find_map(|index_file| {
        let candidate = join_captured(&folder, index_file)?;
        candidate.exists().then_some(candidate)
    })
}
