//! Read-only view of a routed request

use hyper::http::request::Parts;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;

/// What a file-serving handler sees of a request
///
/// Header names are stored lower-cased; repeated headers are joined with `", "`.
/// Bytes that are not UTF-8 are kept as U+FFFD rather than dropping the header.
/// `params` holds captured path segments in pattern order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestView {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub params: Vec<(String, String)>,
    pub query_params: Vec<(String, String)>,
}

impl RequestView {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Build from hyper request parts and the parameters captured by routing
    pub fn from_parts(parts: &Parts, params: Vec<(String, String)>) -> Self {
        let mut headers: HashMap<String, String> = HashMap::new();
        for (name, value) in &parts.headers {
            let value = String::from_utf8_lossy(value.as_bytes());
            let value = value.as_ref();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        Self {
            path: parts.uri.path().to_string(),
            headers,
            params,
            query_params: parts.uri.query().map(parse_query).unwrap_or_default(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Header value by case-insensitive name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Value of the first captured path parameter, the relative file path
    pub fn first_param(&self) -> Option<&str> {
        self.params.first().map(|(_, value)| value.as_str())
    }
}

/// Split a query string into ordered, percent-decoded pairs
pub fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(name), decode_component(value))
        })
        .collect()
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;
    use hyper::Request;

    #[test]
    fn test_from_parts() {
        let (parts, ()) = Request::builder()
            .uri("/media/clip.mp4?a=1&b=two+words&flag")
            .header("Range", "bytes=0-9")
            .header("Accept", "text/html")
            .header("accept", "*/*")
            .body(())
            .unwrap()
            .into_parts();

        let view = RequestView::from_parts(&parts, vec![("path".into(), "clip.mp4".into())]);
        assert_eq!(view.path, "/media/clip.mp4");
        assert_eq!(view.header("range"), Some("bytes=0-9"));
        assert_eq!(view.header("ACCEPT"), Some("text/html, */*"));
        assert_eq!(view.first_param(), Some("clip.mp4"));
        assert_eq!(
            view.query_params,
            vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "two words".to_string()),
                ("flag".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn test_non_utf8_header_is_kept() {
        let (parts, ()) = Request::builder()
            .uri("/media/clip.mp4")
            .header("Range", HeaderValue::from_bytes(b"\xe9bytes=0-9").unwrap())
            .body(())
            .unwrap()
            .into_parts();

        let view = RequestView::from_parts(&parts, Vec::new());
        assert_eq!(view.header("range"), Some("\u{fffd}bytes=0-9"));
    }

    #[test]
    fn test_builder_helpers() {
        let view = RequestView::new("/public/")
            .with_header("Range", "bytes=1-2")
            .with_param("path", "a.txt");
        assert_eq!(view.header("range"), Some("bytes=1-2"));
        assert_eq!(view.first_param(), Some("a.txt"));
        assert!(RequestView::new("/").first_param().is_none());
    }

    #[test]
    fn test_parse_query_decodes() {
        assert_eq!(
            parse_query("name=%E4%BD%A0%20ok&&x"),
            vec![
                ("name".to_string(), "你 ok".to_string()),
                ("x".to_string(), String::new()),
            ]
        );
    }
}
