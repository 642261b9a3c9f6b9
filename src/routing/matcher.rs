//! Route pattern matching module
//!
//! Patterns are `/`-separated segments:
//! - `name` matches the literal segment
//! - `:name` captures one non-empty segment under `name`
//! - `*` matches any one segment
//! - a trailing `*` captures the rest of the path (one or more segments)
//!   under the name `*`
//!
//! A trailing `/` is an empty final segment, so `/public/` matches only
//! `/public/`. Captured values are percent-decoded.

use percent_encoding::percent_decode_str;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard,
    Rest,
}

/// A parsed route pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    source: String,
    segments: Vec<Segment>,
}

impl RoutePattern {
    pub fn parse(pattern: &str) -> Self {
        let parts: Vec<&str> = split_path(pattern).collect();
        let last = parts.len().saturating_sub(1);
        let segments = parts
            .iter()
            .enumerate()
            .map(|(i, part)| match *part {
                "*" if i == last => Segment::Rest,
                "*" => Segment::Wildcard,
                p if p.len() > 1 && p.starts_with(':') => Segment::Param(p[1..].to_string()),
                p => Segment::Literal(p.to_string()),
            })
            .collect();

        Self {
            source: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Captured `(name, value)` pairs if `path` matches
    pub fn matches(&self, path: &str) -> Option<Vec<(String, String)>> {
        let parts: Vec<&str> = split_path(path).collect();
        let mut params = Vec::new();

        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Rest => {
                    let rest = parts.get(i..)?;
                    if rest.is_empty() || rest.iter().all(|p| p.is_empty()) {
                        return None;
                    }
                    params.push(("*".to_string(), decode(&rest.join("/"))));
                    return Some(params);
                }
                Segment::Literal(literal) => {
                    if *parts.get(i)? != literal.as_str() {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i).filter(|p| !p.is_empty())?;
                    params.push((name.clone(), decode(value)));
                }
                Segment::Wildcard => {
                    parts.get(i).filter(|p| !p.is_empty())?;
                }
            }
        }

        (parts.len() == self.segments.len()).then_some(params)
    }
}

fn split_path(path: &str) -> std::str::Split<'_, char> {
    path.strip_prefix('/').unwrap_or(path).split('/')
}

fn decode(raw: &str) -> String {
    percent_decode_str(raw).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture(pattern: &str, path: &str) -> Option<Vec<(String, String)>> {
        RoutePattern::parse(pattern).matches(path)
    }

    fn rest(value: &str) -> Option<Vec<(String, String)>> {
        Some(vec![("*".to_string(), value.to_string())])
    }

    #[test]
    fn test_trailing_wildcard_captures_rest() {
        assert_eq!(capture("/public/*", "/public/a.txt"), rest("a.txt"));
        assert_eq!(capture("/public/*", "/public/css/site.css"), rest("css/site.css"));
        assert_eq!(capture("/public/*", "/public/docs/"), rest("docs/"));
    }

    #[test]
    fn test_trailing_wildcard_needs_something() {
        assert_eq!(capture("/public/*", "/public/"), None);
        assert_eq!(capture("/public/*", "/public"), None);
        assert_eq!(capture("/public/*", "/other/a.txt"), None);
    }

    #[test]
    fn test_trailing_slash_is_significant() {
        assert_eq!(capture("/public/", "/public/"), Some(vec![]));
        assert_eq!(capture("/public/", "/public"), None);
        assert_eq!(capture("/public/", "/public/a"), None);
        assert_eq!(capture("/", "/"), Some(vec![]));
    }

    #[test]
    fn test_named_params_and_single_wildcard() {
        assert_eq!(
            capture("/u/:user/*/raw", "/u/ann/any/raw"),
            Some(vec![("user".to_string(), "ann".to_string())])
        );
        assert_eq!(capture("/u/:user", "/u/"), None);
        assert_eq!(capture("/u/*/raw", "/u//raw"), None);
    }

    #[test]
    fn test_captures_are_percent_decoded() {
        assert_eq!(capture("/files/*", "/files/my%20notes.txt"), rest("my notes.txt"));
        assert_eq!(
            capture("/f/:name", "/f/%E4%BD%A0"),
            Some(vec![("name".to_string(), "你".to_string())])
        );
    }
}
