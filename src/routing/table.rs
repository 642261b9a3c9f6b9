//! Ordered route table

use super::matcher::RoutePattern;
use crate::config::{Config, ConfigError, RouteKind};
use crate::handler::{self, Handler};
use std::fmt;

/// A matched route: its handler and the captured parameters
pub struct RouteMatch<'a> {
    pub pattern: &'a str,
    pub handler: &'a Handler,
    pub params: Vec<(String, String)>,
}

/// Registered routes, matched in registration order
#[derive(Default)]
pub struct RouteTable {
    routes: Vec<(RoutePattern, Handler)>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a handler for every configured route
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let mut table = Self::new();
        for route in &config.routes {
            let share = config.share_config(route)?;
            let handler = match route.kind {
                RouteKind::Share => handler::share_files_from_directory(share),
                RouteKind::Directory => handler::directory(share),
                RouteKind::Browser => handler::directory_browser(share),
            };
            table.register(&route.pattern, handler);
        }
        Ok(table)
    }

    pub fn register(&mut self, pattern: &str, handler: Handler) {
        self.routes.push((RoutePattern::parse(pattern), handler));
    }

    /// First route whose pattern matches `path`
    pub fn route(&self, path: &str) -> Option<RouteMatch<'_>> {
        self.routes.iter().find_map(|(pattern, handler)| {
            pattern.matches(path).map(|params| RouteMatch {
                pattern: pattern.as_str(),
                handler,
                params,
            })
        })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(pattern, _)| pattern.as_str())
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}
