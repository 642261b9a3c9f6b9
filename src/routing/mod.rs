//! Routing module
//!
//! - Path patterns with literal, `:param` and `*` segments
//! - An ordered table mapping patterns to file-serving handlers

mod matcher;
mod table;

pub use matcher::RoutePattern;
pub use table::{RouteMatch, RouteTable};
