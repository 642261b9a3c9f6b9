//! Root index listing the registered routes

use crate::http::{HttpResponse, ResponseBody};
use std::fmt::Write;

/// "Available services" page linking every registered pattern
pub fn services_page<'a>(patterns: impl IntoIterator<Item = &'a str>) -> HttpResponse {
    let mut html = String::from("Available services:<br><ul>");
    for pattern in patterns {
        let _ = write!(html, "<li><a href=\"{pattern}\">{pattern}</a></li>");
    }
    html.push_str("</ul>");
    HttpResponse::Ok(ResponseBody::Html(html))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_patterns_in_order() {
        let response = services_page(["/public/*", "/files/*"]);
        let HttpResponse::Ok(ResponseBody::Html(html)) = response else {
            panic!("expected html");
        };
        assert_eq!(
            html,
            "Available services:<br><ul>\
             <li><a href=\"/public/*\">/public/*</a></li>\
             <li><a href=\"/files/*\">/files/*</a></li></ul>"
        );
    }
}
