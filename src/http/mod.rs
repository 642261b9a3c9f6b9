//! HTTP protocol layer module
//!
//! Range parsing, MIME detection, response bodies and builders, decoupled
//! from the file-serving strategies that use them.

pub mod body;
pub mod mime;
pub mod range;
pub mod response;
pub mod writer;

// Re-export commonly used types
pub use body::ServeBody;
pub use range::{parse_range_header, ByteRange, RangeError};
pub use response::{build_response, HttpResponse, ResponseBody};
pub use writer::{BodyWriter, ResponseWriter, WriteError};
