//! HTTP Range request parsing module
//!
//! Single-range `bytes=start-end` parsing for partial downloads.
//! Multi-range requests are not supported.

use std::num::IntErrorKind;
use thiserror::Error;

const RANGE_PREFIX: &str = "bytes=";

/// Inclusive byte window of a file, `start <= end < total_size`
///
/// Only [`parse_range_header`] builds one, so the invariant always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    start: u64,
    end: u64,
    total_size: u64,
}

impl ByteRange {
    /// First byte of the window
    #[inline]
    pub const fn start(&self) -> u64 {
        self.start
    }

    /// Last byte of the window (inclusive)
    #[inline]
    pub const fn end(&self) -> u64 {
        self.end
    }

    /// Size of the whole file
    #[inline]
    pub const fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of bytes in the window
    #[inline]
    pub const fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// `Content-Range` header value, e.g. `bytes 0-99/1000`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }
}

/// Range header rejection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RangeError {
    /// Header does not use the `bytes=` unit - 400
    #[error("Invalid value of 'Range' header: {header}")]
    BadRequest { header: String },
    /// Window reaches past the end of the file - 416
    #[error("Requested range not satisfiable (file size {total_size})")]
    NotSatisfiable { total_size: u64 },
    /// A bound does not fit in 64 bits - 416
    #[error("Range bound overflows: {header}")]
    Overflow { header: String },
}

impl RangeError {
    /// HTTP status code this rejection maps to
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::NotSatisfiable { .. } | Self::Overflow { .. } => 416,
        }
    }
}

/// Parse a `Range` header against a file of `total_size` bytes
///
/// - No header: `Ok(None)`, serve the whole file.
/// - Header without the `bytes=` prefix: [`RangeError::BadRequest`].
/// - Anything after the prefix other than exactly two dash-separated decimal
///   integers (`bytes=abc`, `bytes=5-`, `bytes=-5`, `bytes=1-2-3`): `Ok(None)`.
///   Such headers are tolerated and the whole file is served.
/// - `end < start` or `end >= total_size`: [`RangeError::NotSatisfiable`].
/// - Two decimal integers, either too large for `u64`: [`RangeError::Overflow`].
///
/// # Examples
/// ```
/// use static_share::http::range::parse_range_header;
///
/// let range = parse_range_header(Some("bytes=0-99"), 1000).unwrap().unwrap();
/// assert_eq!(range.content_range(), "bytes 0-99/1000");
///
/// assert!(parse_range_header(None, 1000).unwrap().is_none());
/// assert!(parse_range_header(Some("bytes=abc"), 1000).unwrap().is_none());
/// assert!(parse_range_header(Some("items=0-1"), 1000).is_err());
/// ```
pub fn parse_range_header(
    range_header: Option<&str>,
    total_size: u64,
) -> Result<Option<ByteRange>, RangeError> {
    let Some(header) = range_header else {
        return Ok(None);
    };

    let Some(spec) = header.strip_prefix(RANGE_PREFIX) else {
        return Err(RangeError::BadRequest {
            header: header.to_string(),
        });
    };

    let mut parts = spec.split('-');
    let (Some(start_str), Some(end_str), None) = (parts.next(), parts.next(), parts.next()) else {
        return Ok(None);
    };

    let (start, end) = match (parse_bound(start_str), parse_bound(end_str)) {
        (Bound::Value(start), Bound::Value(end)) => (start, end),
        (Bound::NotNumeric, _) | (_, Bound::NotNumeric) => return Ok(None),
        _ => {
            return Err(RangeError::Overflow {
                header: header.to_string(),
            })
        }
    };

    let chunk_length = end
        .checked_sub(start)
        .ok_or(RangeError::NotSatisfiable { total_size })?;
    let upper = start
        .checked_add(chunk_length)
        .and_then(|last| last.checked_add(1))
        .ok_or_else(|| RangeError::Overflow {
            header: header.to_string(),
        })?;

    if upper > total_size {
        return Err(RangeError::NotSatisfiable { total_size });
    }

    Ok(Some(ByteRange {
        start,
        end,
        total_size,
    }))
}

/// One side of `start-end`
enum Bound {
    Value(u64),
    /// Decimal digits too large for `u64`
    Overflow,
    NotNumeric,
}

fn parse_bound(value: &str) -> Bound {
    match value.parse::<u64>() {
        Ok(v) => Bound::Value(v),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => Bound::Overflow,
        Err(_) => Bound::NotNumeric,
    }
}
