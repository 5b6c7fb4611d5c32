//! HTTP `Range` header handling (RFC 7233, single range).
//!
//! Parsing and resolution are split: [`parse_range_header`] only checks
//! syntax, [`ByteRange::resolve`] checks the request against the object size
//! and produces the inclusive interval that is actually served.

use serde::{Deserialize, Serialize};

use crate::{BlobError, BlobResult};

/// Byte range as requested by the client, before the object size is known
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteRange {
    /// `bytes=start-end`
    FromTo { start: u64, end: u64 },
    /// `bytes=start-`
    From { start: u64 },
    /// `bytes=-length`, the last `length` bytes
    Suffix { length: u64 },
}

impl ByteRange {
    pub fn new(start: u64, end: Option<u64>) -> Self {
        match end {
            Some(end) => Self::FromTo { start, end },
            None => Self::From { start },
        }
    }

    pub fn from_start(start: u64) -> Self {
        Self::From { start }
    }

    pub fn suffix(length: u64) -> Self {
        Self::Suffix { length }
    }

    /// Check the range against an object of `total_size` bytes.
    ///
    /// An `end` past the last byte is clamped. A range that starts at or
    /// after the end of the object, or whose start is after its end, is not
    /// satisfiable.
    pub fn resolve(&self, total_size: u64) -> BlobResult<ResolvedRange> {
        if total_size == 0 {
            return Err(BlobError::RangeNotSatisfiable { size: total_size });
        }
        let last = total_size - 1;

        let (start, end) = match *self {
            ByteRange::FromTo { start, end } => {
                if start > end || start > last {
                    return Err(BlobError::RangeNotSatisfiable { size: total_size });
                }
                (start, end.min(last))
            }
            ByteRange::From { start } => {
                if start > last {
                    return Err(BlobError::RangeNotSatisfiable { size: total_size });
                }
                (start, last)
            }
            ByteRange::Suffix { length } => {
                if length == 0 {
                    return Err(BlobError::RangeNotSatisfiable { size: total_size });
                }
                (total_size.saturating_sub(length), last)
            }
        };

        Ok(ResolvedRange {
            start,
            end,
            total_size,
        })
    }
}

/// Inclusive byte interval inside an object, `start <= end < total_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

impl ResolvedRange {
    pub fn content_length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn is_full_content(&self) -> bool {
        self.start == 0 && self.end + 1 == self.total_size
    }

    /// `Content-Range` response value: `bytes start-end/total`
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/{}", self.start, self.end, self.total_size)
    }

    /// `Range` request value sent upstream: `bytes=start-end`
    pub fn to_header_value(&self) -> String {
        format!("bytes={}-{}", self.start, self.end)
    }
}

/// `Content-Range` value for a 416 response: `bytes */total`
pub fn unsatisfied_content_range(total_size: u64) -> String {
    format!("bytes */{}", total_size)
}

/// Parse a `Range` header value.
///
/// Only the first range of a list is honoured; `bytes=0-9,20-29` reads as
/// `bytes=0-9`.
pub fn parse_range_header(value: &str) -> BlobResult<ByteRange> {
    let value = value.trim();
    let (unit, spec) = value
        .split_once('=')
        .ok_or_else(|| BlobError::invalid_range(format!("missing '=' in {:?}", value)))?;

    if !unit.trim().eq_ignore_ascii_case("bytes") {
        return Err(BlobError::invalid_range(format!("unsupported range unit {:?}", unit)));
    }

    let first = spec.split(',').next().unwrap_or_default().trim();
    let (start, end) = first
        .split_once('-')
        .ok_or_else(|| BlobError::invalid_range(format!("missing '-' in {:?}", first)))?;
    let (start, end) = (start.trim(), end.trim());

    match (start.is_empty(), end.is_empty()) {
        (true, true) => Err(BlobError::invalid_range("empty range")),
        (true, false) => Ok(ByteRange::Suffix {
            length: parse_position(end)?,
        }),
        (false, true) => Ok(ByteRange::From {
            start: parse_position(start)?,
        }),
        (false, false) => Ok(ByteRange::FromTo {
            start: parse_position(start)?,
            end: parse_position(end)?,
        }),
    }
}

fn parse_position(digits: &str) -> BlobResult<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(BlobError::invalid_range(format!("not a byte position: {:?}", digits)));
    }
    digits
        .parse::<u64>()
        .map_err(|_| BlobError::invalid_range(format!("byte position out of range: {:?}", digits)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn parses_closed_range() {
        let range = assert_ok!(parse_range_header("bytes=10-19"));
        assert_eq!(range, ByteRange::FromTo { start: 10, end: 19 });
    }

    #[test]
    fn parses_open_and_suffix_ranges() {
        assert_eq!(assert_ok!(parse_range_header("bytes=100-")), ByteRange::From { start: 100 });
        assert_eq!(assert_ok!(parse_range_header("bytes=-500")), ByteRange::Suffix { length: 500 });
    }

    #[test]
    fn unit_is_case_insensitive_and_whitespace_tolerated() {
        let range = assert_ok!(parse_range_header("  Bytes = 0 - 0 "));
        assert_eq!(range, ByteRange::FromTo { start: 0, end: 0 });
    }

    #[test]
    fn only_first_of_multiple_ranges_is_used() {
        let range = assert_ok!(parse_range_header("bytes=0-9,20-29"));
        assert_eq!(range, ByteRange::FromTo { start: 0, end: 9 });
    }

    #[test]
    fn rejects_malformed_headers() {
        for header in [
            "",
            "bytes",
            "items=0-9",
            "bytes=",
            "bytes=-",
            "bytes=abc-def",
            "bytes=+5-10",
            "bytes=5",
            "bytes=99999999999999999999999-",
        ] {
            let err = assert_err!(parse_range_header(header), "{header:?} should not parse");
            assert!(matches!(err, BlobError::InvalidRange { .. }), "{header:?}: {err}");
        }
    }

    #[test]
    fn resolves_closed_range() {
        let resolved = assert_ok!(ByteRange::new(10, Some(19)).resolve(100));
        assert_eq!(resolved.content_length(), 10);
        assert_eq!(resolved.content_range(), "bytes 10-19/100");
        assert_eq!(resolved.to_header_value(), "bytes=10-19");
        assert!(!resolved.is_full_content());
    }

    #[test]
    fn open_range_runs_to_last_byte() {
        let resolved = assert_ok!(ByteRange::from_start(100).resolve(1000));
        assert_eq!(resolved.content_range(), "bytes 100-999/1000");
        assert_eq!(resolved.content_length(), 900);
    }

    #[test]
    fn single_first_byte() {
        let resolved = assert_ok!(ByteRange::new(0, Some(0)).resolve(42));
        assert_eq!(resolved.content_length(), 1);
        assert_eq!(resolved.content_range(), "bytes 0-0/42");
    }

    #[test]
    fn end_past_object_is_clamped() {
        let resolved = assert_ok!(ByteRange::new(90, Some(5000)).resolve(100));
        assert_eq!((resolved.start, resolved.end), (90, 99));
    }

    #[test]
    fn suffix_longer_than_object_serves_everything() {
        let resolved = assert_ok!(ByteRange::suffix(500).resolve(100));
        assert_eq!((resolved.start, resolved.end), (0, 99));
        assert!(resolved.is_full_content());
    }

    #[test]
    fn unsatisfiable_ranges() {
        let size = 100;
        for range in [
            ByteRange::new(size, Some(size + 10)),
            ByteRange::from_start(size),
            ByteRange::new(20, Some(10)),
            ByteRange::suffix(0),
        ] {
            let err = assert_err!(range.resolve(size));
            assert!(matches!(err, BlobError::RangeNotSatisfiable { size: 100 }));
        }
        assert_err!(ByteRange::new(0, Some(0)).resolve(0));
        assert_eq!(unsatisfied_content_range(size), "bytes */100");
    }
}
