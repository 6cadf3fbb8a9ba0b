//! HTTP date handling for `Last-Modified` / `If-Modified-Since`
//!
//! Responses always forbid caching, but browsers that still send conditional
//! requests get a 304 when the file has not changed.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format a timestamp as an RFC 7231 IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    DateTime::<Utc>::from(time)
        .format("%a, %d %b %Y %H:%M:%S GMT")
        .to_string()
}

/// Parse an HTTP date header value
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

/// Check whether the client's copy, per `If-Modified-Since`, is still current
///
/// Comparison is at one-second resolution since HTTP dates carry no fraction.
/// An unparseable header counts as "modified".
pub fn is_not_modified(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    if_modified_since
        .and_then(parse_http_date)
        .is_some_and(|since| DateTime::<Utc>::from(modified).timestamp() <= since.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn at(secs: u64) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(secs)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(format_http_date(at(784_111_777)), "Sun, 06 Nov 1994 08:49:37 GMT");
    }

    #[test]
    fn test_parse_roundtrip_value() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_is_not_modified() {
        let header = "Sun, 06 Nov 1994 08:49:37 GMT";
        assert!(is_not_modified(Some(header), at(784_111_777)));
        assert!(is_not_modified(Some(header), at(784_111_000)));
        assert!(!is_not_modified(Some(header), at(784_111_778)));
        assert!(!is_not_modified(Some("garbage"), at(0)));
        assert!(!is_not_modified(None, at(0)));
    }

    #[test]
    fn test_subsecond_mtime_truncated() {
        let mtime = at(784_111_777) + Duration::from_millis(600);
        assert!(is_not_modified(Some("Sun, 06 Nov 1994 08:49:37 GMT"), mtime));
    }
}
