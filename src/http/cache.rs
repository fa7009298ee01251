//! HTTP cache validation module
//!
//! Provides `Last-Modified` formatting and `If-Modified-Since` handling for files on disk.

use chrono::{DateTime, Utc};
use std::time::SystemTime;

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    let time: DateTime<Utc> = time.into();
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date header value; `None` when malformed
pub fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(value.trim())
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Check if client's `If-Modified-Since` header covers the file's modification time
///
/// Comparison is at whole-second precision since that is all the header carries.
/// A malformed header is ignored (full response).
///
/// # Returns
/// Returns true if the client copy is current (should return 304), false otherwise
pub fn check_not_modified(if_modified_since: Option<&str>, modified: SystemTime) -> bool {
    let Some(since) = if_modified_since.and_then(parse_http_date) else {
        return false;
    };
    let modified: DateTime<Utc> = modified.into();
    modified.timestamp() <= since.timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    fn rfc_example() -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(784_111_777)
    }

    #[test]
    fn test_format_http_date() {
        assert_eq!(
            format_http_date(rfc_example()),
            "Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_parse_roundtrip_second_precision() {
        let parsed = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
        assert_eq!(parsed.timestamp(), 784_111_777);
        assert!(parse_http_date("yesterday").is_none());
    }

    #[test]
    fn test_check_not_modified() {
        let modified = rfc_example() + Duration::from_millis(250);
        assert!(check_not_modified(
            Some("Sun, 06 Nov 1994 08:49:37 GMT"),
            modified
        ));
        assert!(check_not_modified(
            Some("Mon, 07 Nov 1994 00:00:00 GMT"),
            modified
        ));
        assert!(!check_not_modified(
            Some("Sun, 06 Nov 1994 08:49:36 GMT"),
            modified
        ));
        assert!(!check_not_modified(Some("garbage"), modified));
        assert!(!check_not_modified(None, modified));
    }
}
