//! Response header decoration
//!
//! CORS headers go on every response. Anti-caching headers go on documents the
//! browser must always re-fetch: HTML pages, scripts and the site root.

use hyper::header::{
    HeaderMap, HeaderValue, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, EXPIRES, PRAGMA,
};

/// Signature of a header decorator: response headers plus the request path
pub type Decorator = fn(&mut HeaderMap, &str);

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, OPTIONS";
pub const ALLOW_HEADERS: &str = "*";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";

/// Add CORS headers, and anti-caching headers when `request_path` needs them
pub fn decorate(headers: &mut HeaderMap, request_path: &str) {
    add_cors(headers);
    if is_uncacheable(request_path) {
        add_no_cache(headers);
    }
}

pub fn add_cors(headers: &mut HeaderMap) {
    headers.insert(
        ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
}

pub fn add_no_cache(headers: &mut HeaderMap) {
    headers.insert(CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(EXPIRES, HeaderValue::from_static("0"));
}

/// Paths ending in `.html` or `.js`, and the root itself
pub fn is_uncacheable(request_path: &str) -> bool {
    request_path == "/"
        || request_path.ends_with(".html")
        || request_path.ends_with(".js")
}
