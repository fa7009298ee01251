//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: method dispatch and access logging.

use crate::config::AppState;
use crate::logger::{self, AccessLogEntry, Outcome};
use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// Request context encapsulating information needed for request processing
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub path: String,
    pub is_head: bool,
    pub if_modified_since: Option<String>,
}

impl RequestContext {
    /// Context for a plain GET of `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            is_head: false,
            if_modified_since: None,
        }
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self {
            is_head: req.method() == Method::HEAD,
            if_modified_since: header_string(req, "if-modified-since"),
            ..Self::new(req.uri().path())
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let started = Instant::now();
    let ctx = RequestContext::from_request(&req);

    let response = match *req.method() {
        Method::GET | Method::HEAD => state.responder.handle_get(&ctx).await,
        Method::OPTIONS => state.responder.handle_options(&ctx),
        _ => {
            logger::log_warning(&format!("Method not allowed: {} {}", req.method(), ctx.path));
            state.responder.method_not_allowed(&ctx)
        }
    };

    if state.config.logging.access_log {
        let entry = access_entry(&req, &response, remote_addr, started);
        logger::log_access(&entry, state.config.logging.access_log_format);
    }

    Ok(response)
}

fn access_entry<B>(
    req: &Request<B>,
    response: &Response<Full<Bytes>>,
    remote_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    AccessLogEntry {
        remote_addr: remote_addr.ip().to_string(),
        time: chrono::Local::now(),
        method: req.method().to_string(),
        target: req
            .uri()
            .path_and_query()
            .map_or_else(|| req.uri().path().to_string(), ToString::to_string),
        http_version: version_label(req.version()),
        status: response.status().as_u16(),
        body_bytes: response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0),
        outcome: response.extensions().get::<Outcome>().copied(),
        request_time_us: u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX),
    }
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
