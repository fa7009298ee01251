//! Access log lines
//!
//! One line per answered request, either in Common Log Format or as a JSON
//! object. Both carry how the request was answered ([`Outcome`]), so SPA
//! fallbacks can be told apart from real files at a glance.

use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::json;

/// How the responder answered a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A file found under the root directory
    File,
    /// The file is unchanged since `If-Modified-Since`
    NotModified,
    /// The root document standing in for an unknown path
    Fallback,
    NotFound,
    Preflight,
    /// Method other than GET, HEAD or OPTIONS
    Rejected,
    /// The file or root document could not be read
    Failed,
}

impl Outcome {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::NotModified => "not-modified",
            Self::Fallback => "fallback",
            Self::NotFound => "not-found",
            Self::Preflight => "preflight",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Access log line layout, selected by `logging.access_log_format`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLogFormat {
    /// `host - - [time] "METHOD /target HTTP/1.1" status bytes outcome`
    #[default]
    Common,
    Json,
}

#[derive(Debug, Clone)]
pub struct AccessLogEntry {
    pub remote_addr: String,
    pub time: DateTime<Local>,
    pub method: String,
    /// Request target as received, query string included
    pub target: String,
    pub http_version: &'static str,
    pub status: u16,
    pub body_bytes: usize,
    /// `None` when the response did not come from the responder
    pub outcome: Option<Outcome>,
    pub request_time_us: u64,
}

impl AccessLogEntry {
    pub fn render(&self, format: AccessLogFormat) -> String {
        match format {
            AccessLogFormat::Common => self.render_common(),
            AccessLogFormat::Json => self.render_json(),
        }
    }

    fn outcome_label(&self) -> &'static str {
        self.outcome.map_or("-", Outcome::as_str)
    }

    fn render_common(&self) -> String {
        format!(
            "{} - - [{}] \"{} {} HTTP/{}\" {} {} {}",
            self.remote_addr,
            self.time.format("%d/%b/%Y:%H:%M:%S %z"),
            self.method,
            self.target,
            self.http_version,
            self.status,
            self.body_bytes,
            self.outcome_label(),
        )
    }

    fn render_json(&self) -> String {
        json!({
            "time": self.time.to_rfc3339(),
            "remote_addr": self.remote_addr,
            "method": self.method,
            "target": self.target,
            "http_version": self.http_version,
            "status": self.status,
            "body_bytes": self.body_bytes,
            "outcome": self.outcome.map(Outcome::as_str),
            "request_time_us": self.request_time_us,
        })
        .to_string()
    }
}
