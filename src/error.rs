//! Error types for the scan client.

use thiserror::Error;

/// User-facing text for every transport failure. The cause is logged, not shown.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Error: Could not scan this site.";

/// Fallback text for a logical failure without a server message.
pub const NO_EMAILS_MESSAGE: &str = "No emails found";

/// The request never produced a usable body.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Connection refused, DNS failure, timeout, TLS error...
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Backend answered with a non-2xx status.
    #[error("backend returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the JSON the contract expects.
    #[error("malformed response body: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Outcome of a scan that did not end in success.
#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Well-formed 2xx response that reports failure.
    #[error("{message}")]
    Logical { message: String },
}

impl ScanError {
    /// Text shown in the view for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ScanError::Transport(_) => TRANSPORT_FAILURE_MESSAGE.to_string(),
            ScanError::Logical { message } => message.clone(),
        }
    }
}

/// Invalid configuration values.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid origin URL {value:?}: {reason}")]
    InvalidOrigin { value: String, reason: String },

    #[error("unknown fast endpoint {0:?} (expected \"scan-website\" or \"scrape\")")]
    UnknownFastEndpoint(String),

    #[error("unknown request key {0:?} (expected \"domain\" or \"url\")")]
    UnknownTargetKey(String),

    #[error("unknown scan mode {0:?} (expected \"fast\", \"deep\" or \"bulk\")")]
    UnknownMode(String),

    #[error("invalid timeout {value:?}: {source}")]
    InvalidTimeout {
        value: String,
        #[source]
        source: humantime::DurationError,
    },
}
