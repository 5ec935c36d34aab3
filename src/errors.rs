// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon Error Types
 * Error taxonomy for passive subdomain enumeration
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Top-level errors. Only these can stop a run from starting.
#[derive(Error, Debug)]
pub enum ReconError {
    /// Active source set resolved to empty
    #[error("No sources selected for this search")]
    NoSourcesSelected,

    /// Two sources registered under the same name
    #[error("Duplicate source name in registry: {0}")]
    DuplicateSource(String),

    /// Invalid session or run configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Source failure surfaced outside of an event stream
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Archive write failed for {path:?}: {reason}")]
    Archive { path: PathBuf, reason: String },
}

/// Per-source failure. Contained within the source task and reported as an
/// `Error` event, never fatal to the run.
#[derive(Error, Debug)]
pub enum SourceError {
    /// Transport level failures
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Non-success HTTP status from the upstream API
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    /// Upstream answered but reported a failure in its payload
    #[error("{source_name} reported: {message}")]
    Upstream {
        source_name: String,
        message: String,
    },

    #[error("Malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    /// Run cancellation token fired while a request was in flight
    #[error("Request cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Connection timeout after {timeout:?} to {url}")]
    ConnectionTimeout { url: String, timeout: Duration },

    #[error("Connection refused for {url}")]
    ConnectionRefused { url: String },

    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },

    #[error("Network error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum HttpError {
    #[error("HTTP {status_code} Client Error for {url}: {message}")]
    ClientError {
        status_code: u16,
        url: String,
        message: String,
    },

    #[error("HTTP {status_code} Server Error for {url}: {message}")]
    ServerError {
        status_code: u16,
        url: String,
        message: String,
    },

    #[error("Response body too large ({size} bytes) from {url}, max: {max_size}")]
    BodyTooLarge {
        url: String,
        size: usize,
        max_size: usize,
    },

    #[error("HTTP error: {0}")]
    Other(String),
}

/// Query parameters whose values are credentials
const CREDENTIAL_PARAMS: &[&str] = &[
    "key",
    "apikey",
    "api-key",
    "api_key",
    "token",
    "access_token",
    "secret",
    "email",
    "password",
];

fn is_credential_param(name: &str) -> bool {
    CREDENTIAL_PARAMS.iter().any(|param| name.eq_ignore_ascii_case(param))
}

/// Mask credential query values and userinfo so a URL is safe to log.
/// Unparseable input loses its whole query.
pub fn redact_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.split('?').next().unwrap_or_default().to_string();
    };

    if !url.username().is_empty() || url.password().is_some() {
        let _ = url.set_username("");
        let _ = url.set_password(None);
    }

    let has_credentials = url.query_pairs().any(|(name, _)| is_credential_param(&name));
    if has_credentials {
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(name, value)| {
                let value = if is_credential_param(&name) {
                    "REDACTED".to_string()
                } else {
                    value.into_owned()
                };
                (name.into_owned(), value)
            })
            .collect();
        url.query_pairs_mut().clear().extend_pairs(pairs);
    }

    url.into()
}

impl NetworkError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            NetworkError::ConnectionTimeout { .. } => true,
            NetworkError::ConnectionRefused { .. } => false,
            NetworkError::InvalidUrl { .. } => false,
            NetworkError::Other(_) => false,
        }
    }
}

impl HttpError {
    /// Build from a status code, keeping a short excerpt of the body
    pub fn from_status(status_code: u16, url: &str, body: &str) -> Self {
        let message: String = body.chars().take(200).collect();
        let url = redact_url(url);
        if status_code >= 500 {
            HttpError::ServerError {
                status_code,
                url,
                message,
            }
        } else {
            HttpError::ClientError {
                status_code,
                url,
                message,
            }
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            HttpError::ClientError { status_code, .. } | HttpError::ServerError { status_code, .. } => {
                Some(*status_code)
            }
            _ => None,
        }
    }

    /// Check if HTTP error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            HttpError::ServerError { status_code, .. } => matches!(status_code, 500 | 502 | 503 | 504),
            HttpError::ClientError { status_code, .. } => matches!(status_code, 408 | 429),
            _ => false,
        }
    }
}

impl SourceError {
    /// Convenience for provider-reported failures
    pub fn upstream(source_name: &str, message: impl Into<String>) -> Self {
        SourceError::Upstream {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    pub fn malformed(url: &str, err: impl std::fmt::Display) -> Self {
        SourceError::MalformedResponse {
            url: redact_url(url),
            reason: err.to_string(),
        }
    }

    /// Transport errors (network, cancellation) as opposed to upstream errors
    pub fn is_transport(&self) -> bool {
        matches!(self, SourceError::Network(_) | SourceError::Cancelled)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            SourceError::Network(e) => e.is_retryable(),
            SourceError::Http(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Convert reqwest errors to our error types
impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| redact_url(u.as_str())).unwrap_or_default();
        let err = err.without_url();

        if err.is_timeout() {
            SourceError::Network(NetworkError::ConnectionTimeout {
                url,
                timeout: Duration::from_secs(0),
            })
        } else if err.is_connect() {
            SourceError::Network(NetworkError::ConnectionRefused { url })
        } else if err.is_builder() {
            SourceError::Network(NetworkError::InvalidUrl { url })
        } else if let Some(status) = err.status() {
            SourceError::Http(HttpError::from_status(status.as_u16(), &url, &err.to_string()))
        } else {
            SourceError::Network(NetworkError::Other(err.to_string()))
        }
    }
}

/// Result type for recon operations
pub type ReconResult<T> = Result<T, ReconError>;
