use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiaError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
    #[error("base url cannot carry endpoint paths: {0}")]
    InvalidBaseUrl(String),
    #[error("siapath must name a file")]
    EmptySiapath,
    #[error("api returned {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("condition not met after {attempts} listing fetches ({waited:?})")]
    TimedOut { waited: Duration, attempts: u32 },
    #[error("wait cancelled after {attempts} listing fetches")]
    Cancelled { attempts: u32 },
}

/// Coarse failure category, enough to tell an unreachable node apart from a
/// wait that never converged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    NotConverged,
}

impl SiaError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SiaError::Request(err) if err.is_decode() => ErrorKind::Decode,
            SiaError::Request(_)
            | SiaError::Url(_)
            | SiaError::InvalidBaseUrl(_)
            | SiaError::EmptySiapath
            | SiaError::Api { .. } => ErrorKind::Transport,
            SiaError::Decode(_) => ErrorKind::Decode,
            SiaError::TimedOut { .. } | SiaError::Cancelled { .. } => ErrorKind::NotConverged,
        }
    }

    /// Whether a host might reasonably try the same call again. The client
    /// never retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            SiaError::Request(err) => err.is_timeout() || err.is_connect(),
            SiaError::Api { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}
