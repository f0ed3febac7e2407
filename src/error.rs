//! Pipeline error type.
//!
//! Request-time failures are split into two tiers:
//! - fatal: the request log can no longer be trusted, the process stops
//! - upstream: the stand could not be reached, the client gets a 502
//! - cookie: the stand's cookies do not form a valid header, the client gets a 500

use axum::http::header::InvalidHeaderValue;

use crate::recorder::RecordError;

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("failed to record request: {0}")]
    Record(#[from] RecordError),

    #[error("upstream request failed: {0}")]
    Upstream(#[source] hyper_util::client::legacy::Error),

    #[error("failed to inject stand cookies: {0}")]
    Cookie(#[from] InvalidHeaderValue),
}

impl ProxyError {
    /// Whether this failure must stop the whole process.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ProxyError::Record(_))
    }
}
