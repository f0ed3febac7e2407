//! Request recording subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request (already routed, cookies injected)
//!     → layer.rs (buffer body, re-attach it, keep a reusable copy)
//!     → har.rs (method, url, headers, queryString)
//!     → post_data.rs (form / multipart / raw body)
//!     → log.rs (one JSON line, appended under a lock)
//!     → inner service (network send)
//! ```
//!
//! # Design Decisions
//! - Response bodies are never inspected
//! - Any recording failure is fatal for the process, not retried
//! - The lock is held for a single line append only

pub mod har;
pub mod layer;
pub mod log;
pub mod post_data;

pub use har::{NameValue, PostData, RequestRecord};
pub use layer::{record_request, BufferedBody, RecordLayer, RecordRequests};
pub use log::RequestLog;

/// Failure while recording a request.
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("failed to read request body: {0}")]
    Body(#[source] axum::Error),

    #[error("failed to decode multipart body: {0}")]
    Multipart(#[from] multer::Error),

    #[error("failed to serialize request record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write request log: {0}")]
    Write(#[from] std::io::Error),

    #[error("request log lock poisoned")]
    Poisoned,
}
