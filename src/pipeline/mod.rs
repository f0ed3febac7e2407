//! Request pipeline.
//!
//! # Data Flow
//! ```text
//! routed request
//!     → strip.rs        (unknown stand → 400, blocked prefix → 200 "ok")
//!     → auth::cookies   (replace managed cookies with the stand's values)
//!     → recorder        (append one NDJSON line, keep body re-readable)
//!     → sender.rs       (plain HTTP to the stand)
//!     ← response, returned unmodified
//! ```
//!
//! # Design Decisions
//! - Every stage is a tower `Service`, composed with `Layer`s at startup
//! - Outer stages may answer without calling inner ones
//! - The innermost service is generic so tests can swap the network out

pub mod sender;
pub mod strip;

use std::sync::Arc;

use tower::ServiceBuilder;

use crate::auth::cookies::{CookieLayer, InjectCookies};
use crate::recorder::{RecordLayer, RecordRequests, RequestLog};
use crate::routing::StandDirectory;

pub use sender::HttpSender;
pub use strip::{StripLayer, StripRequests, Verdict};

/// The full stage chain around a network sender `S`.
pub type Pipeline<S> = StripRequests<InjectCookies<RecordRequests<S>>>;

/// Compose strip → cookies → record around `sender`.
pub fn build_pipeline<S>(directory: Arc<StandDirectory>, log: Arc<RequestLog>, sender: S) -> Pipeline<S> {
    ServiceBuilder::new()
        .layer(StripLayer::new(directory.clone()))
        .layer(CookieLayer::new(directory))
        .layer(RecordLayer::new(log))
        .service(sender)
}
