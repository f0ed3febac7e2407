//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request span)
//!     → forwarding.rs (hop-by-hop headers, X-Forwarded-For)
//!     → routing (stand lookup, target rewrite)
//!     → pipeline (strip → cookies → record → send)
//!     → Send response to client
//! ```

pub mod forwarding;
pub mod server;

pub use server::{HttpServer, ServeError};
