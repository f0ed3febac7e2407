//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Build directory → Log in to stands → Open request log
//!     → Bind listener → Serve
//!
//! Shutdown (shutdown.rs):
//!     Ctrl+C or fatal pipeline error → Stop accepting → Drain → Exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: config first, then logins, then listener
//! - A fatal error during serving ends the process with a non-zero status

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{StartupError, StartupOptions};
