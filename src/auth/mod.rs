//! Stand authentication subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (login.rs):
//!     StandDirectory (mutable, not yet shared)
//!     → POST login form per stand (isolated cookie store)
//!     → harvested cookies merged into Stand cookie map
//!     → directory frozen in Arc
//!
//! Per request (cookies.rs):
//!     Request → strip client copies of managed cookies
//!             → append stand's values → next stage
//! ```

pub mod cookies;
pub mod login;

pub use cookies::{inject_cookies, CookieLayer, InjectCookies};
pub use login::{log_in, log_in_all, LoginError, LoginOutcome};
