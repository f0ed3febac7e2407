//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (host, path, headers)
//!     → router.rs (host lookup, rewrite target to stand address:port)
//!     → directory.rs (hostname → Stand)
//!     → Return: matched Stand, or request marked with the sentinel host
//!
//! Directory Compilation (at startup):
//!     ProxyConfig.stands
//!     → Derive hostnames (name + dns_suffix)
//!     → Compile blocked-prefix matchers (matcher.rs)
//!     → Seed cookies (auth::login)
//!     → Freeze as immutable Arc<StandDirectory>
//! ```
//!
//! # Design Decisions
//! - Directory immutable at runtime, shared without locks
//! - O(1) host lookup via HashMap
//! - Deterministic: same input always matches same stand

pub mod directory;
pub mod matcher;
pub mod router;

pub use directory::{DirectoryError, Stand, StandDirectory};
pub use router::{route_request, routed_stand, RoutedStand, UNKNOWN_STAND_MARKER};
