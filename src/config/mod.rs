//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize, optional single-stand selection)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → routing::StandDirectory built from it
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; there is no reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, select_stand, ConfigError};
pub use schema::CookieConfig;
pub use schema::LoginConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::StandConfig;
