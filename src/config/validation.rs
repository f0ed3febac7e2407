//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (ports valid, required strings present)
//! - Detect prefixes that would swallow every request
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use crate::config::schema::ProxyConfig;

/// A single semantic problem found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("stands_addr must not be empty")]
    MissingStandsAddr,

    #[error("no stands configured")]
    NoStands,

    #[error("stand {stand:?}: name must not contain whitespace")]
    InvalidStandName { stand: String },

    #[error("stand {stand:?}: port must be non-zero")]
    InvalidPort { stand: String },

    #[error("stand {stand:?}: login url must not be empty")]
    EmptyLoginUrl { stand: String },

    #[error("stand {stand:?}: empty strip_urls entry would block every request")]
    EmptyStripPrefix { stand: String },
}

/// Check a parsed configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.stands_addr.trim().is_empty() {
        errors.push(ValidationError::MissingStandsAddr);
    }
    if config.stands.is_empty() {
        errors.push(ValidationError::NoStands);
    }

    for (name, stand) in &config.stands {
        if name.is_empty() || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidStandName { stand: name.clone() });
        }
        if stand.port == 0 {
            errors.push(ValidationError::InvalidPort { stand: name.clone() });
        }
        if let Some(login) = &stand.cookies.login {
            if login.url.trim().is_empty() {
                errors.push(ValidationError::EmptyLoginUrl { stand: name.clone() });
            }
        }
        if stand.strip_urls.iter().any(|p| p.is_empty()) {
            errors.push(ValidationError::EmptyStripPrefix { stand: name.clone() });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
