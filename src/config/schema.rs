//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration for the stand proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Address every stand is reachable on (e.g., "127.0.0.1").
    pub stands_addr: String,

    /// Optional DNS suffix appended to stand names to form hostnames.
    pub dns_suffix: Option<String>,

    /// Stand definitions keyed by logical name.
    pub stands: BTreeMap<String, StandConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ProxyConfig {
    /// Externally visible hostname for a logical stand name.
    pub fn hostname_for(&self, name: &str) -> String {
        match self.dns_suffix.as_deref() {
            Some(suffix) if !suffix.is_empty() => format!("{}.{}", name, suffix),
            _ => name.to_string(),
        }
    }
}

/// A single stand (backend environment).
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct StandConfig {
    /// Port the stand listens on at `stands_addr`.
    pub port: u16,

    /// Cookie policy.
    #[serde(default)]
    pub cookies: CookieConfig,

    /// Path prefixes answered locally instead of being forwarded.
    #[serde(default)]
    pub strip_urls: Vec<String>,
}

/// Cookie policy for a stand.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct CookieConfig {
    /// Static cookie values, overridden by whatever the login returns.
    #[serde(default)]
    pub values: BTreeMap<String, String>,

    /// Optional scripted login performed once at startup.
    pub login: Option<LoginConfig>,
}

/// Login form descriptor.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct LoginConfig {
    /// Login path relative to the stand root (e.g., "/login.php").
    pub url: String,

    /// Form fields posted as `application/x-www-form-urlencoded`.
    #[serde(default)]
    pub form: BTreeMap<String, String>,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
