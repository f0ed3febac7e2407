//! Stand directory.
//!
//! # Responsibilities
//! - Represent a single stand (backend environment) and its policy
//! - Map externally visible hostnames to stands
//! - Hold per-stand cookie maps seeded by the login bootstrap
//!
//! # Design Decisions
//! - Built once from configuration, mutated only by the login bootstrap,
//!   then frozen behind an `Arc` and shared without locks
//! - Hostnames are normalized to lowercase

use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;

use axum::http::uri::Authority;

use crate::config::{LoginConfig, ProxyConfig};
use crate::routing::matcher::PathPrefixMatcher;

/// Error raised while building the directory from configuration.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("stand {stand:?}: invalid upstream address {address:?}")]
    InvalidAddress { stand: String, address: String },
}

/// A single stand the proxy forwards to.
#[derive(Debug, Clone)]
pub struct Stand {
    /// Logical name from configuration.
    pub name: String,
    /// Externally visible hostname (name plus optional DNS suffix).
    pub hostname: String,
    /// Port the stand listens on.
    pub port: u16,
    /// Upstream `address:port` requests are sent to.
    pub upstream: Authority,
    /// Blocked path prefixes.
    pub blocked: PathPrefixMatcher,
    /// Optional login descriptor.
    pub login: Option<LoginConfig>,
    cookies: BTreeMap<String, String>,
}

impl Stand {
    /// Cookie values injected into every forwarded request.
    pub fn cookies(&self) -> &BTreeMap<String, String> {
        &self.cookies
    }

    /// Base URL of the stand, e.g. `http://127.0.0.1:8081`.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.upstream)
    }

    /// Overwrite cookie values as one batch.
    pub fn apply_cookies(&mut self, batch: impl IntoIterator<Item = (String, String)>) {
        self.cookies.extend(batch);
    }
}

/// Mapping from hostname to stand.
#[derive(Debug, Clone, Default)]
pub struct StandDirectory {
    stands: HashMap<String, Stand>,
}

impl StandDirectory {
    /// Build the directory from configuration.
    pub fn from_config(config: &ProxyConfig) -> Result<Self, DirectoryError> {
        let mut stands = HashMap::new();

        for (name, stand_config) in &config.stands {
            let hostname = config.hostname_for(name).to_lowercase();
            let address = format!("{}:{}", config.stands_addr, stand_config.port);
            let upstream = Authority::from_str(&address).map_err(|_| {
                DirectoryError::InvalidAddress {
                    stand: name.clone(),
                    address: address.clone(),
                }
            })?;

            let stand = Stand {
                name: name.clone(),
                hostname: hostname.clone(),
                port: stand_config.port,
                upstream,
                blocked: PathPrefixMatcher::new(stand_config.strip_urls.iter().cloned()),
                login: stand_config.cookies.login.clone(),
                cookies: stand_config.cookies.values.clone(),
            };

            tracing::debug!(stand = %name, hostname = %hostname, upstream = %address, "Stand registered");
            if stands.insert(hostname.clone(), stand).is_some() {
                tracing::warn!(hostname = %hostname, stand = %name, "Duplicate stand hostname, keeping the last one");
            }
        }

        Ok(Self { stands })
    }

    /// Look up a stand by the request host.
    ///
    /// Tries the exact host first, then the host without a `:port` suffix.
    pub fn lookup(&self, host: &str) -> Option<&Stand> {
        let host = host.to_lowercase();
        if let Some(stand) = self.stands.get(&host) {
            return Some(stand);
        }
        let (bare, port) = host.rsplit_once(':')?;
        if port.chars().all(|c| c.is_ascii_digit()) {
            self.stands.get(bare)
        } else {
            None
        }
    }

    /// Iterate over all stands.
    pub fn stands(&self) -> impl Iterator<Item = &Stand> {
        self.stands.values()
    }

    /// Mutable access used by the login bootstrap before the directory is shared.
    pub fn stands_mut(&mut self) -> impl Iterator<Item = &mut Stand> {
        self.stands.values_mut()
    }

    pub fn len(&self) -> usize {
        self.stands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stands.is_empty()
    }
}
