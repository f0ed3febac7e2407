//! Login bootstrap.
//!
//! # Responsibilities
//! - Post each stand's login form once at startup
//! - Capture the cookies the stand hands out and seed the stand's cookie map
//!
//! # Design Decisions
//! - One fresh cookie store per login, nothing shared between stands
//! - Sequential, strictly before the listener is bound
//! - Bad status or zero cookies only warn; transport errors abort startup
//! - No retries

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::StatusCode;
use url::Url;

use crate::config::LoginConfig;
use crate::observability::metrics;
use crate::routing::{Stand, StandDirectory};

/// Failure that aborts the bootstrap, and with it the process.
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("stand {stand:?}: malformed login URL {url:?}: {source}")]
    Url {
        stand: String,
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("stand {stand:?}: failed to build login client: {source}")]
    Client {
        stand: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("stand {stand:?}: login request failed: {source}")]
    Request {
        stand: String,
        #[source]
        source: reqwest::Error,
    },
}

/// What a single login produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    pub status: StatusCode,
    pub cookies: usize,
}

/// Log in to every stand that has a login descriptor, in name order.
pub async fn log_in_all(directory: &mut StandDirectory) -> Result<(), LoginError> {
    let mut stands: Vec<&mut Stand> = directory
        .stands_mut()
        .filter(|stand| stand.login.is_some())
        .collect();
    stands.sort_by(|a, b| a.name.cmp(&b.name));

    for stand in stands {
        tracing::info!(stand = %stand.name, "Logging in");
        log_in(stand).await?;
    }
    Ok(())
}

/// Log in to one stand and merge the received cookies into its cookie map.
pub async fn log_in(stand: &mut Stand) -> Result<Option<LoginOutcome>, LoginError> {
    let Some(login) = stand.login.clone() else {
        return Ok(None);
    };

    let url = login_url(&stand.base_url(), &login).map_err(|source| LoginError::Url {
        stand: stand.name.clone(),
        url: login.url.clone(),
        source,
    })?;
    tracing::info!(stand = %stand.name, url = %url, "Sending login form");
    tracing::debug!(stand = %stand.name, form = ?login.form, "Login form fields");

    let jar = Arc::new(Jar::default());
    let client = reqwest::Client::builder()
        .cookie_provider(jar.clone())
        .no_proxy()
        .build()
        .map_err(|source| LoginError::Client {
            stand: stand.name.clone(),
            source,
        })?;

    let response = client
        .post(url.clone())
        .form(&login.form)
        .send()
        .await
        .map_err(|source| LoginError::Request {
            stand: stand.name.clone(),
            source,
        })?;
    let status = response.status();
    let final_url = response.url().clone();
    drop(response);

    let good_status = status.is_success() || status.is_redirection();
    if !good_status {
        tracing::warn!(stand = %stand.name, status = %status, "Login resulted in unexpected status code");
    }

    let received = jar
        .cookies(&final_url)
        .map(|header| parse_cookie_pairs(&String::from_utf8_lossy(header.as_bytes())))
        .unwrap_or_default();

    if received.is_empty() {
        tracing::warn!(stand = %stand.name, url = %final_url, "Login returned no cookies");
        return Ok(Some(LoginOutcome { status, cookies: 0 }));
    }

    if good_status {
        tracing::info!(stand = %stand.name, url = %url, status = %status, "Logged in");
    }
    for (name, value) in &received {
        tracing::info!(stand = %stand.name, cookie = %name, value = %value, "Received cookie");
    }

    let count = received.len();
    metrics::record_login_cookies(&stand.name, count);
    stand.apply_cookies(received);

    Ok(Some(LoginOutcome { status, cookies: count }))
}

/// Join the stand base URL with the descriptor's relative path.
pub fn login_url(base: &str, login: &LoginConfig) -> Result<Url, url::ParseError> {
    Url::parse(base)?.join(&login.url)
}

/// Split a `name=value; name2=value2` header into pairs.
fn parse_cookie_pairs(header: &str) -> Vec<(String, String)> {
    header
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.trim().split_once('=')?;
            Some((name.to_string(), value.to_string()))
        })
        .filter(|(name, _)| !name.is_empty())
        .collect()
}
