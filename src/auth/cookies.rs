//! Cookie injection stage of the pipeline.
//!
//! # Responsibilities
//! - Remove client-supplied cookies whose names the stand manages
//! - Append the stand's own value for each managed cookie
//!
//! # Design Decisions
//! - Header surgery works on raw bytes, not a cookie parser: entries are
//!   split on `;`, matched by the literal prefix `name=` after trimming, and
//!   survivors are rejoined with `;` exactly as they were
//! - Removing an absent name leaves the header byte-for-byte unchanged
//! - Multiple Cookie headers are merged with `; ` before rewriting
//! - A rewrite that is not a valid header value fails the request

use std::collections::BTreeMap;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::header::InvalidHeaderValue;
use axum::http::{header, HeaderMap, HeaderValue, Request};
use futures_util::future::{self, Either, Ready};
use tower::{Layer, Service};

use crate::routing::router::routed_stand;
use crate::routing::StandDirectory;

/// Drop every entry named `name`. `None` means nothing is left.
pub fn remove_cookie(header: &[u8], name: &str) -> Option<Vec<u8>> {
    let mut prefix = name.as_bytes().to_vec();
    prefix.push(b'=');

    let parts: Vec<&[u8]> = header.split(|b| *b == b';').collect();
    let kept: Vec<&[u8]> = parts
        .iter()
        .copied()
        .filter(|part| !part.trim_ascii().starts_with(&prefix))
        .collect();

    if kept.is_empty() {
        None
    } else if kept.len() == parts.len() {
        Some(header.to_vec())
    } else {
        Some(kept.join(&b';'))
    }
}

/// Append `name=value` to an existing header, or start a new one.
pub fn append_cookie(header: Option<&[u8]>, name: &str, value: &str) -> Vec<u8> {
    let entry = format!("{}={}", name, value);
    match header {
        Some(existing) if !existing.is_empty() => {
            let mut out = existing.to_vec();
            out.extend_from_slice(b"; ");
            out.extend_from_slice(entry.as_bytes());
            out
        }
        _ => entry.into_bytes(),
    }
}

/// Rewrite the Cookie header so each managed cookie carries the stand's value.
///
/// On error the headers are left as they were and the request must not be sent.
pub fn inject_cookies(
    headers: &mut HeaderMap,
    cookies: &BTreeMap<String, String>,
) -> Result<(), InvalidHeaderValue> {
    if cookies.is_empty() {
        return Ok(());
    }

    let mut current = merged_cookie_header(headers);
    for (name, value) in cookies {
        current = current.as_deref().and_then(|h| remove_cookie(h, name));
        current = Some(append_cookie(current.as_deref(), name, value));
    }

    let Some(rewritten) = current else {
        return Ok(());
    };
    let value = HeaderValue::from_bytes(&rewritten)?;
    headers.remove(header::COOKIE);
    headers.insert(header::COOKIE, value);
    Ok(())
}

fn merged_cookie_header(headers: &HeaderMap) -> Option<Vec<u8>> {
    let values: Vec<&[u8]> = headers
        .get_all(header::COOKIE)
        .iter()
        .map(HeaderValue::as_bytes)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(&b"; "[..]))
    }
}

/// Layer adding [`InjectCookies`].
#[derive(Debug, Clone)]
pub struct CookieLayer {
    directory: Arc<StandDirectory>,
}

impl CookieLayer {
    pub fn new(directory: Arc<StandDirectory>) -> Self {
        Self { directory }
    }
}

impl<S> Layer<S> for CookieLayer {
    type Service = InjectCookies<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InjectCookies {
            inner,
            directory: self.directory.clone(),
        }
    }
}

/// Injects the stand's cookies into every request before forwarding it.
#[derive(Debug, Clone)]
pub struct InjectCookies<S> {
    inner: S,
    directory: Arc<StandDirectory>,
}

impl<S, B> Service<Request<B>> for InjectCookies<S>
where
    S: Service<Request<B>>,
    S::Error: From<InvalidHeaderValue>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Either<Ready<Result<S::Response, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        if let Some(stand) = routed_stand(&self.directory, &req) {
            if let Err(e) = inject_cookies(req.headers_mut(), stand.cookies()) {
                tracing::error!(stand = %stand.name, error = %e, "Rewritten Cookie header is not a valid header value");
                return Either::Left(future::ready(Err(e.into())));
            }
        }
        Either::Right(self.inner.call(req))
    }
}
