//! Request routing (director).
//!
//! # Responsibilities
//! - Resolve the request host against the stand directory
//! - Rewrite the outbound target to the stand's `address:port` over plain HTTP
//! - Mark unresolvable requests with a sentinel host
//!
//! # Design Decisions
//! - Only the URI is rewritten; the Host header the client sent is kept
//! - The matched stand travels with the request as a [`RoutedStand`]
//!   extension, since the rewritten URI no longer names it
//! - Unknown hosts are not rejected here; the strip stage answers them

use axum::body::Body;
use axum::http::uri::{Authority, PathAndQuery, Scheme};
use axum::http::{header, HeaderValue, Request, Uri};

use crate::routing::directory::{Stand, StandDirectory};

/// Reserved host marking a request no stand could be found for.
pub const UNKNOWN_STAND_MARKER: &str = "error-unknownstand";

/// Host the client addressed: Host header, else the absolute-form authority.
pub fn request_host<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(header::HOST)
        .and_then(|h| h.to_str().ok())
        .or_else(|| req.uri().authority().map(Authority::as_str))
}

/// Hostname of the stand a request was routed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedStand(pub String);

/// Stand the router matched for this request, if any.
pub fn routed_stand<'a, B>(directory: &'a StandDirectory, req: &Request<B>) -> Option<&'a Stand> {
    req.extensions()
        .get::<RoutedStand>()
        .and_then(|routed| directory.lookup(&routed.0))
}

/// True when the router flagged this request as unroutable.
pub fn is_unknown_stand<B>(req: &Request<B>) -> bool {
    request_host(req) == Some(UNKNOWN_STAND_MARKER)
}

/// Resolve and rewrite the request target. Returns the matched stand.
pub fn route_request<'a>(directory: &'a StandDirectory, req: &mut Request<Body>) -> Option<&'a Stand> {
    let stand = request_host(req).and_then(|host| directory.lookup(host));

    match stand {
        Some(stand) => {
            *req.uri_mut() = upstream_uri(req.uri(), stand.upstream.clone());
            req.extensions_mut().insert(RoutedStand(stand.hostname.clone()));
            Some(stand)
        }
        None => {
            tracing::warn!(host = ?request_host(req), "Unknown stand");
            mark_unknown(req);
            None
        }
    }
}

fn mark_unknown(req: &mut Request<Body>) {
    req.headers_mut()
        .insert(header::HOST, HeaderValue::from_static(UNKNOWN_STAND_MARKER));
    *req.uri_mut() = upstream_uri(req.uri(), Authority::from_static(UNKNOWN_STAND_MARKER));
}

fn upstream_uri(original: &Uri, authority: Authority) -> Uri {
    let mut parts = original.clone().into_parts();
    parts.scheme = Some(Scheme::HTTP);
    parts.authority = Some(authority);
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).unwrap_or_else(|_| original.clone())
}
