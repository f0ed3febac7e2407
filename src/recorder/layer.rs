//! Recording stage of the pipeline.
//!
//! # Responsibilities
//! - Buffer the request body and attach it back (plus a reusable copy)
//! - Build the request record and append it to the log
//! - Hand the request to the network sender and return its result untouched

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{header, Request, Response};
use bytes::Bytes;
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::error::ProxyError;
use crate::observability::metrics;
use crate::recorder::har::RequestRecord;
use crate::recorder::log::RequestLog;
use crate::recorder::post_data::decode_post_data;
use crate::recorder::RecordError;

/// Buffered request body, kept as a request extension so any later
/// consumer can rebuild a fresh body stream.
#[derive(Debug, Clone)]
pub struct BufferedBody(Bytes);

impl BufferedBody {
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }

    /// A new body stream over the same bytes.
    pub fn to_body(&self) -> Body {
        Body::from(self.0.clone())
    }
}

/// Record a request and return it with its body re-attached.
pub async fn record_request(log: &RequestLog, req: Request<Body>) -> Result<Request<Body>, RecordError> {
    let (mut parts, body) = req.into_parts();
    let mut record = RequestRecord::new(&parts.method, &parts.uri, &parts.headers);

    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(RecordError::Body)?;
    let content_type = parts
        .headers
        .get(header::CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
    record.post_data = decode_post_data(&parts.method, content_type.as_deref(), &bytes).await?;

    let buffered = BufferedBody(bytes);
    let body = buffered.to_body();
    parts.extensions.insert(buffered);

    tracing::info!(method = %record.method, url = %record.url, "Recording request");
    log.append(&record)?;
    metrics::record_written();

    if record.url.len() <= 7 {
        tracing::warn!(url = %record.url, method = %record.method, "Request has a strange URL");
    }

    Ok(Request::from_parts(parts, body))
}

/// Layer adding [`RecordRequests`].
#[derive(Debug, Clone)]
pub struct RecordLayer {
    log: Arc<RequestLog>,
}

impl RecordLayer {
    pub fn new(log: Arc<RequestLog>) -> Self {
        Self { log }
    }
}

impl<S> Layer<S> for RecordLayer {
    type Service = RecordRequests<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RecordRequests {
            inner,
            log: self.log.clone(),
        }
    }
}

/// Records every request it sees, then forwards it.
#[derive(Debug, Clone)]
pub struct RecordRequests<S> {
    inner: S,
    log: Arc<RequestLog>,
}

impl<S> Service<Request<Body>> for RecordRequests<S>
where
    S: Service<Request<Body>, Response = Response<Body>, Error = ProxyError> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response<Body>;
    type Error = ProxyError;
    type Future = BoxFuture<'static, Result<Response<Body>, ProxyError>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let log = self.log.clone();
        // Take the service that was polled ready and leave a fresh clone behind.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let req = record_request(&log, req).await?;
            inner.call(req).await
        })
    }
}
