//! Strip stage: the outermost pipeline stage.
//!
//! Answers locally, without touching any inner stage, when
//! - the router marked the request as unknown (400 "unknown stand")
//! - the request target starts with one of the stand's blocked prefixes (200 "ok")

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::{Request, Response, StatusCode};
use futures_util::future::{self, Either, Ready};
use tower::{Layer, Service};

use crate::observability::metrics::{self, Outcome};
use crate::routing::matcher::request_target;
use crate::routing::router::{is_unknown_stand, routed_stand};
use crate::routing::StandDirectory;

/// Why a request was answered locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    UnknownStand,
    Blocked { prefix: String },
    Forward,
}

/// Decide whether the request is answered locally.
pub fn verdict<B>(directory: &StandDirectory, req: &Request<B>) -> Verdict {
    if is_unknown_stand(req) {
        return Verdict::UnknownStand;
    }

    let Some(stand) = routed_stand(directory, req) else {
        return Verdict::Forward;
    };

    let target = request_target(req.uri());
    match stand.blocked.first_match(&target) {
        Some(prefix) => {
            tracing::info!(stand = %stand.name, target = %target, prefix = %prefix, "Stripping request");
            Verdict::Blocked {
                prefix: prefix.to_string(),
            }
        }
        None => Verdict::Forward,
    }
}

fn synthetic(status: StatusCode, body: &'static str) -> Response<Body> {
    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    response
}

/// Layer adding [`StripRequests`].
#[derive(Debug, Clone)]
pub struct StripLayer {
    directory: Arc<StandDirectory>,
}

impl StripLayer {
    pub fn new(directory: Arc<StandDirectory>) -> Self {
        Self { directory }
    }
}

impl<S> Layer<S> for StripLayer {
    type Service = StripRequests<S>;

    fn layer(&self, inner: S) -> Self::Service {
        StripRequests {
            inner,
            directory: self.directory.clone(),
        }
    }
}

/// Short-circuits unknown and blocked requests.
#[derive(Debug, Clone)]
pub struct StripRequests<S> {
    inner: S,
    directory: Arc<StandDirectory>,
}

impl<S, B> Service<Request<B>> for StripRequests<S>
where
    S: Service<Request<B>, Response = Response<Body>>,
{
    type Response = Response<Body>;
    type Error = S::Error;
    type Future = Either<Ready<Result<Response<Body>, S::Error>>, S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        match verdict(&self.directory, &req) {
            Verdict::UnknownStand => {
                metrics::record_outcome(Outcome::UnknownStand);
                Either::Left(future::ready(Ok(synthetic(StatusCode::BAD_REQUEST, "unknown stand"))))
            }
            Verdict::Blocked { .. } => {
                metrics::record_outcome(Outcome::Stripped);
                Either::Left(future::ready(Ok(synthetic(StatusCode::OK, "ok"))))
            }
            Verdict::Forward => Either::Right(self.inner.call(req)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProxyConfig, StandConfig};
    use crate::routing::route_request;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::{service_fn, ServiceExt};

    fn directory() -> Arc<StandDirectory> {
        let mut config = ProxyConfig {
            stands_addr: "127.0.0.1".into(),
            ..Default::default()
        };
        config.stands.insert(
            "dvwa".into(),
            StandConfig {
                port: 8081,
                strip_urls: vec!["/logout".into(), "/index.php?page=reset".into()],
                ..Default::default()
            },
        );
        Arc::new(StandDirectory::from_config(&config).unwrap())
    }

    async fn call(uri: &str, host: &str) -> (StatusCode, String, usize) {
        let directory = directory();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let svc = StripLayer::new(directory.clone()).layer(service_fn(move |_req: Request<Body>| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, std::convert::Infallible>(Response::new(Body::from("backend"))) }
        }));

        let mut req = Request::builder()
            .uri(uri)
            .header("host", host)
            .body(Body::empty())
            .unwrap();
        route_request(&directory, &mut req);

        let res = svc.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap(), calls.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_unknown_stand() {
        let (status, body, calls) = call("/index.php", "nowhere").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "unknown stand");
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_blocked_prefix() {
        let (status, body, calls) = call("/logout.php", "dvwa").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
        assert_eq!(calls, 0);
    }

    #[tokio::test]
    async fn test_blocked_prefix_with_query() {
        let (status, body, calls) = call("/index.php?page=reset&all=1", "dvwa").await;
        assert_eq!((status, body.as_str(), calls), (StatusCode::OK, "ok", 0));

        let (_, body, calls) = call("/index.php?page=home", "dvwa").await;
        assert_eq!((body.as_str(), calls), ("backend", 1));
    }

    #[tokio::test]
    async fn test_forwarded() {
        let (status, body, calls) = call("/vulnerabilities/", "dvwa").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "backend");
        assert_eq!(calls, 1);
    }
}
