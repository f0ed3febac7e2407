//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (tracing)
//! - Bind server to listener
//! - Route each request to its stand and run it through the pipeline
//! - Turn fatal pipeline errors into a process shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ProxyError;
use crate::http::forwarding::{append_forwarded_for, strip_hop_by_hop};
use crate::lifecycle::Shutdown;
use crate::observability::metrics::{self, Outcome};
use crate::pipeline::{build_pipeline, HttpSender, Pipeline};
use crate::recorder::RequestLog;
use crate::routing::{route_request, StandDirectory};

/// Error returned when the server stops abnormally.
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("fatal error while serving: {0}")]
    Fatal(String),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: Arc<StandDirectory>,
    pub pipeline: Pipeline<HttpSender>,
    pub shutdown: Arc<Shutdown>,
}

/// HTTP server for the stand proxy.
pub struct HttpServer {
    router: Router,
    shutdown: Arc<Shutdown>,
}

impl HttpServer {
    /// Create a new HTTP server over an already bootstrapped directory.
    pub fn new(directory: Arc<StandDirectory>, log: Arc<RequestLog>, shutdown: Arc<Shutdown>) -> Self {
        let pipeline = build_pipeline(directory.clone(), log, HttpSender::new());

        let state = AppState {
            directory,
            pipeline,
            shutdown: shutdown.clone(),
        };

        let router = Self::build_router(state);
        Self { router, shutdown }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .fallback(proxy_handler)
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    ///
    /// Returns an error if serving stopped because of a fatal pipeline failure.
    pub async fn run(self, listener: TcpListener) -> Result<(), ServeError> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal(self.shutdown.clone()))
            .await?;

        if let Some(reason) = self.shutdown.fatal_reason() {
            return Err(ServeError::Fatal(reason));
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
/// Resolves the stand and hands the request to the pipeline.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    mut request: Request<Body>,
) -> Response {
    let start_time = Instant::now();
    let span = tracing::info_span!(
        "proxy",
        request_id = %Uuid::new_v4(),
        method = %request.method(),
        uri = %request.uri(),
    );

    async move {
        strip_hop_by_hop(request.headers_mut());
        append_forwarded_for(request.headers_mut(), addr.ip());

        let stand = route_request(&state.directory, &mut request).map(|s| s.name.clone());
        tracing::debug!(stand = ?stand, target = %request.uri(), "Routed request");

        match state.pipeline.clone().oneshot(request).await {
            Ok(mut response) => {
                strip_hop_by_hop(response.headers_mut());
                if let Some(stand) = &stand {
                    metrics::record_latency(stand, response.status().as_u16(), start_time);
                }
                response
            }
            Err(e) if e.is_fatal() => {
                tracing::error!(error = %e, "Fatal error, shutting down");
                metrics::record_outcome(Outcome::Fatal);
                state.shutdown.trigger_fatal(e.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, "request recording failed").into_response()
            }
            Err(e @ ProxyError::Cookie(_)) => {
                tracing::error!(error = %e, stand = ?stand, "Cookie injection failed");
                metrics::record_outcome(Outcome::CookieError);
                (StatusCode::INTERNAL_SERVER_ERROR, "cookie injection failed").into_response()
            }
            Err(e) => {
                tracing::error!(error = %e, stand = ?stand, "Upstream error");
                metrics::record_outcome(Outcome::UpstreamError);
                (StatusCode::BAD_GATEWAY, "Upstream request failed").into_response()
            }
        }
    }
    .instrument(span)
    .await
}

/// Wait for Ctrl+C or an internal shutdown trigger.
async fn shutdown_signal(shutdown: Arc<Shutdown>) {
    let mut rx = shutdown.subscribe();
    if shutdown.is_triggered() {
        return;
    }

    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Shutdown signal received");
        }
        _ = rx.recv() => {
            tracing::info!("Internal shutdown triggered");
        }
    }
}
