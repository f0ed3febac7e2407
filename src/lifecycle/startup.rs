//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration, narrow it to a chosen stand
//! - Build the stand directory and run the login bootstrap
//! - Open the request log, start metrics
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - Listener binds last, after every login has finished

use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::auth::{log_in_all, LoginError};
use crate::config::{load_config, select_stand, ConfigError, ProxyConfig};
use crate::http::{HttpServer, ServeError};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::recorder::{RecordError, RequestLog};
use crate::routing::{DirectoryError, StandDirectory};

/// Default request log location.
pub const DEFAULT_OUTPUT: &str = "./request-log.ndjson";

/// Default listening port.
pub const DEFAULT_PORT: u16 = 8000;

/// Process-level options, usually from the command line.
#[derive(Debug, Clone)]
pub struct StartupOptions {
    pub config_path: PathBuf,
    pub output: PathBuf,
    pub bind_host: Option<String>,
    pub port: u16,
    pub stand: Option<String>,
}

/// Failure that prevents the proxy from starting or keeps it from running.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Directory(#[from] DirectoryError),

    #[error("login bootstrap failed: {0}")]
    Login(#[from] LoginError),

    #[error("failed to open request log: {0}")]
    RequestLog(#[source] RecordError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serve(#[from] ServeError),
}

/// Load the configuration file and apply the single-stand restriction.
pub fn prepare_config(options: &StartupOptions) -> Result<ProxyConfig, StartupError> {
    let config = load_config(&options.config_path)?;
    let config = match &options.stand {
        Some(stand) => select_stand(config, stand)?,
        None => config,
    };
    Ok(config)
}

/// Build the directory and log every stand in. Nothing is shared before this returns.
pub async fn bootstrap(config: &ProxyConfig) -> Result<Arc<StandDirectory>, StartupError> {
    let mut directory = StandDirectory::from_config(config)?;
    log_in_all(&mut directory).await?;
    Ok(Arc::new(directory))
}

/// Run the proxy until shutdown.
pub async fn run(config: ProxyConfig, options: StartupOptions) -> Result<(), StartupError> {
    tracing::info!(
        stands = config.stands.len(),
        stands_addr = %config.stands_addr,
        dns_suffix = ?config.dns_suffix,
        "Configuration loaded"
    );

    let directory = bootstrap(&config).await?;
    for stand in directory.stands() {
        tracing::info!(stand = %stand.name, hostname = %stand.hostname, upstream = %stand.upstream, "Proxying stand");
    }

    let log = Arc::new(RequestLog::open(&options.output).map_err(StartupError::RequestLog)?);

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let bind_host = options
        .bind_host
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| config.stands_addr.clone());
    let listener = TcpListener::bind((bind_host.as_str(), options.port))
        .await
        .map_err(|source| StartupError::Bind {
            address: format!("{}:{}", bind_host, options.port),
            source,
        })?;
    let local_addr = listener.local_addr().map_err(ServeError::Io)?;
    tracing::info!(address = %local_addr, "Listening for connections");

    let server = HttpServer::new(directory, log, Arc::new(Shutdown::new()));
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
