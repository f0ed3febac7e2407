//! Stand proxy
//!
//! A recording reverse proxy placed in front of named test stands.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────────┐
//!                    │                       STAND PROXY                         │
//!                    │                                                           │
//!   Client Request   │  ┌────────┐   ┌─────────┐   ┌───────┐   ┌─────────┐       │
//!  ──────────────────┼─▶│  http  │──▶│ routing │──▶│ strip │──▶│ cookies │       │
//!                    │  │ server │   │ (Host)  │   └───┬───┘   └────┬────┘       │
//!                    │  └────────┘   └─────────┘       │ 400/200     │            │
//!                    │                                 ▼             ▼            │
//!   Client Response  │                           synthetic     ┌──────────┐      │
//!  ◀─────────────────┼───────────────────────────  response    │ recorder │──▶ request-log.ndjson
//!                    │                                         └────┬─────┘      │
//!                    │                                              ▼            │
//!                    │                                         ┌──────────┐      │
//!  ◀─────────────────┼─────────────────────────────────────────│  sender  │◀─────┼──── Stand
//!                    │                                         └──────────┘      │
//!                    │                                                           │
//!                    │  Startup: config → directory → login bootstrap → listen   │
//!                    └──────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use stand_proxy::lifecycle::startup::{self, StartupOptions, DEFAULT_OUTPUT, DEFAULT_PORT};
use stand_proxy::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "stand-proxy")]
#[command(about = "Recording reverse proxy with scripted stand logins", long_about = None)]
struct Cli {
    /// Path to the TOML configuration
    #[arg(short = 'c', long = "config")]
    config: PathBuf,

    /// Request log output file
    #[arg(short = 'o', long = "output", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Bind host (defaults to stands_addr from the configuration)
    #[arg(short = 'b', long = "bind-host")]
    bind_host: Option<String>,

    /// Bind port
    #[arg(short = 'p', long = "port", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Proxy only this stand
    #[arg(short = 's', long = "stand")]
    stand: Option<String>,
}

impl From<Cli> for StartupOptions {
    fn from(cli: Cli) -> Self {
        Self {
            config_path: cli.config,
            output: cli.output,
            bind_host: cli.bind_host,
            port: cli.port,
            stand: cli.stand,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let options: StartupOptions = Cli::parse().into();

    let config = startup::prepare_config(&options)?;
    init_logging(&config.observability.log_level);

    tracing::info!("stand-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = startup::run(config, options).await {
        tracing::error!(error = %e, "Fatal error");
        return Err(e.into());
    }
    Ok(())
}
