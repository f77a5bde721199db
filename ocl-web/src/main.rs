//! ocl-web - Terminology admin service
//!
//! Serves concept comparison, resource search and bulk import on top of a
//! remote terminology REST API.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use ocl_common::config::{Overrides, ServiceConfig};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocl_web::client::OclClient;
use ocl_web::{build_router, AppState};

/// Command-line arguments for ocl-web
#[derive(Parser, Debug)]
#[command(name = "ocl-web")]
#[command(about = "Terminology admin service: concept comparison, search and bulk import")]
#[command(version)]
struct Args {
    /// Base URL of the terminology API
    #[arg(long, env = "OCL_API_URL")]
    api_url: Option<String>,

    /// API token sent as `Authorization: Token <token>`
    #[arg(long, env = "OCL_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// Address to bind
    #[arg(long, env = "OCL_WEB_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "OCL_WEB_PORT")]
    port: Option<u16>,

    /// Default log filter when RUST_LOG is unset
    #[arg(long, env = "OCL_LOG_LEVEL")]
    log_level: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> Overrides {
        Overrides {
            api_url: self.api_url.clone(),
            api_token: self.api_token.clone(),
            host: self.host.clone(),
            port: self.port,
            log_level: self.log_level.clone(),
            config_file: self.config.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = ServiceConfig::resolve(&args.overrides()).context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ocl_web={0},ocl_common={0},tower_http={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting ocl-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Terminology API: {}", config.api_url);
    if config.api_token.is_none() {
        info!("No API token configured, requests are anonymous");
    }

    let client = OclClient::new(&config).context("Failed to build terminology API client")?;
    let state = AppState::new(Arc::new(client), config.api_url.clone());
    let app = build_router(state);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("ocl-web listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install terminate handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
