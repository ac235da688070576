//! Linux MCP Server - Entry point
//!
//! Parses CLI arguments, validates configuration, and serves the MCP server
//! over stdio or streamable HTTP until the transport closes or a shutdown
//! signal arrives.

use std::net::SocketAddr;

use clap::Parser;
use rmcp::service::ServiceExt;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use linux_mcp_server::config::{Args, Config};
use linux_mcp_server::error::{Result, ShellMcpError};
use linux_mcp_server::server::{http_router, LinuxMcpServer};

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries MCP JSON-RPC in stdio mode
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = Config::from_args(args)?;

    info!("Linux MCP Server v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Host directory: {}", config.hosts_file.display());
    info!(
        "Connect timeout: {}s, command timeout: {}",
        config.connect_timeout.as_secs(),
        config
            .command_timeout
            .map_or("unlimited".to_string(), |d| format!("{}s", d.as_secs()))
    );

    let server = LinuxMcpServer::new(&config);
    info!("MCP server initialized with execute_shell tool");

    match config.http_addr {
        Some(addr) => serve_http(server, addr).await?,
        None => serve_stdio(server).await?,
    }

    info!("Linux MCP Server stopped");

    Ok(())
}

async fn serve_stdio(server: LinuxMcpServer) -> Result<()> {
    info!("Starting stdio mode");

    let running = server
        .serve(rmcp::transport::io::stdio())
        .await
        .map_err(|e| {
            error!("Failed to start MCP server: {}", e);
            ShellMcpError::Server(e.to_string())
        })?;

    info!("MCP server is serving...");

    tokio::select! {
        result = running.waiting() => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {}
    }

    Ok(())
}

async fn serve_http(server: LinuxMcpServer, addr: SocketAddr) -> Result<()> {
    info!("Starting HTTP mode on {}", addr);

    let router = http_router(server);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("MCP handler listening at http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("HTTP server failed: {}", e);
            ShellMcpError::Server(e.to_string())
        })
}

/// Resolve when SIGINT or SIGTERM is received
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to register SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT (Ctrl+C), shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}
