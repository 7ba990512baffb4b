use std::net::SocketAddr;
use std::sync::Arc;

use crate::api::mcp::{stdio_loop, McpServer};
use crate::clients::DaAdminClient;
use crate::infra::config::Config;

/// Wire the DA Admin client into the protocol handler.
pub fn build_server(cfg: &Config) -> anyhow::Result<McpServer> {
    let client = DaAdminClient::from_config(&cfg.da_admin)?;
    Ok(McpServer::new(Arc::new(client)))
}

pub async fn run_server() -> anyhow::Result<()> {
    let cfg = Config::from_env_and_toml()?;
    cfg.validate()?;
    tracing::info!(
        mode = %cfg.mode,
        port = cfg.port,
        base_url = %cfg.da_admin.base_url,
        timeout_ms = cfg.da_admin.timeout_ms,
        "BOOT da-live-mcp-gateway"
    );
    let server = build_server(&cfg)?;

    if cfg.mode == "stdio" {
        return stdio_loop(server).await;
    }

    let app = crate::infra::http_app::build_app(server);
    let addr: SocketAddr = ([0, 0, 0, 0], cfg.port).into();
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
