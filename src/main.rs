use std::net::Ipv4Addr;
use std::sync::Arc;

use anyhow::Context;
use deskbot::{api, config::Config, logging, service::AppService};
use tokio::net::TcpListener;

const DEFAULT_PORT: u16 = 5000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    let service = AppService::from_config(&config)
        .await
        .context("failed to initialize backend")?;
    let app = api::create_router(Arc::new(service));

    let port = config.server_port.unwrap_or(DEFAULT_PORT);
    let listener = TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("failed to bind port {port}"))?;
    tracing::info!("Listening on http://0.0.0.0:{port}");
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
