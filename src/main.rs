use std::sync::Arc;

use anyhow::Context;
use dotenvy::dotenv;
use tracing::info;

use clientauth::logging::init_tracing;
use clientauth::metrics::init_metrics;
use clientauth::middleware::{AuthEngine, MiddlewareConfig};
use clientauth::router::init_router;
use clientauth_config::{CorsConfig, GatewayConfig, JwtConfig, SuperuserConfig};
use clientauth_gateway::UserGateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing()?;
    let metrics_handle = init_metrics()?;

    let gateway_config = GatewayConfig::from_env()?;
    let gateway = Arc::new(UserGateway::new(&gateway_config)?);

    let config = MiddlewareConfig::for_gateway(JwtConfig::from_env(), gateway)
        .superuser(SuperuserConfig::from_env());
    let engine = AuthEngine::new(config).context("refusing to serve with invalid auth configuration")?;

    let app = init_router(&engine, &CorsConfig::from_env(), metrics_handle);

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;

    info!(
        %bind_addr,
        endpoint = %gateway_config.endpoint,
        profile = %gateway_config.profile,
        "serving"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
