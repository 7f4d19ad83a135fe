//! Masking proxy server entry point.

use proxy_api::{create_router, ApiError, ApiResult, AppState};
use proxy_core::ProxyConfig;
use std::net::SocketAddr;

#[tokio::main]
async fn main() -> ApiResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .json()
        .init();

    let config = ProxyConfig::from_env();
    let state = AppState::new(config);
    let app = create_router(state);

    let addr = resolve_bind_addr()?;
    tracing::info!(%addr, "starting masking proxy");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("failed to bind {addr}: {e}")))?;

    tokio::select! {
        result = axum::serve(listener, app) => {
            result.map_err(|e| ApiError::internal_error(format!("server error: {e}")))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
        }
    }

    Ok(())
}

fn resolve_bind_addr() -> ApiResult<SocketAddr> {
    let host = std::env::var("PROXY_BIND").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT")
        .or_else(|_| std::env::var("PROXY_PORT"))
        .unwrap_or_else(|_| "8080".to_string());
    let addr = format!("{host}:{port}");
    addr.parse()
        .map_err(|e| ApiError::internal_error(format!("invalid bind address {addr}: {e}")))
}
