use anyhow::Result;
use cashless_taxi::{
    config::Config,
    handlers::{router, AppState},
    services::{ChainContext, EthereumLedger},
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting cashless taxi API v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    // The API only reads; no signer is attached here
    let ledger = EthereumLedger::new(
        &config.rpc_url,
        config.rpc_fallback_url.as_deref(),
        config.taxi_contract_address,
    )?;
    let app = router(AppState::new(ChainContext::new(Arc::new(ledger))));

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl+c");
        return;
    }
    tracing::info!("Shutting down gracefully...");
}
