use crate::{handlers::AppState, models::HealthStatus};
use axum::{extract::State, Json};
use chrono::Utc;

pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let chain = state.assembler.fetcher().chain();
    let latest_block = match chain.ledger() {
        Ok(ledger) => match ledger.ping().await {
            Ok(block) => Some(block),
            Err(e) => {
                tracing::warn!(error = %e, "Ledger health check failed");
                None
            }
        },
        Err(_) => None,
    };

    let status = match (chain.is_connected(), latest_block) {
        (true, Some(_)) => "healthy",
        (true, None) => "degraded",
        (false, _) => "unhealthy",
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ledger_connected: latest_block.is_some(),
        latest_block,
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
