pub mod dashboard;
pub mod health;
pub mod rides;
pub mod users;

pub use dashboard::*;
pub use health::*;
pub use rides::*;
pub use users::*;

use crate::{
    error::TaxiError,
    services::{ChainContext, ViewAssembler},
};
use axum::{routing::get, Router};
use ethers::types::{Address, U256};
use std::{sync::Arc, time::Instant};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

#[derive(Clone)]
pub struct AppState {
    pub assembler: Arc<ViewAssembler>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(chain: ChainContext) -> Self {
        Self {
            assembler: Arc::new(ViewAssembler::new(chain)),
            started_at: Instant::now(),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/users/:address", get(get_user))
        .route("/users/:address/balance", get(get_balance))
        .route("/users/:address/home", get(home))
        .route("/drivers/:address/dashboard", get(driver_dashboard))
        .route("/drivers/:address/completed", get(completed_rides))
        .route("/passengers/:address/dashboard", get(passenger_dashboard))
        .route("/rides", get(list_rides))
        .route("/rides/:id/overview", get(ride_overview))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
}

pub(crate) fn parse_address(raw: &str) -> Result<Address, TaxiError> {
    raw.parse()
        .map_err(|_| TaxiError::InvalidParameter(format!("invalid wallet address: {}", raw)))
}

pub(crate) fn parse_ride_id(raw: &str) -> Result<U256, TaxiError> {
    U256::from_dec_str(raw)
        .map_err(|_| TaxiError::InvalidParameter(format!("invalid ride id: {}", raw)))
}
