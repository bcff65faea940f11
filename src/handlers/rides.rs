use crate::{
    error::TaxiError,
    handlers::{parse_ride_id, AppState},
    models::{ApiResponse, Ride, RideWithPayments},
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RideStatus {
    Open,
    Completed,
}

#[derive(Debug, Deserialize)]
pub struct RideFilter {
    pub status: Option<RideStatus>,
}

pub async fn list_rides(
    State(state): State<AppState>,
    Query(filter): Query<RideFilter>,
) -> Json<ApiResponse<Vec<Ride>>> {
    let rides = state.assembler.fetcher().get_all_rides().await;
    let rides = match filter.status {
        Some(RideStatus::Open) => rides.into_iter().filter(|r| !r.is_completed).collect(),
        Some(RideStatus::Completed) => rides.into_iter().filter(|r| r.is_completed).collect(),
        None => rides,
    };
    Json(ApiResponse::new(rides))
}

pub async fn ride_overview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<RideWithPayments>>, TaxiError> {
    let ride_id = parse_ride_id(&id)?;
    let overview = state
        .assembler
        .ride_overview(ride_id)
        .await
        .ok_or_else(|| TaxiError::NotFound(format!("completed ride {}", ride_id)))?;
    Ok(Json(ApiResponse::new(overview)))
}
