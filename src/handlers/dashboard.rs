use crate::{
    error::TaxiError,
    handlers::{parse_address, AppState},
    models::{
        ApiResponse, CompletedRides, DriverDashboard, ExpansionState, HomeView,
        PassengerDashboard,
    },
};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct CompletedQuery {
    /// Comma-separated `YYYY-MM` sections to open, e.g. `2023-11,2024-01`.
    pub expanded: Option<String>,
}

fn parse_expansion(raw: Option<&str>) -> Result<ExpansionState, TaxiError> {
    let mut state = ExpansionState::default();
    let Some(raw) = raw else {
        return Ok(state);
    };
    for section in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let parsed = section
            .split_once('-')
            .and_then(|(y, m)| Some((y.parse::<i32>().ok()?, m.parse::<u32>().ok()?)))
            .filter(|(_, m)| (1..=12).contains(m));
        match parsed {
            Some((year, month)) => state.expand(year, month),
            None => {
                return Err(TaxiError::InvalidParameter(format!(
                    "invalid month section: {}",
                    section
                )))
            }
        }
    }
    Ok(state)
}

pub async fn home(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<HomeView>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let view = state.assembler.home(wallet).await;
    Ok(Json(ApiResponse::new(view)))
}

pub async fn driver_dashboard(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<DriverDashboard>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let dashboard = state
        .assembler
        .driver_dashboard(wallet)
        .await
        .ok_or_else(|| TaxiError::NotFound(format!("driver {:?}", wallet)))?;
    Ok(Json(ApiResponse::new(dashboard)))
}

pub async fn passenger_dashboard(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<PassengerDashboard>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let dashboard = state
        .assembler
        .passenger_dashboard(wallet)
        .await
        .ok_or_else(|| TaxiError::NotFound(format!("passenger {:?}", wallet)))?;
    Ok(Json(ApiResponse::new(dashboard)))
}

pub async fn completed_rides(
    State(state): State<AppState>,
    Path(address): Path<String>,
    Query(query): Query<CompletedQuery>,
) -> Result<Json<ApiResponse<CompletedRides>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let expansion = parse_expansion(query.expanded.as_deref())?;
    let completed = state.assembler.completed_rides(wallet, &expansion).await;
    Ok(Json(ApiResponse::new(completed)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expansion_sections_parse_as_year_month() {
        let state = parse_expansion(Some("2023-11, 2024-01")).unwrap();
        assert!(state.is_expanded(2023, 11));
        assert!(state.is_expanded(2024, 1));
        assert!(!state.is_expanded(2023, 12));

        // repeated sections stay open
        assert!(parse_expansion(Some("2023-11,2023-11"))
            .unwrap()
            .is_expanded(2023, 11));
        assert!(!parse_expansion(None).unwrap().is_expanded(2023, 11));
    }

    #[test]
    fn malformed_sections_are_rejected() {
        for bad in ["2023", "2023-13", "nov-2023", "2023-00"] {
            assert!(parse_expansion(Some(bad)).is_err(), "{bad}");
        }
    }
}
