use crate::{
    error::TaxiError,
    handlers::{parse_address, AppState},
    models::{ApiResponse, TaxiUser, TokenAmount},
};
use axum::{
    extract::{Path, State},
    Json,
};

pub async fn get_user(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<TaxiUser>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let user = state
        .assembler
        .fetcher()
        .get_user_by_wallet_address(wallet)
        .await
        .ok_or_else(|| TaxiError::NotFound(format!("user {:?}", wallet)))?;
    Ok(Json(ApiResponse::new(user)))
}

/// Unreadable balances are reported as zero.
pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<ApiResponse<TokenAmount>>, TaxiError> {
    let wallet = parse_address(&address)?;
    let balance = state
        .assembler
        .fetcher()
        .get_balance(wallet)
        .await
        .unwrap_or_default();
    Ok(Json(ApiResponse::new(balance)))
}
