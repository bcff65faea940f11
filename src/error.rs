use crate::validation::ValidationError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ethers::{contract::ContractError, providers::Middleware};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum TaxiError {
    #[error("No wallet provider available")]
    NoWallet,

    #[error("RPC error: {0}")]
    RpcError(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction dropped before inclusion")]
    TransactionDropped,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Ledger error: {0}")]
    LedgerError(String),
}

// Signer-backed and read-only contract handles carry different middleware types
impl<M: Middleware> From<ContractError<M>> for TaxiError {
    fn from(err: ContractError<M>) -> Self {
        TaxiError::ContractError(err.to_string())
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl TaxiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            TaxiError::NoWallet => (StatusCode::SERVICE_UNAVAILABLE, "NO_WALLET"),
            TaxiError::RpcError(_) | TaxiError::ContractError(_) => {
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR")
            }
            TaxiError::TransactionDropped => (StatusCode::BAD_GATEWAY, "TRANSACTION_DROPPED"),
            TaxiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_FAILED"),
            TaxiError::InvalidParameter(_) => (StatusCode::BAD_REQUEST, "INVALID_PARAMETER"),
            TaxiError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            TaxiError::LedgerError(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

impl IntoResponse for TaxiError {
    fn into_response(self) -> Response {
        let (status, error_code) = self.status_and_code();

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id: Uuid::new_v4().to_string(),
        };

        if status.is_server_error() {
            tracing::error!(error = ?self, error_code = error_code, "Request failed");
        } else {
            tracing::debug!(error = %self, error_code = error_code, "Request rejected");
        }

        (status, Json(body)).into_response()
    }
}
