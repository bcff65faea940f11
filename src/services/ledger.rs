//! The chain capability every fetcher and submitter goes through.
//!
//! A `TaxiLedger` stands for "an injected wallet provider connected to the taxi
//! contract". It is handed to services explicitly through a [`ChainContext`]
//! so tests can substitute [`crate::services::InMemoryLedger`].

use crate::error::TaxiError;
use crate::models::{NewRide, NewUser, Payment, Ride, TaxiUser, TokenAmount};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use serde::Serialize;
use std::sync::Arc;

/// Outcome of an included transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Success,
    Reverted,
}

/// One method per taxi contract call, plus the token allowance grant.
///
/// Reads return the contract's answer as-is (a missing record comes back
/// zeroed). Writes wait for the receipt; they fail with [`TaxiError::NoWallet`]
/// when no signer is attached.
#[async_trait]
pub trait TaxiLedger: Send + Sync {
    /// Account that signs writes, if any.
    fn signer_address(&self) -> Option<Address>;

    /// Latest block number; doubles as a liveness check.
    async fn ping(&self) -> Result<u64, TaxiError>;

    async fn check_if_user_exists(&self, wallet: Address) -> Result<bool, TaxiError>;

    async fn get_user_by_wallet_address(&self, wallet: Address) -> Result<TaxiUser, TaxiError>;

    async fn get_all_rides(&self) -> Result<Vec<Ride>, TaxiError>;

    async fn get_driver_rides(&self, driver: Address) -> Result<Vec<Ride>, TaxiError>;

    async fn get_ride_by_id(&self, ride_id: U256) -> Result<Ride, TaxiError>;

    async fn get_all_payments(&self) -> Result<Vec<Payment>, TaxiError>;

    async fn get_all_payments_by_ride_id(&self, ride_id: U256) -> Result<Vec<Payment>, TaxiError>;

    async fn get_balance(&self, wallet: Address) -> Result<TokenAmount, TaxiError>;

    async fn create_user(&self, user: &NewUser) -> Result<TxStatus, TaxiError>;

    async fn create_ride(&self, ride: &NewRide, total_fare: TokenAmount)
        -> Result<TxStatus, TaxiError>;

    async fn book_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError>;

    /// ERC20 `approve(taxiContract, amount)` on the settlement token.
    async fn approve_token(&self, amount: TokenAmount) -> Result<TxStatus, TaxiError>;

    async fn pay_for_ride(&self, ride_id: U256, seats: U256) -> Result<TxStatus, TaxiError>;

    async fn complete_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError>;
}

/// Explicitly passed handle to the chain; empty when no wallet provider exists.
#[derive(Clone, Default)]
pub struct ChainContext {
    ledger: Option<Arc<dyn TaxiLedger>>,
}

impl ChainContext {
    pub fn new(ledger: Arc<dyn TaxiLedger>) -> Self {
        Self {
            ledger: Some(ledger),
        }
    }

    /// A context with no wallet provider behind it.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn is_connected(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn ledger(&self) -> Result<&Arc<dyn TaxiLedger>, TaxiError> {
        self.ledger.as_ref().ok_or(TaxiError::NoWallet)
    }
}
