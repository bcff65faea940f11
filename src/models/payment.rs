use super::encoding::{dec, timestamp_to_datetime};
use super::TokenAmount;
use crate::contracts::taxi;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(with = "dec")]
    pub id: U256,
    #[serde(with = "dec")]
    pub ride_id: U256,
    pub passenger_wallet_address: Address,
    pub amount_paid_in_ethers: TokenAmount,
    #[serde(with = "dec")]
    pub paid_at: U256,
    pub is_blank: bool,
}

impl Payment {
    /// Zero-address entries are empty slots the contract pads ride payment lists with.
    pub fn is_placeholder(&self) -> bool {
        self.is_blank || self.passenger_wallet_address.is_zero()
    }

    pub fn paid_at_datetime(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.paid_at)
    }
}

impl From<taxi::Payment> for Payment {
    fn from(raw: taxi::Payment) -> Self {
        Self {
            id: raw.id,
            ride_id: raw.ride_id,
            passenger_wallet_address: raw.passenger_wallet_address,
            amount_paid_in_ethers: TokenAmount::from_wei(raw.amount_paid_in_ethers),
            paid_at: raw.paid_at,
            is_blank: raw.is_blank,
        }
    }
}
