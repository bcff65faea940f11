use super::encoding::{dec, timestamp_to_datetime};
use super::TokenAmount;
use crate::contracts::taxi;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ride {
    #[serde(with = "dec")]
    pub id: U256,
    pub driver_wallet_address: Address,
    pub destination: String,
    pub driver_name: String,
    pub license_plate: String,
    pub fare_in_ethers: TokenAmount,
    // Carried verbatim: some contract revisions count total seats, others
    // the passengers who have not paid yet.
    #[serde(with = "dec")]
    pub num_passengers: U256,
    pub total_fare: TokenAmount,
    #[serde(with = "dec")]
    pub created_at: U256,
    #[serde(with = "dec")]
    pub updated_at: U256,
    pub is_booked: bool,
    pub is_completed: bool,
    pub is_paid: bool,
    pub is_blank: bool,
}

impl Ride {
    /// `getRideById` on an unknown id yields a zeroed struct.
    pub fn is_unset(&self) -> bool {
        self.is_blank || (self.id.is_zero() && self.driver_wallet_address.is_zero())
    }

    pub fn created_at_datetime(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.created_at)
    }

    pub fn updated_at_datetime(&self) -> Option<DateTime<Utc>> {
        timestamp_to_datetime(self.updated_at)
    }
}

impl From<taxi::Ride> for Ride {
    fn from(raw: taxi::Ride) -> Self {
        Self {
            id: raw.id,
            driver_wallet_address: raw.driver_wallet_address,
            destination: raw.destination,
            driver_name: raw.driver_name,
            license_plate: raw.license_plate,
            fare_in_ethers: TokenAmount::from_wei(raw.fare_in_ethers),
            num_passengers: raw.num_passengers,
            total_fare: TokenAmount::from_wei(raw.total_fare),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
            is_booked: raw.is_booked,
            is_completed: raw.is_completed,
            is_paid: raw.is_paid,
            is_blank: raw.is_blank,
        }
    }
}

/// Arguments of `createRide` before the total fare is derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRide {
    pub destination: String,
    pub fare_in_ethers: TokenAmount,
    #[serde(with = "dec")]
    pub num_passengers: U256,
    pub driver_name: String,
    pub license_plate: String,
}

impl NewRide {
    /// `fare × passengers`, or `None` on overflow.
    pub fn total_fare(&self) -> Option<TokenAmount> {
        self.fare_in_ethers.checked_mul(self.num_passengers)
    }
}
