use super::encoding::dec;
use crate::contracts::taxi;
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Driver,
    Passenger,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Driver => "driver",
            Role::Passenger => "passenger",
        }
    }

    pub fn is_driver(&self) -> bool {
        matches!(self, Role::Driver)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "driver" => Ok(Role::Driver),
            "passenger" => Ok(Role::Passenger),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxiUser {
    #[serde(with = "dec")]
    pub id: U256,
    pub wallet_address: Address,
    pub username: String,
    pub email_address: String,
    pub is_driver: bool,
    pub is_blank: bool,
}

impl TaxiUser {
    pub fn role(&self) -> Role {
        if self.is_driver {
            Role::Driver
        } else {
            Role::Passenger
        }
    }

    /// The contract answers lookups for unknown wallets with a zeroed struct.
    pub fn is_unset(&self) -> bool {
        self.is_blank || self.wallet_address.is_zero()
    }
}

impl From<taxi::TaxiUser> for TaxiUser {
    fn from(raw: taxi::TaxiUser) -> Self {
        Self {
            id: raw.id,
            wallet_address: raw.wallet_address,
            username: raw.username,
            email_address: raw.email_address,
            is_driver: raw.is_driver,
            is_blank: raw.is_blank,
        }
    }
}

/// Registration form as typed by the user; `role` is still free text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email_address: String,
    pub role: String,
}

/// A validated registration, ready for `createUser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub email_address: String,
    pub role: Role,
}
