//! In-memory `TaxiLedger`.
//!
//! Mirrors the taxi contract's observable behavior closely enough to drive the
//! fetchers, submitters and assembler without a chain: unknown lookups return
//! zeroed records, failed preconditions revert, payments move token balances
//! and consume the payer's allowance. Useful for tests and local demos.

use crate::{
    error::TaxiError,
    models::{NewRide, NewUser, Payment, Ride, TaxiUser, TokenAmount},
    services::ledger::{TaxiLedger, TxStatus},
};
use async_trait::async_trait;
use ethers::types::{Address, U256};
use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc, RwLock, RwLockReadGuard, RwLockWriteGuard,
    },
};

pub const GENESIS_TIMESTAMP: u64 = 1_700_000_000;

#[derive(Debug)]
struct LedgerState {
    users: Vec<TaxiUser>,
    rides: Vec<Ride>,
    payments: Vec<Payment>,
    balances: HashMap<Address, U256>,
    allowances: HashMap<Address, U256>,
    block: u64,
    now: u64,
}

impl Default for LedgerState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            rides: Vec::new(),
            payments: Vec::new(),
            balances: HashMap::new(),
            allowances: HashMap::new(),
            block: 1,
            now: GENESIS_TIMESTAMP,
        }
    }
}

impl LedgerState {
    fn user(&self, wallet: Address) -> Option<&TaxiUser> {
        self.users.iter().find(|u| u.wallet_address == wallet)
    }

    fn ride_index(&self, ride_id: U256) -> Option<usize> {
        self.rides.iter().position(|r| r.id == ride_id)
    }

    fn paid_for_ride(&self, ride_id: U256) -> TokenAmount {
        self.payments
            .iter()
            .filter(|p| p.ride_id == ride_id)
            .map(|p| p.amount_paid_in_ethers)
            .sum()
    }
}

#[derive(Clone, Default)]
pub struct InMemoryLedger {
    state: Arc<RwLock<LedgerState>>,
    signer: Option<Address>,
    failing_reads: Arc<AtomicBool>,
    submissions: Arc<AtomicU64>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle on the same ledger that signs as `signer`.
    pub fn connect(&self, signer: Address) -> Self {
        Self {
            signer: Some(signer),
            ..self.clone()
        }
    }

    pub fn set_time(&self, timestamp: u64) -> Result<(), TaxiError> {
        self.write_state()?.now = timestamp;
        Ok(())
    }

    pub fn mint(&self, wallet: Address, amount: TokenAmount) -> Result<(), TaxiError> {
        let mut state = self.write_state()?;
        let balance = state.balances.entry(wallet).or_default();
        *balance = balance.saturating_add(amount.wei());
        Ok(())
    }

    pub fn allowance(&self, owner: Address) -> Result<TokenAmount, TaxiError> {
        let state = self.read_state()?;
        Ok(TokenAmount::from_wei(
            state.allowances.get(&owner).copied().unwrap_or_default(),
        ))
    }

    /// Makes every read fail as if the RPC endpoint were down.
    pub fn fail_reads(&self, fail: bool) {
        self.failing_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of write transactions submitted so far, reverted ones included.
    pub fn submissions(&self) -> u64 {
        self.submissions.load(Ordering::SeqCst)
    }

    fn read_state(&self) -> Result<RwLockReadGuard<'_, LedgerState>, TaxiError> {
        self.state
            .read()
            .map_err(|_| TaxiError::LedgerError("ledger state lock poisoned".to_string()))
    }

    fn write_state(&self) -> Result<RwLockWriteGuard<'_, LedgerState>, TaxiError> {
        self.state
            .write()
            .map_err(|_| TaxiError::LedgerError("ledger state lock poisoned".to_string()))
    }

    fn readable(&self) -> Result<RwLockReadGuard<'_, LedgerState>, TaxiError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(TaxiError::LedgerError("RPC endpoint unavailable".to_string()));
        }
        self.read_state()
    }

    /// Runs one write transaction as the attached signer, mining a block.
    fn transact<F>(&self, method: &str, apply: F) -> Result<TxStatus, TaxiError>
    where
        F: FnOnce(&mut LedgerState, Address) -> Result<(), String>,
    {
        let signer = self.signer.ok_or(TaxiError::NoWallet)?;
        self.submissions.fetch_add(1, Ordering::SeqCst);

        let mut state = self.write_state()?;
        state.block += 1;
        match apply(&mut state, signer) {
            Ok(()) => Ok(TxStatus::Success),
            Err(reason) => {
                tracing::debug!(method, %reason, "In-memory transaction reverted");
                Ok(TxStatus::Reverted)
            }
        }
    }
}

#[async_trait]
impl TaxiLedger for InMemoryLedger {
    fn signer_address(&self) -> Option<Address> {
        self.signer
    }

    async fn ping(&self) -> Result<u64, TaxiError> {
        Ok(self.readable()?.block)
    }

    async fn check_if_user_exists(&self, wallet: Address) -> Result<bool, TaxiError> {
        Ok(self.readable()?.user(wallet).is_some())
    }

    async fn get_user_by_wallet_address(&self, wallet: Address) -> Result<TaxiUser, TaxiError> {
        Ok(self.readable()?.user(wallet).cloned().unwrap_or_default())
    }

    async fn get_all_rides(&self) -> Result<Vec<Ride>, TaxiError> {
        Ok(self.readable()?.rides.clone())
    }

    async fn get_driver_rides(&self, driver: Address) -> Result<Vec<Ride>, TaxiError> {
        let state = self.readable()?;
        Ok(state
            .rides
            .iter()
            .filter(|r| r.driver_wallet_address == driver)
            .cloned()
            .collect())
    }

    async fn get_ride_by_id(&self, ride_id: U256) -> Result<Ride, TaxiError> {
        let state = self.readable()?;
        Ok(state
            .ride_index(ride_id)
            .map(|i| state.rides[i].clone())
            .unwrap_or_default())
    }

    async fn get_all_payments(&self) -> Result<Vec<Payment>, TaxiError> {
        Ok(self.readable()?.payments.clone())
    }

    async fn get_all_payments_by_ride_id(&self, ride_id: U256) -> Result<Vec<Payment>, TaxiError> {
        let state = self.readable()?;
        Ok(state
            .payments
            .iter()
            .filter(|p| p.ride_id == ride_id)
            .cloned()
            .collect())
    }

    async fn get_balance(&self, wallet: Address) -> Result<TokenAmount, TaxiError> {
        let state = self.readable()?;
        Ok(TokenAmount::from_wei(
            state.balances.get(&wallet).copied().unwrap_or_default(),
        ))
    }

    async fn create_user(&self, user: &NewUser) -> Result<TxStatus, TaxiError> {
        self.transact("createUser", |state, signer| {
            if state.user(signer).is_some() {
                return Err("user already exists".to_string());
            }
            let id = U256::from(state.users.len() + 1);
            state.users.push(TaxiUser {
                id,
                wallet_address: signer,
                username: user.username.clone(),
                email_address: user.email_address.clone(),
                is_driver: user.role.is_driver(),
                is_blank: false,
            });
            Ok(())
        })
    }

    async fn create_ride(&self, ride: &NewRide, total_fare: TokenAmount) -> Result<TxStatus, TaxiError> {
        self.transact("createRide", |state, signer| {
            match state.user(signer) {
                Some(user) if user.is_driver => {}
                Some(_) => return Err("only drivers can create rides".to_string()),
                None => return Err("unregistered wallet".to_string()),
            }
            let id = U256::from(state.rides.len() + 1);
            let now = U256::from(state.now);
            state.rides.push(Ride {
                id,
                driver_wallet_address: signer,
                destination: ride.destination.clone(),
                driver_name: ride.driver_name.clone(),
                license_plate: ride.license_plate.clone(),
                fare_in_ethers: ride.fare_in_ethers,
                num_passengers: ride.num_passengers,
                total_fare,
                created_at: now,
                updated_at: now,
                is_booked: false,
                is_completed: false,
                is_paid: false,
                is_blank: false,
            });
            Ok(())
        })
    }

    async fn book_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError> {
        self.transact("bookRide", |state, _signer| {
            let index = state.ride_index(ride_id).ok_or("ride not found")?;
            let now = U256::from(state.now);
            let ride = &mut state.rides[index];
            if ride.is_completed {
                return Err("ride already completed".to_string());
            }
            ride.is_booked = true;
            ride.updated_at = now;
            Ok(())
        })
    }

    async fn approve_token(&self, amount: TokenAmount) -> Result<TxStatus, TaxiError> {
        self.transact("approve", |state, signer| {
            state.allowances.insert(signer, amount.wei());
            Ok(())
        })
    }

    async fn pay_for_ride(&self, ride_id: U256, seats: U256) -> Result<TxStatus, TaxiError> {
        self.transact("payForRide", |state, signer| {
            let index = state.ride_index(ride_id).ok_or("ride not found")?;
            let ride = state.rides[index].clone();
            if ride.is_completed {
                return Err("ride already completed".to_string());
            }
            if seats.is_zero() || seats > ride.num_passengers {
                return Err("invalid number of seats".to_string());
            }
            let amount = ride
                .fare_in_ethers
                .checked_mul(seats)
                .ok_or("fare overflow")?
                .wei();

            let allowance = state.allowances.get(&signer).copied().unwrap_or_default();
            if allowance < amount {
                return Err("insufficient allowance".to_string());
            }
            let balance = state.balances.get(&signer).copied().unwrap_or_default();
            if balance < amount {
                return Err("insufficient balance".to_string());
            }

            state.allowances.insert(signer, allowance - amount);
            state.balances.insert(signer, balance - amount);
            let driver_balance = state.balances.entry(ride.driver_wallet_address).or_default();
            *driver_balance = driver_balance.saturating_add(amount);

            let now = U256::from(state.now);
            let id = U256::from(state.payments.len() + 1);
            state.payments.push(Payment {
                id,
                ride_id,
                passenger_wallet_address: signer,
                amount_paid_in_ethers: TokenAmount::from_wei(amount),
                paid_at: now,
                is_blank: false,
            });

            let paid = state.paid_for_ride(ride_id);
            let ride = &mut state.rides[index];
            ride.is_paid = paid >= ride.total_fare;
            ride.updated_at = now;
            Ok(())
        })
    }

    async fn complete_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError> {
        self.transact("completeRide", |state, signer| {
            let index = state.ride_index(ride_id).ok_or("ride not found")?;
            let now = U256::from(state.now);
            let ride = &mut state.rides[index];
            if ride.driver_wallet_address != signer {
                return Err("only the ride's driver can complete it".to_string());
            }
            if ride.is_completed {
                return Err("ride already completed".to_string());
            }
            ride.is_completed = true;
            ride.updated_at = now;
            Ok(())
        })
    }
}
