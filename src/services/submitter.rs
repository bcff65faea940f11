use crate::{
    error::TaxiError,
    models::{NewRide, RegistrationForm},
    services::ledger::{ChainContext, TaxiLedger, TxStatus},
    validation,
};
use ethers::types::{Address, U256};
use std::future::Future;

/// State-changing contract calls.
///
/// Each submitter validates its arguments locally, checks that `caller` is the
/// account the wallet will sign with, submits and waits for the receipt. The
/// result is `true` only for a successful receipt; every failure (validation,
/// missing wallet, rejection, revert, RPC error) is logged and yields `false`.
/// Nothing deduplicates repeated submissions.
#[derive(Clone)]
pub struct MutationSubmitter {
    chain: ChainContext,
}

impl MutationSubmitter {
    pub fn new(chain: ChainContext) -> Self {
        Self { chain }
    }

    pub async fn create_user(&self, caller: Address, form: &RegistrationForm) -> bool {
        let user = match form.validate() {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!(error = %e, "Registration rejected before submission");
                return false;
            }
        };
        self.submit("createUser", caller, |l| l.create_user(&user))
            .await
    }

    /// Total fare is derived as `fare × passengers`.
    pub async fn create_ride(&self, caller: Address, ride: &NewRide) -> bool {
        if let Err(e) = validation::validate_new_ride(ride) {
            tracing::warn!(error = %e, "Ride rejected before submission");
            return false;
        }
        let Some(total_fare) = ride.total_fare() else {
            return false;
        };
        self.submit("createRide", caller, |l| l.create_ride(ride, total_fare))
            .await
    }

    pub async fn book_ride(&self, caller: Address, ride_id: U256) -> bool {
        self.submit("bookRide", caller, |l| l.book_ride(ride_id))
            .await
    }

    /// Approves `fare × seats` of the settlement token, then pays.
    ///
    /// The payment is only sent once the approval has been included successfully.
    pub async fn pay_for_ride(&self, caller: Address, ride_id: U256, seats: U256) -> bool {
        let ride = match self.chain.ledger() {
            Ok(ledger) => ledger.get_ride_by_id(ride_id).await,
            Err(e) => Err(e),
        };
        let ride = match ride {
            Ok(ride) if !ride.is_unset() => ride,
            Ok(_) => {
                tracing::warn!(ride_id = %ride_id, "Cannot pay for unknown ride");
                return false;
            }
            Err(e) => {
                tracing::error!(ride_id = %ride_id, error = %e, "Failed to load ride for payment");
                return false;
            }
        };

        if let Err(e) = validation::validate_seats(seats, &ride) {
            tracing::warn!(ride_id = %ride_id, error = %e, "Payment rejected before submission");
            return false;
        }
        let Some(amount) = ride.fare_in_ethers.checked_mul(seats) else {
            tracing::warn!(ride_id = %ride_id, "Payment amount overflows");
            return false;
        };

        tracing::info!(ride_id = %ride_id, seats = %seats, amount = %amount, "Paying for ride");

        if !self.submit("approve", caller, |l| l.approve_token(amount)).await {
            return false;
        }
        self.submit("payForRide", caller, |l| l.pay_for_ride(ride_id, seats))
            .await
    }

    pub async fn complete_ride(&self, caller: Address, ride_id: U256) -> bool {
        self.submit("completeRide", caller, |l| l.complete_ride(ride_id))
            .await
    }

    async fn submit<'a, F, Fut>(&'a self, method: &'static str, caller: Address, call: F) -> bool
    where
        F: FnOnce(&'a dyn TaxiLedger) -> Fut,
        Fut: Future<Output = Result<TxStatus, TaxiError>> + 'a,
    {
        let ledger = match self.chain.ledger() {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!(method, error = %e, "Cannot submit transaction");
                return false;
            }
        };

        match ledger.signer_address() {
            Some(signer) if signer == caller => {}
            Some(signer) => {
                tracing::warn!(
                    method,
                    caller = ?caller,
                    signer = ?signer,
                    "Caller is not the connected wallet"
                );
                return false;
            }
            None => {
                tracing::warn!(method, "No signing wallet connected");
                return false;
            }
        }

        match call(ledger.as_ref()).await {
            Ok(TxStatus::Success) => {
                tracing::info!(method, caller = ?caller, "Transaction succeeded");
                true
            }
            Ok(TxStatus::Reverted) => {
                tracing::warn!(method, caller = ?caller, "Transaction reverted");
                false
            }
            Err(e) => {
                tracing::error!(method, caller = ?caller, error = %e, "Transaction failed");
                false
            }
        }
    }
}
