use crate::{
    error::TaxiError,
    models::{Payment, Ride, TaxiUser, TokenAmount},
    services::ledger::{ChainContext, TaxiLedger},
};
use ethers::types::{Address, U256};
use std::future::Future;

/// Read-only contract calls, normalized into plain records.
///
/// A fetcher never fails: any RPC or decoding error, or a missing wallet
/// provider, is logged and degrades to an empty collection, `None` or `false`.
#[derive(Clone)]
pub struct RecordFetcher {
    chain: ChainContext,
}

impl RecordFetcher {
    pub fn new(chain: ChainContext) -> Self {
        Self { chain }
    }

    pub fn chain(&self) -> &ChainContext {
        &self.chain
    }

    pub async fn get_all_rides(&self) -> Vec<Ride> {
        let result = self.with_ledger(|l| l.get_all_rides()).await;
        settle("getAllRides", result)
    }

    pub async fn get_driver_rides(&self, driver: Address) -> Vec<Ride> {
        let result = self.with_ledger(|l| l.get_driver_rides(driver)).await;
        settle("getDriverRides", result)
    }

    pub async fn get_ride_by_id(&self, ride_id: U256) -> Option<Ride> {
        let result = self
            .with_ledger(|l| l.get_ride_by_id(ride_id))
            .await
            .map(|ride| (!ride.is_unset()).then_some(ride));
        settle("getRideById", result)
    }

    pub async fn get_all_payments(&self) -> Vec<Payment> {
        let result = self.with_ledger(|l| l.get_all_payments()).await;
        settle("getAllPayments", result)
    }

    pub async fn get_payments_by_ride_id(&self, ride_id: U256) -> Vec<Payment> {
        let result = self
            .with_ledger(|l| l.get_all_payments_by_ride_id(ride_id))
            .await;
        settle("getAllPaymentsByRideId", result)
    }

    /// Every payment made by `passenger`.
    pub async fn get_user_payments(&self, passenger: Address) -> Vec<Payment> {
        self.get_all_payments()
            .await
            .into_iter()
            .filter(|p| p.passenger_wallet_address == passenger)
            .collect()
    }

    pub async fn get_user_by_wallet_address(&self, wallet: Address) -> Option<TaxiUser> {
        let result = self
            .with_ledger(|l| l.get_user_by_wallet_address(wallet))
            .await
            .map(|user| (!user.is_unset()).then_some(user));
        settle("getUserByWalletAddress", result)
    }

    pub async fn get_balance(&self, wallet: Address) -> Option<TokenAmount> {
        let result = self.with_ledger(|l| l.get_balance(wallet)).await.map(Some);
        settle("getBalance", result)
    }

    pub async fn check_if_user_exists(&self, wallet: Address) -> bool {
        let result = self.with_ledger(|l| l.check_if_user_exists(wallet)).await;
        settle("checkIfUserExists", result)
    }

    async fn with_ledger<'a, T, F, Fut>(&'a self, call: F) -> Result<T, TaxiError>
    where
        F: FnOnce(&'a dyn TaxiLedger) -> Fut,
        Fut: Future<Output = Result<T, TaxiError>> + 'a,
    {
        let ledger = self.chain.ledger()?;
        call(ledger.as_ref()).await
    }
}

fn settle<T: Default>(method: &str, result: Result<T, TaxiError>) -> T {
    result.unwrap_or_else(|e| {
        tracing::warn!(method, error = %e, "Contract read failed, returning empty result");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::InMemoryLedger;
    use std::sync::Arc;

    #[tokio::test]
    async fn detached_context_degrades_to_empty() {
        let fetcher = RecordFetcher::new(ChainContext::detached());
        let wallet = Address::repeat_byte(0x01);

        assert!(fetcher.get_all_rides().await.is_empty());
        assert!(fetcher.get_all_payments().await.is_empty());
        assert!(fetcher.get_driver_rides(wallet).await.is_empty());
        assert!(fetcher.get_ride_by_id(U256::one()).await.is_none());
        assert!(fetcher.get_user_by_wallet_address(wallet).await.is_none());
        assert!(fetcher.get_balance(wallet).await.is_none());
        assert!(!fetcher.check_if_user_exists(wallet).await);
    }

    #[tokio::test]
    async fn rpc_failures_degrade_to_empty() {
        let ledger = InMemoryLedger::new();
        ledger.fail_reads(true);
        let fetcher = RecordFetcher::new(ChainContext::new(Arc::new(ledger)));

        assert!(fetcher.get_all_rides().await.is_empty());
        assert!(fetcher.get_balance(Address::zero()).await.is_none());
    }

    #[tokio::test]
    async fn zeroed_records_become_none() {
        let fetcher = RecordFetcher::new(ChainContext::new(Arc::new(InMemoryLedger::new())));
        assert!(fetcher.get_ride_by_id(U256::from(42)).await.is_none());
        assert!(fetcher
            .get_user_by_wallet_address(Address::repeat_byte(0x42))
            .await
            .is_none());
        // a known wallet with no funds still has a balance
        assert_eq!(
            fetcher.get_balance(Address::repeat_byte(0x42)).await,
            Some(TokenAmount::zero())
        );
    }
}
