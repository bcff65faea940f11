use crate::{
    contracts::{TaxiContract, IERC20},
    error::TaxiError,
    models::{NewRide, NewUser, Payment, Ride, TaxiUser, TokenAmount},
    services::ledger::{TaxiLedger, TxStatus},
};
use anyhow::{Context, Result};
use async_trait::async_trait;
use ethers::{
    abi::Detokenize,
    prelude::*,
    providers::{Http, Provider},
};
use std::sync::Arc;

type SigningClient = SignerMiddleware<Provider<Http>, LocalWallet>;
type ReadCall<D> = ContractCall<Provider<Http>, D>;

struct SignerSession {
    address: Address,
    taxi: TaxiContract<SigningClient>,
    token: IERC20<SigningClient>,
}

/// `TaxiLedger` backed by a JSON-RPC endpoint.
///
/// Reads go to the primary provider and are retried once against the fallback.
/// Writes need a signer attached with [`EthereumLedger::with_signer`].
pub struct EthereumLedger {
    provider: Arc<Provider<Http>>,
    primary: TaxiContract<Provider<Http>>,
    fallback: Option<TaxiContract<Provider<Http>>>,
    contract_address: Address,
    signer: Option<SignerSession>,
}

impl EthereumLedger {
    pub fn new(rpc_url: &str, fallback_url: Option<&str>, contract_address: Address) -> Result<Self> {
        let provider = Arc::new(
            Provider::<Http>::try_from(rpc_url).with_context(|| format!("Invalid RPC URL: {}", rpc_url))?,
        );
        let primary = TaxiContract::new(contract_address, provider.clone());

        let fallback = if let Some(url) = fallback_url {
            let fallback_provider = Provider::<Http>::try_from(url)
                .with_context(|| format!("Invalid fallback RPC URL: {}", url))?;
            Some(TaxiContract::new(contract_address, Arc::new(fallback_provider)))
        } else {
            None
        };

        tracing::info!(
            contract = ?contract_address,
            fallback = fallback.is_some(),
            "Taxi contract ledger initialized"
        );

        Ok(Self {
            provider,
            primary,
            fallback,
            contract_address,
            signer: None,
        })
    }

    /// Attaches a local signing wallet for writes; `token_address` is the cUSD contract.
    pub fn with_signer(mut self, private_key: &str, chain_id: u64, token_address: Address) -> Result<Self> {
        let wallet = private_key
            .parse::<LocalWallet>()
            .context("Invalid signer private key")?
            .with_chain_id(chain_id);
        let address = wallet.address();

        let client = Arc::new(SignerMiddleware::new((*self.provider).clone(), wallet));
        let taxi = TaxiContract::new(self.contract_address, client.clone());
        let token = IERC20::new(token_address, client);

        tracing::info!(signer = ?address, chain_id, "Signer attached");

        self.signer = Some(SignerSession {
            address,
            taxi,
            token,
        });
        Ok(self)
    }

    fn session(&self) -> Result<&SignerSession, TaxiError> {
        self.signer.as_ref().ok_or(TaxiError::NoWallet)
    }

    async fn read<D, F>(&self, method: &str, build: F) -> Result<D, TaxiError>
    where
        D: Detokenize + Send + Sync,
        F: Fn(&TaxiContract<Provider<Http>>) -> ReadCall<D> + Send + Sync,
    {
        match build(&self.primary).call().await {
            Ok(value) => Ok(value),
            Err(e) => match &self.fallback {
                Some(fallback) => {
                    tracing::warn!(method, error = %e, "Primary RPC failed, trying fallback");
                    Ok(build(fallback).call().await?)
                }
                None => Err(e.into()),
            },
        }
    }

    async fn send<D>(&self, method: &str, call: ContractCall<SigningClient, D>) -> Result<TxStatus, TaxiError>
    where
        D: Detokenize + Send + Sync,
    {
        let pending = call.send().await?;
        let tx_hash = *pending;

        tracing::info!(method, tx = ?tx_hash, "Transaction sent, waiting for confirmation...");

        let receipt = pending.await?.ok_or(TaxiError::TransactionDropped)?;

        if receipt.status == Some(1.into()) {
            tracing::info!(method, tx = ?receipt.transaction_hash, "Transaction confirmed");
            Ok(TxStatus::Success)
        } else {
            tracing::warn!(method, tx = ?receipt.transaction_hash, "Transaction reverted onchain");
            Ok(TxStatus::Reverted)
        }
    }
}

#[async_trait]
impl TaxiLedger for EthereumLedger {
    fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|s| s.address)
    }

    async fn ping(&self) -> Result<u64, TaxiError> {
        let block = self.provider.get_block_number().await?;
        Ok(block.as_u64())
    }

    async fn check_if_user_exists(&self, wallet: Address) -> Result<bool, TaxiError> {
        self.read("checkIfUserExists", |c| c.check_if_user_exists(wallet))
            .await
    }

    async fn get_user_by_wallet_address(&self, wallet: Address) -> Result<TaxiUser, TaxiError> {
        let raw = self
            .read("getUserByWalletAddress", |c| c.get_user_by_wallet_address(wallet))
            .await?;
        Ok(raw.into())
    }

    async fn get_all_rides(&self) -> Result<Vec<Ride>, TaxiError> {
        let raw = self.read("getAllRides", |c| c.get_all_rides()).await?;
        Ok(raw.into_iter().map(Ride::from).collect())
    }

    async fn get_driver_rides(&self, driver: Address) -> Result<Vec<Ride>, TaxiError> {
        let raw = self
            .read("getDriverRides", |c| c.get_driver_rides(driver))
            .await?;
        Ok(raw.into_iter().map(Ride::from).collect())
    }

    async fn get_ride_by_id(&self, ride_id: U256) -> Result<Ride, TaxiError> {
        let raw = self.read("getRideById", |c| c.get_ride_by_id(ride_id)).await?;
        Ok(raw.into())
    }

    async fn get_all_payments(&self) -> Result<Vec<Payment>, TaxiError> {
        let raw = self.read("getAllPayments", |c| c.get_all_payments()).await?;
        Ok(raw.into_iter().map(Payment::from).collect())
    }

    async fn get_all_payments_by_ride_id(&self, ride_id: U256) -> Result<Vec<Payment>, TaxiError> {
        let raw = self
            .read("getAllPaymentsByRideId", |c| c.get_all_payments_by_ride_id(ride_id))
            .await?;
        Ok(raw.into_iter().map(Payment::from).collect())
    }

    async fn get_balance(&self, wallet: Address) -> Result<TokenAmount, TaxiError> {
        let wei = self.read("getBalance", |c| c.get_balance(wallet)).await?;
        Ok(TokenAmount::from_wei(wei))
    }

    async fn create_user(&self, user: &NewUser) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        let call = session.taxi.create_user(
            user.username.clone(),
            user.email_address.clone(),
            user.role.is_driver(),
        );
        self.send("createUser", call).await
    }

    async fn create_ride(&self, ride: &NewRide, total_fare: TokenAmount) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        let call = session.taxi.create_ride(
            ride.destination.clone(),
            ride.fare_in_ethers.wei(),
            ride.num_passengers,
            total_fare.wei(),
            ride.driver_name.clone(),
            ride.license_plate.clone(),
        );
        self.send("createRide", call).await
    }

    async fn book_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        self.send("bookRide", session.taxi.book_ride(ride_id)).await
    }

    async fn approve_token(&self, amount: TokenAmount) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        let call = session.token.approve(self.contract_address, amount.wei());
        self.send("approve", call).await
    }

    async fn pay_for_ride(&self, ride_id: U256, seats: U256) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        self.send("payForRide", session.taxi.pay_for_ride(ride_id, seats))
            .await
    }

    async fn complete_ride(&self, ride_id: U256) -> Result<TxStatus, TaxiError> {
        let session = self.session()?;
        self.send("completeRide", session.taxi.complete_ride(ride_id))
            .await
    }
}
