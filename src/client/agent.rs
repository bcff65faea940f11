use anyhow::{bail, Context, Result};
use cashless_taxi::{
    config::Config,
    models::{NewRide, RegistrationForm, TokenAmount},
    services::{ChainContext, EthereumLedger, MutationSubmitter, RecordFetcher, TaxiLedger},
};
use clap::{Parser, Subcommand};
use ethers::types::{Address, U256};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Signs taxi contract transactions with SIGNER_PRIVATE_KEY.
#[derive(Parser)]
#[command(name = "taxi-agent", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register the signing wallet as a driver or passenger
    Register {
        #[arg(long)]
        username: String,
        #[arg(long)]
        email: String,
        /// "driver" or "passenger"
        #[arg(long)]
        role: String,
    },
    /// Offer a ride (drivers only)
    CreateRide {
        #[arg(long)]
        destination: String,
        /// Per-passenger fare in cUSD, e.g. 2.5
        #[arg(long, value_parser = parse_amount)]
        fare: TokenAmount,
        #[arg(long, value_parser = parse_u256)]
        passengers: U256,
        #[arg(long)]
        driver_name: String,
        #[arg(long)]
        license_plate: String,
    },
    /// Book a ride
    Book {
        #[arg(value_parser = parse_u256)]
        ride_id: U256,
    },
    /// Approve and pay the fare for one or more seats
    Pay {
        #[arg(value_parser = parse_u256)]
        ride_id: U256,
        #[arg(long, default_value = "1", value_parser = parse_u256)]
        seats: U256,
    },
    /// Mark a ride as completed (its driver only)
    Complete {
        #[arg(value_parser = parse_u256)]
        ride_id: U256,
    },
    /// Show a wallet's cUSD balance (defaults to the signer)
    Balance {
        #[arg(long, value_parser = parse_wallet)]
        wallet: Option<Address>,
    },
    /// Show the signing wallet and its registration
    Whoami,
}

fn parse_u256(raw: &str) -> Result<U256, String> {
    U256::from_dec_str(raw).map_err(|e| format!("not a decimal integer: {}", e))
}

fn parse_wallet(raw: &str) -> Result<Address, String> {
    raw.parse::<Address>()
        .map_err(|_| format!("not a wallet address: {}", raw))
}

fn parse_amount(raw: &str) -> Result<TokenAmount, String> {
    raw.parse::<TokenAmount>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let private_key = config
        .signer_private_key
        .as_deref()
        .context("SIGNER_PRIVATE_KEY required")?;
    let Some(token_address) = config.token_address else {
        bail!("TOKEN_ADDRESS required");
    };

    let ledger = EthereumLedger::new(
        &config.rpc_url,
        config.rpc_fallback_url.as_deref(),
        config.taxi_contract_address,
    )?
    .with_signer(private_key, config.chain_id, token_address)?;
    let caller = ledger
        .signer_address()
        .context("Signer not attached")?;

    let chain = ChainContext::new(Arc::new(ledger));
    let submitter = MutationSubmitter::new(chain.clone());
    let fetcher = RecordFetcher::new(chain);

    println!("Cashless Taxi Agent");
    println!("===================");
    println!("Wallet: {:?}", caller);
    println!("Chain:  {}", config.chain_id);
    println!();

    let ok = match cli.command {
        Command::Register {
            username,
            email,
            role,
        } => {
            let form = RegistrationForm {
                username,
                email_address: email,
                role,
            };
            submitter.create_user(caller, &form).await
        }
        Command::CreateRide {
            destination,
            fare,
            passengers,
            driver_name,
            license_plate,
        } => {
            let ride = NewRide {
                destination,
                fare_in_ethers: fare,
                num_passengers: passengers,
                driver_name,
                license_plate,
            };
            submitter.create_ride(caller, &ride).await
        }
        Command::Book { ride_id } => submitter.book_ride(caller, ride_id).await,
        Command::Pay { ride_id, seats } => submitter.pay_for_ride(caller, ride_id, seats).await,
        Command::Complete { ride_id } => submitter.complete_ride(caller, ride_id).await,
        Command::Balance { wallet } => {
            let wallet = wallet.unwrap_or(caller);
            match fetcher.get_balance(wallet).await {
                Some(balance) => {
                    println!("Balance of {:?}: {} cUSD", wallet, balance);
                    true
                }
                None => false,
            }
        }
        Command::Whoami => {
            match fetcher.get_user_by_wallet_address(caller).await {
                Some(user) => {
                    println!("Registered as {} ({})", user.username, user.role());
                    println!("{}", serde_json::to_string_pretty(&user)?);
                }
                None => println!("Not registered"),
            }
            true
        }
    };

    if ok {
        println!("[SUCCESS]");
        Ok(())
    } else {
        bail!("[FAILED] see log output for details")
    }
}
