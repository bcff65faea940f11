use anyhow::{bail, Context, Result};
use ethers::types::Address;
use std::str::FromStr;

/// Celo mainnet.
pub const DEFAULT_CHAIN_ID: u64 = 42220;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Chain access
    pub rpc_url: String,
    pub rpc_fallback_url: Option<String>,
    pub chain_id: u64,

    // Contracts
    pub taxi_contract_address: Address,
    pub token_address: Option<Address>,

    // Wallet
    pub signer_private_key: Option<String>,
    pub walletconnect_project_id: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            environment: Self::parse_environment()?,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("Invalid PORT")?,

            rpc_url: std::env::var("RPC_URL").context("RPC_URL required")?,
            rpc_fallback_url: optional_var("RPC_FALLBACK_URL"),
            chain_id: std::env::var("CHAIN_ID")
                .unwrap_or_else(|_| DEFAULT_CHAIN_ID.to_string())
                .parse()
                .context("Invalid CHAIN_ID")?,

            taxi_contract_address: Self::parse_address("TAXI_CONTRACT_ADDRESS")?,
            token_address: optional_var("TOKEN_ADDRESS")
                .map(|raw| {
                    Address::from_str(&raw).context("Invalid address for TOKEN_ADDRESS")
                })
                .transpose()?,

            signer_private_key: optional_var("SIGNER_PRIVATE_KEY"),
            walletconnect_project_id: optional_var("WALLETCONNECT_PROJECT_ID"),
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment() -> Result<Environment> {
        let env = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_address(var: &str) -> Result<Address> {
        let addr_str = std::env::var(var).with_context(|| format!("{} required", var))?;
        Address::from_str(&addr_str).with_context(|| format!("Invalid address for {}", var))
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http") {
            bail!("RPC_URL must be HTTP(S) URL");
        }
        if let Some(url) = &self.rpc_fallback_url {
            if !url.starts_with("http") {
                bail!("RPC_FALLBACK_URL must be HTTP(S) URL");
            }
        }
        if let Some(key) = &self.signer_private_key {
            if !key.starts_with("0x") {
                bail!("SIGNER_PRIVATE_KEY must start with 0x");
            }
        }
        if self.walletconnect_project_id.is_none() {
            tracing::debug!("WALLETCONNECT_PROJECT_ID not set");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}

fn optional_var(var: &str) -> Option<String> {
    std::env::var(var).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Config {
        Config {
            environment: Environment::Development,
            host: "127.0.0.1".into(),
            port: 8080,
            rpc_url: "https://forno.celo.org".into(),
            rpc_fallback_url: None,
            chain_id: DEFAULT_CHAIN_ID,
            taxi_contract_address: Address::repeat_byte(0x11),
            token_address: None,
            signer_private_key: None,
            walletconnect_project_id: None,
        }
    }

    #[test]
    fn accepts_read_only_config() {
        assert!(sample().validate().is_ok());
    }

    #[test]
    fn rejects_non_http_rpc() {
        let config = Config {
            rpc_url: "ws://localhost:8546".into(),
            ..sample()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_unprefixed_private_key() {
        let config = Config {
            signer_private_key: Some("deadbeef".into()),
            ..sample()
        };
        assert!(config.validate().is_err());
    }
}
