//! # Zilliqa SDK for Rust
//!
//! Client-side core for invoking Zilliqa smart contracts: key handling,
//! transaction construction and signing, submission over JSON-RPC and
//! waiting for the receipt.
//!
//! ## Features
//!
//! - In-memory key store with Schnorr signatures over secp256k1
//! - Typed Scilla call arguments validated before anything is sent
//! - Canonical protobuf transaction encoding, bit-exact with the network
//! - Async JSON-RPC client with per-request timeouts
//! - Receipt polling with bounded attempts
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use zilliqa_sdk::client::Contracts;
//! use zilliqa_sdk::crypto::{EnvSecretSource, KeyStore};
//! use zilliqa_sdk::types::{units, Address, TxOptions, Units};
//! use zilliqa_sdk::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::testnet();
//!
//!     let mut keys = KeyStore::new();
//!     let account = keys.add_key_from_source(&EnvSecretSource::default())?;
//!
//!     let contracts = Contracts::new(&config, Arc::new(keys))?;
//!     let token = contracts.at("0x509ae6e5d91cee3c6571dcd04aa08288a29d563a".parse::<Address>()?);
//!
//!     let options = TxOptions::new()
//!         .version(config.version())
//!         .gas_price(units::to_qa("1000", Units::Li)?)
//!         .gas_limit(10_000);
//!     let receipt = token.mint(account.address, 100_000_000, &options).await?;
//!     println!("{}", serde_json::to_string_pretty(&receipt)?);
//!
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod client;
pub mod crypto;
pub mod error;
pub mod types;

pub use builder::TransactionBuilder;
pub use client::{ContractHandle, Contracts, ReceiptWaiter, RpcClient};
pub use crypto::{Account, KeyStore};
pub use error::{CallStage, Result, SdkError};
pub use types::{Address, Amount, ContractArg, Receipt, TxId, TxOptions};

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const VERSION_MAJOR: &str = env!("CARGO_PKG_VERSION_MAJOR");
pub const VERSION_MINOR: &str = env!("CARGO_PKG_VERSION_MINOR");
pub const VERSION_PATCH: &str = env!("CARGO_PKG_VERSION_PATCH");

/// Initialize the SDK (sets up logging)
pub fn init() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .try_init();
}

/// SDK configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub endpoint_url: String,
    pub chain_id: u16,
    pub msg_version: u16,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub max_attempts: u32,
    /// Contract called when none is given explicitly
    pub contract_address: Option<Address>,
    /// Environment variable holding the sender's hex private key
    pub private_key_env: String,
    /// Gas price as a decimal in `gas_price_unit`
    pub gas_price: String,
    pub gas_price_unit: types::Units,
    pub gas_limit: u64,
}

impl Config {
    /// Create a new configuration
    pub fn new(endpoint_url: String, chain_id: u16) -> Self {
        Self {
            endpoint_url,
            chain_id,
            msg_version: types::version::MSG_VERSION,
            request_timeout_secs: 30,
            poll_interval_ms: 1_000,
            max_attempts: 33,
            contract_address: None,
            private_key_env: crypto::PRIVATE_KEY_ENV_VAR.to_string(),
            gas_price: "1000".to_string(),
            gas_price_unit: types::Units::Li,
            gas_limit: 10_000,
        }
    }

    /// Create configuration for the developer testnet
    pub fn testnet() -> Self {
        Self::new(
            "https://dev-api.zilliqa.com".to_string(),
            types::version::TESTNET_CHAIN_ID,
        )
    }

    pub fn mainnet() -> Self {
        Self::new(
            "https://api.zilliqa.com".to_string(),
            types::version::MAINNET_CHAIN_ID,
        )
    }

    /// Create configuration for a local isolated server
    pub fn local() -> Self {
        Self::new("http://localhost:5555".to_string(), 222)
    }

    /// Parse from TOML. Missing keys take their testnet defaults.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Transaction version for this network
    pub fn version(&self) -> u32 {
        types::version::encode(self.chain_id, self.msg_version)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Gas price converted to Qa
    pub fn gas_price_qa(&self) -> Result<Amount> {
        types::units::to_qa(&self.gas_price, self.gas_price_unit)
    }

    /// Call options carrying this network's version and the configured gas
    pub fn tx_options(&self) -> Result<TxOptions> {
        Ok(TxOptions::new()
            .version(self.version())
            .gas_price(self.gas_price_qa()?)
            .gas_limit(self.gas_limit))
    }

    fn validate(&self) -> Result<()> {
        if self.endpoint_url.is_empty() {
            return Err(SdkError::Config("endpoint_url must not be empty".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(SdkError::Config("max_attempts must be at least 1".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(SdkError::Config(
                "request_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.gas_limit == 0 {
            return Err(SdkError::Config("gas_limit must be at least 1".to_string()));
        }
        if self.private_key_env.is_empty() {
            return Err(SdkError::Config("private_key_env must not be empty".to_string()));
        }
        self.gas_price_qa()
            .map_err(|e| SdkError::Config(format!("gas_price: {}", e)))?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::testnet()
    }
}
