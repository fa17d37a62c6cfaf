use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use zilliqa_sdk::client::Contracts;
use zilliqa_sdk::crypto::{EnvSecretSource, KeyStore};
use zilliqa_sdk::types::{Address, Units};
use zilliqa_sdk::{Config, SdkError};

const DEFAULT_CONTRACT: &str = "0x509ae6e5d91cee3c6571dcd04aa08288a29d563a";

#[derive(Clone, Copy, ValueEnum)]
enum Network {
    Testnet,
    Mainnet,
    Local,
}

#[derive(Parser)]
#[command(name = "zil-mint")]
#[command(about = "Call Mint on a Zilliqa token contract and print the receipt", long_about = None)]
struct Cli {
    /// TOML configuration file; takes precedence over --network
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long, value_enum, default_value = "testnet")]
    network: Network,

    /// Override the node endpoint
    #[arg(long, env = "ZIL_ENDPOINT")]
    endpoint: Option<String>,

    /// Contract to call; falls back to the configured one, then the demo token
    #[arg(long)]
    contract: Option<Address>,

    /// Token recipient; defaults to the sender
    #[arg(long)]
    recipient: Option<Address>,

    #[arg(long, default_value_t = 100_000_000)]
    amount: u128,

    /// Gas price in --gas-price-unit [default: 1000]
    #[arg(long)]
    gas_price: Option<String>,

    /// Unit of --gas-price: zil, li or qa [default: li]
    #[arg(long)]
    gas_price_unit: Option<Units>,

    /// [default: 10000]
    #[arg(long)]
    gas_limit: Option<u64>,

    /// Environment variable holding the hex private key [default: ZIL_PRIVATE_KEY]
    #[arg(long)]
    key_env: Option<String>,

    /// Check the node's chain id before sending
    #[arg(long)]
    verify_chain: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    zilliqa_sdk::init();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(stage = ?e.stage(), "Mint failed");
            eprintln!("Error: {}", e);
            if let SdkError::Timeout { tx_id, .. } = e.root() {
                eprintln!("Outcome unknown; look up transaction {} before resending", tx_id);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> zilliqa_sdk::Result<()> {
    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)?,
        None => match cli.network {
            Network::Testnet => Config::testnet(),
            Network::Mainnet => Config::mainnet(),
            Network::Local => Config::local(),
        },
    };
    if let Some(endpoint) = cli.endpoint {
        config.endpoint_url = endpoint;
    }
    if let Some(contract) = cli.contract {
        config.contract_address = Some(contract);
    }
    if let Some(gas_price) = cli.gas_price {
        config.gas_price = gas_price;
    }
    if let Some(unit) = cli.gas_price_unit {
        config.gas_price_unit = unit;
    }
    if let Some(gas_limit) = cli.gas_limit {
        config.gas_limit = gas_limit;
    }
    if let Some(key_env) = cli.key_env {
        config.private_key_env = key_env;
    }
    let contract = match config.contract_address {
        Some(address) => address,
        None => DEFAULT_CONTRACT.parse()?,
    };

    let mut keys = KeyStore::new();
    let sender =
        keys.add_key_from_source(&EnvSecretSource::new(config.private_key_env.clone()))?;
    tracing::info!(sender = %sender.address, endpoint = %config.endpoint_url, "Using account");

    let contracts = Contracts::new(&config, Arc::new(keys))?;
    if cli.verify_chain {
        contracts.client().verify_chain_id(config.chain_id).await?;
    }

    let options = config.tx_options()?;
    let recipient = cli.recipient.unwrap_or(sender.address);

    let receipt = contracts
        .at(contract)
        .mint(recipient, cli.amount, &options)
        .await?;

    println!("{}", serde_json::to_string_pretty(&receipt)?);
    if !receipt.success {
        tracing::warn!(tx_id = %receipt.transaction_id, "Transaction was included but failed");
    }
    Ok(())
}
