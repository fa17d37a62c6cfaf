use std::sync::Arc;
use zilliqa_sdk::client::{Contracts, RpcClient};
use zilliqa_sdk::crypto::{EnvSecretSource, KeyStore};
use zilliqa_sdk::types::{units, Address, TxOptions, Units};
use zilliqa_sdk::Config;

#[tokio::test]
#[ignore] // Run with: ZIL_PRIVATE_KEY=... cargo test --test live_testnet -- --ignored --nocapture
async fn test_testnet_reachable() {
    zilliqa_sdk::init();
    let config = Config::testnet();
    let client = RpcClient::new(&config).expect("Failed to create client");

    client
        .verify_chain_id(config.chain_id)
        .await
        .expect("Testnet chain id mismatch");
    let gas_price = client.get_minimum_gas_price().await.unwrap();
    println!("✅ Connected to {}, minimum gas price {} Qa", client.url(), gas_price);
}

#[tokio::test]
#[ignore]
async fn test_testnet_mint() {
    zilliqa_sdk::init();
    let config = Config::testnet();

    let mut keys = KeyStore::new();
    let account = keys
        .add_key_from_source(&EnvSecretSource::default())
        .expect("ZIL_PRIVATE_KEY must hold a funded testnet key");
    println!("🔑 Sender: {}", account.address);

    let contracts = Contracts::new(&config, Arc::new(keys)).unwrap();
    let contract: Address = "0x509ae6e5d91cee3c6571dcd04aa08288a29d563a".parse().unwrap();

    let options = TxOptions::new()
        .version(config.version())
        .gas_price(units::to_qa("2000", Units::Li).unwrap())
        .gas_limit(10_000);

    match contracts.at(contract).mint(account.address, 100_000_000, &options).await {
        Ok(receipt) => {
            println!("✅ Receipt: {}", serde_json::to_string_pretty(&receipt).unwrap());
        }
        Err(e) => panic!("Mint failed: {}", e),
    }
}
