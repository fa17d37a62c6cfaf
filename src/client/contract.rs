use crate::builder::TransactionBuilder;
use crate::client::jsonrpc::{JsonRpcHttpTransport, Transport};
use crate::client::node::RpcClient;
use crate::client::nonce::NonceManager;
use crate::client::waiter::ReceiptWaiter;
use crate::crypto::keys::{Account, KeyStore};
use crate::error::{CallStage, Result, SdkError};
use crate::types::address::Address;
use crate::types::args::ContractArg;
use crate::types::receipt::Receipt;
use crate::types::transaction::TxOptions;
use crate::Config;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Entry point for calling deployed contracts.
///
/// Cloning is cheap; clones share the node client, key store and nonce cache,
/// so calls made from any clone never reuse a nonce.
pub struct Contracts<T: Transport = JsonRpcHttpTransport> {
    client: Arc<RpcClient<T>>,
    keys: Arc<KeyStore>,
    nonces: Arc<NonceManager>,
    poll_interval: Duration,
    max_attempts: u32,
}

impl Contracts<JsonRpcHttpTransport> {
    /// Create a facade talking HTTP to the configured node
    pub fn new(config: &Config, keys: Arc<KeyStore>) -> Result<Self> {
        let client = Arc::new(RpcClient::new(config)?);
        Ok(Self::with_client(client, keys, config))
    }
}

impl<T: Transport> Contracts<T> {
    /// Create from an existing client; polling settings come from `config`
    pub fn with_client(client: Arc<RpcClient<T>>, keys: Arc<KeyStore>, config: &Config) -> Self {
        Self {
            client,
            keys,
            nonces: Arc::new(NonceManager::new()),
            poll_interval: config.poll_interval(),
            max_attempts: config.max_attempts,
        }
    }

    /// Override how often and how long receipts are polled for
    pub fn with_polling(mut self, poll_interval: Duration, max_attempts: u32) -> Self {
        self.poll_interval = poll_interval;
        self.max_attempts = max_attempts;
        self
    }

    /// Bind a deployed contract. Calls are sent from the key store's default account.
    pub fn at(&self, address: Address) -> ContractHandle<'_, T> {
        ContractHandle {
            contracts: self,
            address,
            sender: None,
        }
    }

    pub fn client(&self) -> &RpcClient<T> {
        &self.client
    }

    pub fn keys(&self) -> &KeyStore {
        &self.keys
    }
}

impl<T: Transport> Clone for Contracts<T> {
    fn clone(&self) -> Self {
        Self {
            client: Arc::clone(&self.client),
            keys: Arc::clone(&self.keys),
            nonces: Arc::clone(&self.nonces),
            poll_interval: self.poll_interval,
            max_attempts: self.max_attempts,
        }
    }
}

/// A deployed contract bound to a sender
pub struct ContractHandle<'a, T: Transport> {
    contracts: &'a Contracts<T>,
    address: Address,
    sender: Option<Account>,
}

impl<'a, T: Transport> ContractHandle<'a, T> {
    /// Send calls from `account` instead of the default account
    pub fn from_account(mut self, account: Account) -> Self {
        self.sender = Some(account);
        self
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Build, sign, submit and confirm a call of `method`.
    ///
    /// Returns the receipt as the node reported it, including receipts with
    /// `success == false`. Errors carry the stage that produced them.
    pub async fn call(
        &self,
        method: &str,
        args: &[ContractArg],
        options: &TxOptions,
    ) -> Result<Receipt> {
        let contracts = self.contracts;
        let sender = self.sender().map_err(|e| e.at_stage(CallStage::Build))?;
        let builder = TransactionBuilder::new(&contracts.client, &contracts.nonces);

        let request = builder
            .build(&sender, self.address, method, args, options)
            .await
            .map_err(|e| e.at_stage(CallStage::Build))?;
        // Only a nonce this call reserved is handed back on failure
        let reserved = options.nonce.is_none();
        let nonce = request.nonce;

        let signed = match builder.sign(request, &contracts.keys, &sender) {
            Ok(signed) => signed,
            Err(e) => {
                self.release_nonce(reserved, &sender, nonce).await;
                return Err(e.at_stage(CallStage::Sign));
            }
        };

        let tx_id = match contracts.client.submit(&signed).await {
            Ok(tx_id) => tx_id,
            Err(e) => {
                tracing::warn!(
                    contract = %self.address,
                    method,
                    nonce,
                    error = %e,
                    "Submission failed"
                );
                self.release_nonce(reserved, &sender, nonce).await;
                return Err(e.at_stage(CallStage::Submit));
            }
        };

        ReceiptWaiter::new(&contracts.client)
            .wait_for_receipt(&tx_id, contracts.poll_interval, contracts.max_attempts)
            .await
            .map_err(|e| e.at_stage(CallStage::Confirm))
    }

    /// Call the `Mint` transition: mint `amount` tokens to `recipient`
    pub async fn mint(&self, recipient: Address, amount: u128, options: &TxOptions) -> Result<Receipt> {
        let args = [
            ContractArg::address("recipient", recipient),
            ContractArg::uint128("amount", amount),
        ];
        self.call("Mint", &args, options).await
    }

    /// Current mutable state of the contract
    pub async fn state(&self) -> Result<Value> {
        self.contracts
            .client
            .get_smart_contract_state(&self.address)
            .await
    }

    fn sender(&self) -> Result<Account> {
        match self.sender {
            Some(account) => Ok(account),
            None => self
                .contracts
                .keys
                .default_account()
                .ok_or_else(|| SdkError::InvalidKey("Key store holds no accounts".to_string())),
        }
    }

    async fn release_nonce(&self, reserved: bool, sender: &Account, nonce: u64) {
        if reserved {
            self.contracts.nonces.release(&sender.address, nonce).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockResponse, MockTransport};
    use serde_json::json;

    const SECRET: &str = "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";
    const CONTRACT: &str = "509ae6e5d91cee3c6571dcd04aa08288a29d563a";

    fn contracts(keys: KeyStore) -> Contracts<MockTransport> {
        let client = Arc::new(RpcClient::with_transport(MockTransport::new()));
        client
            .transport()
            .push_result("GetBalance", json!({"balance": "0", "nonce": 0}));
        Contracts::with_client(client, Arc::new(keys), &Config::local())
            .with_polling(Duration::from_millis(10), 3)
    }

    fn options() -> TxOptions {
        TxOptions::new()
            .version(crate::types::version::encode(333, 1))
            .gas_price(crate::types::Amount::from(1_000_000_000u64))
            .gas_limit(10_000)
    }

    #[tokio::test]
    async fn test_empty_key_store_fails_at_build() {
        let contracts = contracts(KeyStore::new());
        let err = contracts
            .at(Address::from_hex(CONTRACT).unwrap())
            .call("Mint", &[], &options())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(CallStage::Build));
        assert!(matches!(err.root(), SdkError::InvalidKey(_)));
        assert!(contracts.client().transport().calls().is_empty());
    }

    #[tokio::test]
    async fn test_network_failure_at_submit_releases_nonce() {
        let mut keys = KeyStore::new();
        keys.add_key(SECRET).unwrap();
        let contracts = contracts(keys);
        contracts.client().transport().push(
            "CreateTransaction",
            MockResponse::NetworkFailure("connection refused".to_string()),
        );

        let handle = contracts.at(Address::from_hex(CONTRACT).unwrap());
        for _ in 0..2 {
            let err = handle.call("Mint", &[], &options()).await.unwrap_err();
            assert_eq!(err.stage(), Some(CallStage::Submit));
            assert!(err.is_retryable());
        }

        // Both attempts used nonce 1 because the first one was handed back
        let nonces: Vec<u64> = contracts
            .client()
            .transport()
            .calls_to("CreateTransaction")
            .iter()
            .map(|c| c.params[0]["nonce"].as_u64().unwrap())
            .collect();
        assert_eq!(nonces, vec![1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_reported_at_confirm() {
        let mut keys = KeyStore::new();
        keys.add_key(SECRET).unwrap();
        let contracts = contracts(keys);
        let transport = contracts.client().transport();
        transport.push_result("CreateTransaction", json!({"Info": "Non-contract txn, sent to shard", "TranID": "ab"}));
        transport.push_error("GetTransaction", -20, "Txn Hash not Present");

        let err = contracts
            .at(Address::from_hex(CONTRACT).unwrap())
            .call("Mint", &[], &options())
            .await
            .unwrap_err();
        assert_eq!(err.stage(), Some(CallStage::Confirm));
        assert!(matches!(err.root(), SdkError::Timeout { attempts: 3, .. }));
        assert_eq!(transport.calls_to("GetTransaction").len(), 3);
    }

    #[tokio::test]
    async fn test_state_query() {
        let contracts = contracts(KeyStore::new());
        contracts
            .client()
            .transport()
            .push_result("GetSmartContractState", json!({"total_supply": "5"}));
        let state = contracts
            .at(Address::from_hex(CONTRACT).unwrap())
            .state()
            .await
            .unwrap();
        assert_eq!(state["total_supply"], "5");
    }
}
