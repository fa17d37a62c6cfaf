use crate::client::jsonrpc::{JsonRpcHttpTransport, Transport};
use crate::error::{Result, SdkError};
use crate::types::address::Address;
use crate::types::amount::Amount;
use crate::types::hex_serde::u64_from_str_or_num;
use crate::types::primitives::TxId;
use crate::types::receipt::{TransactionDto, TxStatus};
use crate::types::transaction::SignedTransaction;
use crate::Config;
use serde::Deserialize;
use serde_json::{json, Value};

/// Node error code for a transaction hash it has not stored yet
pub const RPC_TXN_NOT_PRESENT: i64 = -20;

/// Node error code for an account with no on-chain state
pub const RPC_INVALID_ADDRESS_OR_KEY: i64 = -5;

/// `CreateTransaction` response
#[derive(Debug, Deserialize)]
pub struct CreateTransactionResponse {
    #[serde(rename = "TranID", default)]
    pub tran_id: Option<String>,
    #[serde(rename = "Info", default)]
    pub info: Option<String>,
    #[serde(rename = "ContractAddress", default)]
    pub contract_address: Option<String>,
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
}

/// Account balance and last used nonce
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Balance {
    pub balance: Amount,
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub nonce: u64,
}

/// Low-level access to the node's JSON-RPC API
pub struct RpcClient<T: Transport = JsonRpcHttpTransport> {
    transport: T,
}

impl RpcClient<JsonRpcHttpTransport> {
    /// Create a client for the configured endpoint
    pub fn new(config: &Config) -> Result<Self> {
        let transport =
            JsonRpcHttpTransport::new(config.endpoint_url.clone(), config.request_timeout())?;
        Ok(Self { transport })
    }
}

impl<T: Transport> RpcClient<T> {
    /// Create a client over any transport
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Submit a signed transaction and return the id the node assigned.
    ///
    /// # Errors
    /// `Network` if the node could not be reached, `RpcRejected` with the
    /// node's own message if it refused the transaction.
    pub async fn submit(&self, signed: &SignedTransaction) -> Result<TxId> {
        let params = json!([signed.to_params()]);
        let response = self
            .transport
            .send_request("CreateTransaction", params)
            .await?;
        let response: CreateTransactionResponse = serde_json::from_value(response)?;

        match response.tran_id {
            Some(id) if response.error.is_none() => {
                let tx_id = TxId::new(&id);
                if tx_id != signed.expected_id() {
                    tracing::debug!(
                        node_id = %tx_id,
                        local_id = %signed.expected_id(),
                        "Node assigned a different transaction id than the local payload hash"
                    );
                }
                tracing::info!(
                    tx_id = %tx_id,
                    info = response.info.as_deref().unwrap_or(""),
                    "Transaction submitted"
                );
                Ok(tx_id)
            }
            _ => Err(SdkError::RpcRejected {
                code: None,
                message: response
                    .error
                    .or(response.info)
                    .unwrap_or_else(|| "CreateTransaction returned no transaction id".to_string()),
            }),
        }
    }

    /// Query a transaction. `Pending` until the node has a receipt for it.
    pub async fn get_transaction_status(&self, tx_id: &TxId) -> Result<TxStatus> {
        match self
            .transport
            .send_request("GetTransaction", json!([tx_id.as_str()]))
            .await
        {
            Ok(value) => {
                let dto: TransactionDto = serde_json::from_value(value)?;
                Ok(match dto.into_receipt() {
                    Some(receipt) => TxStatus::Confirmed(receipt),
                    None => TxStatus::Pending,
                })
            }
            Err(SdkError::RpcRejected {
                code: Some(RPC_TXN_NOT_PRESENT),
                ..
            }) => Ok(TxStatus::Pending),
            Err(e) => Err(e),
        }
    }

    /// Balance and nonce of an account. An account the node has never seen
    /// reads as zero balance and nonce 0.
    pub async fn get_balance(&self, address: &Address) -> Result<Balance> {
        match self
            .transport
            .send_request("GetBalance", json!([address.to_hex()]))
            .await
        {
            Ok(value) => Ok(serde_json::from_value(value)?),
            Err(SdkError::RpcRejected {
                code: Some(RPC_INVALID_ADDRESS_OR_KEY),
                message,
            }) if message.contains("not created") => Ok(Balance {
                balance: Amount::zero(),
                nonce: 0,
            }),
            Err(e) => Err(e),
        }
    }

    /// Last nonce used by the account
    pub async fn get_nonce(&self, address: &Address) -> Result<u64> {
        Ok(self.get_balance(address).await?.nonce)
    }

    /// Chain id reported by the node
    pub async fn get_network_id(&self) -> Result<u16> {
        let value = self
            .transport
            .send_request("GetNetworkId", json!([]))
            .await?;
        let raw = match &value {
            Value::String(s) => s.trim().parse::<u64>().ok(),
            Value::Number(n) => n.as_u64(),
            _ => None,
        };
        raw.and_then(|id| u16::try_from(id).ok()).ok_or_else(|| {
            SdkError::Serialization(format!("Unexpected network id: {}", value))
        })
    }

    /// Fail unless the node serves the expected chain
    pub async fn verify_chain_id(&self, expected: u16) -> Result<()> {
        let actual = self.get_network_id().await?;
        if actual != expected {
            return Err(SdkError::Config(format!(
                "Chain id mismatch: expected {}, node reports {}",
                expected, actual
            )));
        }
        Ok(())
    }

    /// Lowest gas price the node currently accepts, in Qa
    pub async fn get_minimum_gas_price(&self) -> Result<Amount> {
        let value = self
            .transport
            .send_request("GetMinimumGasPrice", json!([]))
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Mutable fields of a deployed contract
    pub async fn get_smart_contract_state(&self, address: &Address) -> Result<Value> {
        self.transport
            .send_request("GetSmartContractState", json!([address.to_hex()]))
            .await
    }

    /// Get the endpoint URL
    pub fn url(&self) -> &str {
        self.transport.url()
    }
}

impl<T: Transport> std::fmt::Debug for RpcClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient").field("url", &self.url()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::MockTransport;

    const ACCOUNT: &str = "509ae6e5d91cee3c6571dcd04aa08288a29d563a";

    fn client() -> RpcClient<MockTransport> {
        RpcClient::with_transport(MockTransport::new())
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = RpcClient::new(&Config::local());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().url(), "http://localhost:5555");
    }

    #[tokio::test]
    async fn test_balance_and_nonce() {
        let client = client();
        client
            .transport()
            .push_result("GetBalance", json!({"balance": "1000", "nonce": 4}));

        let address = Address::from_hex(ACCOUNT).unwrap();
        let balance = client.get_balance(&address).await.unwrap();
        assert_eq!(balance.balance, Amount::from(1000u64));
        assert_eq!(balance.nonce, 4);

        let call = &client.transport().calls_to("GetBalance")[0];
        assert_eq!(call.params, json!([ACCOUNT]));
    }

    #[tokio::test]
    async fn test_unknown_account_has_zero_nonce() {
        let client = client();
        client
            .transport()
            .push_error("GetBalance", -5, "Account is not created");
        let address = Address::from_hex(ACCOUNT).unwrap();
        assert_eq!(client.get_nonce(&address).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pending_status() {
        let client = client();
        client
            .transport()
            .push_error("GetTransaction", -20, "Txn Hash not Present");
        let status = client.get_transaction_status(&TxId::new("ab")).await.unwrap();
        assert_eq!(status, TxStatus::Pending);
    }

    #[tokio::test]
    async fn test_confirmed_status() {
        let client = client();
        client.transport().push_result(
            "GetTransaction",
            json!({"ID": "ab", "receipt": {"cumulative_gas": "500", "success": true}}),
        );
        match client.get_transaction_status(&TxId::new("ab")).await.unwrap() {
            TxStatus::Confirmed(receipt) => assert_eq!(receipt.gas_used, 500),
            TxStatus::Pending => panic!("expected a receipt"),
        }
    }

    #[tokio::test]
    async fn test_other_status_errors_surface() {
        let client = client();
        client
            .transport()
            .push_error("GetTransaction", -8, "Invalid transaction hash");
        let err = client
            .get_transaction_status(&TxId::new("zz"))
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::RpcRejected { code: Some(-8), .. }));
    }

    #[tokio::test]
    async fn test_network_id() {
        let client = client();
        client.transport().push_result("GetNetworkId", json!("333"));
        assert_eq!(client.get_network_id().await.unwrap(), 333);
        assert!(client.verify_chain_id(333).await.is_ok());
        assert!(matches!(
            client.verify_chain_id(1).await,
            Err(SdkError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_minimum_gas_price() {
        let client = client();
        client
            .transport()
            .push_result("GetMinimumGasPrice", json!("2000000000"));
        assert_eq!(
            client.get_minimum_gas_price().await.unwrap(),
            Amount::from(2_000_000_000u64)
        );
    }
}
