//! Assembles and signs contract-call transactions.

use crate::client::jsonrpc::Transport;
use crate::client::node::RpcClient;
use crate::client::nonce::NonceManager;
use crate::crypto::keys::{Account, KeyStore};
use crate::error::{Result, SdkError};
use crate::types::address::Address;
use crate::types::amount::Amount;
use crate::types::args::{encode_call_data, ContractArg};
use crate::types::transaction::{validate_request, SignedTransaction, TransactionRequest, TxOptions};

/// Builds [`TransactionRequest`]s for contract calls.
///
/// Nonces not given in the options are reserved through the shared
/// [`NonceManager`], which reads the chain the first time it sees an account.
pub struct TransactionBuilder<'a, T: Transport> {
    client: &'a RpcClient<T>,
    nonces: &'a NonceManager,
}

impl<'a, T: Transport> TransactionBuilder<'a, T> {
    pub fn new(client: &'a RpcClient<T>, nonces: &'a NonceManager) -> Self {
        Self { client, nonces }
    }

    /// Build an unsigned call of `method` on `contract`.
    ///
    /// Everything is validated before the nonce is reserved, so an invalid
    /// call never touches the network.
    pub async fn build(
        &self,
        sender: &Account,
        contract: Address,
        method: &str,
        args: &[ContractArg],
        options: &TxOptions,
    ) -> Result<TransactionRequest> {
        if method.is_empty() {
            return Err(SdkError::Validation("Method name must not be empty".to_string()));
        }
        let version = required(options.version, "version")?;
        let gas_price = required(options.gas_price.clone(), "gasPrice")?;
        let gas_limit = required(options.gas_limit, "gasLimit")?;
        let data = encode_call_data(method, args)?;

        let mut request = TransactionRequest {
            version,
            nonce: 0,
            to_addr: contract,
            amount: options.amount.clone().unwrap_or_else(Amount::zero),
            gas_price,
            gas_limit,
            code: String::new(),
            data,
            sender_pub_key: sender.public_key,
            priority: options.priority,
        };
        validate_request(&request)?;

        request.nonce = match options.nonce {
            Some(nonce) => nonce,
            None => self.nonces.reserve(self.client, &sender.address).await?,
        };

        tracing::debug!(
            sender = %sender.address,
            contract = %contract,
            method,
            nonce = request.nonce,
            max_fee = %request.max_fee(),
            "Transaction built"
        );
        Ok(request)
    }

    /// Sign `request` with the key of `sender`
    pub fn sign(
        &self,
        request: TransactionRequest,
        keys: &KeyStore,
        sender: &Account,
    ) -> Result<SignedTransaction> {
        sign_request(request, keys, sender)
    }
}

/// Sign a request over its canonical encoding.
///
/// The sender must be the account whose public key the request carries.
pub fn sign_request(
    request: TransactionRequest,
    keys: &KeyStore,
    sender: &Account,
) -> Result<SignedTransaction> {
    if request.sender_pub_key != sender.public_key {
        return Err(SdkError::Validation(format!(
            "Request was built for a different sender than {}",
            sender.address
        )));
    }
    validate_request(&request)?;

    let encoded = request.encode()?;
    let signature = keys.sign(sender, &encoded)?;
    Ok(SignedTransaction::new(request, signature, &encoded))
}

fn required<V>(value: Option<V>, name: &str) -> Result<V> {
    value.ok_or_else(|| SdkError::Validation(format!("Missing required option: {}", name)))
}
