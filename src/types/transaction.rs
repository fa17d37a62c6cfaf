use crate::crypto::hash::sha256;
use crate::error::{Result, SdkError};
use crate::types::address::Address;
use crate::types::amount::Amount;
use crate::types::encoding::CoreInfo;
use crate::types::primitives::{PublicKey, Signature, TxId};
use serde::Serialize;

/// Options recognized when building a call.
///
/// `version`, `gas_price` and `gas_limit` are required. The builder rejects
/// the call if any is missing. A missing `nonce` is reserved from the node.
#[derive(Debug, Clone, Default)]
pub struct TxOptions {
    pub version: Option<u32>,
    pub amount: Option<Amount>,
    pub gas_price: Option<Amount>,
    pub gas_limit: Option<u64>,
    pub nonce: Option<u64>,
    /// Ask the node to route the transaction through the DS committee
    pub priority: bool,
}

impl TxOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn amount(mut self, amount: Amount) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn gas_price(mut self, gas_price: Amount) -> Self {
        self.gas_price = Some(gas_price);
        self
    }

    pub fn gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = Some(gas_limit);
        self
    }

    pub fn nonce(mut self, nonce: u64) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }
}

/// Unsigned transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub version: u32,
    pub nonce: u64,
    pub to_addr: Address,
    pub amount: Amount,
    pub gas_price: Amount,
    pub gas_limit: u64,
    /// Contract source for deployments; empty for calls
    pub code: String,
    /// JSON call data
    pub data: String,
    pub sender_pub_key: PublicKey,
    pub priority: bool,
}

impl TransactionRequest {
    /// Canonical bytes that are signed and hashed
    pub fn encode(&self) -> Result<Vec<u8>> {
        let info = CoreInfo {
            version: self.version,
            nonce: self.nonce,
            to_addr: self.to_addr.as_bytes(),
            sender_pub_key: self.sender_pub_key.as_bytes(),
            amount: self.amount.to_u128()?,
            gas_price: self.gas_price.to_u128()?,
            gas_limit: self.gas_limit,
            code: self.code.as_bytes(),
            data: self.data.as_bytes(),
        };
        Ok(info.encode())
    }

    /// Most the sender can be charged for gas: `gas_price * gas_limit`
    pub fn max_fee(&self) -> Amount {
        self.gas_price.times(self.gas_limit)
    }
}

/// Transaction with its signature attached; immutable
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    request: TransactionRequest,
    signature: Signature,
    payload_hash: [u8; 32],
}

impl SignedTransaction {
    pub(crate) fn new(request: TransactionRequest, signature: Signature, encoded: &[u8]) -> Self {
        Self {
            request,
            signature,
            payload_hash: sha256(encoded),
        }
    }

    pub fn request(&self) -> &TransactionRequest {
        &self.request
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// SHA256 of the canonical encoding. Resubmitting the same transaction
    /// yields the same hash.
    pub fn payload_hash(&self) -> &[u8; 32] {
        &self.payload_hash
    }

    /// Transaction id the node is expected to assign
    pub fn expected_id(&self) -> TxId {
        TxId::from_hash(&self.payload_hash)
    }

    /// Parameters of the `CreateTransaction` request
    pub fn to_params(&self) -> CreateTransactionParams {
        let r = &self.request;
        CreateTransactionParams {
            version: r.version,
            nonce: r.nonce,
            to_addr: r.to_addr.to_checksum()[2..].to_string(),
            amount: r.amount.to_string(),
            pub_key: r.sender_pub_key.to_hex(),
            gas_price: r.gas_price.to_string(),
            gas_limit: r.gas_limit.to_string(),
            code: r.code.clone(),
            data: r.data.clone(),
            signature: self.signature.to_hex(),
            priority: r.priority,
        }
    }
}

/// Wire form of a signed transaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionParams {
    pub version: u32,
    pub nonce: u64,
    pub to_addr: String,
    pub amount: String,
    pub pub_key: String,
    pub gas_price: String,
    pub gas_limit: String,
    pub code: String,
    pub data: String,
    pub signature: String,
    pub priority: bool,
}

/// Check the fields every transaction needs regardless of how it was built
pub(crate) fn validate_request(request: &TransactionRequest) -> Result<()> {
    if request.gas_limit == 0 {
        return Err(SdkError::Validation("Gas limit must be greater than zero".to_string()));
    }
    request.amount.to_u128()?;
    request.gas_price.to_u128()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::types::version;

    fn sample_request() -> TransactionRequest {
        let key = KeyPair::from_secret_hex(
            "0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
        )
        .unwrap();
        TransactionRequest {
            version: version::encode(333, 1),
            nonce: 7,
            to_addr: Address::from_hex("509ae6e5d91cee3c6571dcd04aa08288a29d563a").unwrap(),
            amount: Amount::zero(),
            gas_price: Amount::from(1_000_000_000u64),
            gas_limit: 10_000,
            code: String::new(),
            data: r#"{"_tag":"Mint","params":[]}"#.to_string(),
            sender_pub_key: *key.public_key(),
            priority: false,
        }
    }

    #[test]
    fn test_params_wire_format() {
        let request = sample_request();
        let encoded = request.encode().unwrap();
        let signed = SignedTransaction::new(request, Signature::new([3u8; 64]), &encoded);
        let params = serde_json::to_value(signed.to_params()).unwrap();

        assert_eq!(params["version"], 21_823_489);
        assert_eq!(params["nonce"], 7);
        assert_eq!(params["amount"], "0");
        assert_eq!(params["gasPrice"], "1000000000");
        assert_eq!(params["gasLimit"], "10000");
        assert_eq!(params["code"], "");
        assert_eq!(params["priority"], false);
        let to_addr = params["toAddr"].as_str().unwrap();
        assert!(!to_addr.starts_with("0x"));
        assert_eq!(to_addr.to_lowercase(), "509ae6e5d91cee3c6571dcd04aa08288a29d563a");
        assert_eq!(params["pubKey"].as_str().unwrap().len(), 66);
        assert_eq!(params["signature"].as_str().unwrap().len(), 128);
    }

    #[test]
    fn test_payload_hash_stable() {
        let request = sample_request();
        let encoded = request.encode().unwrap();
        let a = SignedTransaction::new(request.clone(), Signature::new([1u8; 64]), &encoded);
        let b = SignedTransaction::new(request, Signature::new([2u8; 64]), &encoded);
        assert_eq!(a.payload_hash(), b.payload_hash());
        assert_eq!(a.expected_id().as_str().len(), 64);
    }

    #[test]
    fn test_oversized_gas_price_rejected() {
        let mut request = sample_request();
        request.gas_price = Amount::from(u128::MAX).times(3);
        assert!(matches!(request.encode(), Err(SdkError::Validation(_))));
        assert!(validate_request(&request).is_err());
    }

    #[test]
    fn test_max_fee() {
        let request = sample_request();
        assert_eq!(request.max_fee(), Amount::from(10_000_000_000_000u64));
    }

    #[test]
    fn test_zero_gas_limit_rejected() {
        let mut request = sample_request();
        request.gas_limit = 0;
        assert!(matches!(validate_request(&request), Err(SdkError::Validation(_))));
    }
}
