use crate::types::hex_serde::u64_from_str_or_num;
use crate::types::hex_serde::option_u64_from_str_or_num;
use crate::types::primitives::TxId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Event emitted by a contract during the transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventLog {
    #[serde(rename = "_eventname")]
    pub event_name: String,
    pub address: String,
    #[serde(default)]
    pub params: Vec<Value>,
}

/// Scilla exception raised while executing the transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionEntry {
    #[serde(default)]
    pub line: u64,
    pub message: String,
}

/// Node-confirmed outcome of a transaction.
///
/// `success` is false when the transaction was included but reverted; the
/// reason is in `exceptions` and `errors`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub transaction_id: TxId,
    pub success: bool,
    pub gas_used: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epoch_num: Option<u64>,
    #[serde(default)]
    pub event_logs: Vec<EventLog>,
    #[serde(default)]
    pub transitions: Vec<Value>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub errors: Value,
}

/// Outcome of a single status query
#[derive(Debug, Clone, PartialEq)]
pub enum TxStatus {
    Pending,
    Confirmed(Receipt),
}

/// `receipt` object as the node returns it inside `GetTransaction`
#[derive(Debug, Deserialize)]
pub struct ReceiptDto {
    #[serde(deserialize_with = "u64_from_str_or_num")]
    pub cumulative_gas: u64,
    #[serde(default, deserialize_with = "option_u64_from_str_or_num")]
    pub epoch_num: Option<u64>,
    pub success: bool,
    #[serde(default)]
    pub event_logs: Vec<EventLog>,
    #[serde(default)]
    pub transitions: Vec<Value>,
    #[serde(default)]
    pub exceptions: Vec<ExceptionEntry>,
    #[serde(default)]
    pub errors: Value,
}

/// `GetTransaction` result; only the fields needed to build a [`Receipt`]
#[derive(Debug, Deserialize)]
pub struct TransactionDto {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub receipt: Option<ReceiptDto>,
}

impl TransactionDto {
    /// Convert to domain model; `None` while the node has no receipt yet
    pub fn into_receipt(self) -> Option<Receipt> {
        let transaction_id = TxId::new(&self.id);
        self.receipt.map(|r| Receipt {
            transaction_id,
            success: r.success,
            gas_used: r.cumulative_gas,
            epoch_num: r.epoch_num,
            event_logs: r.event_logs,
            transitions: r.transitions,
            exceptions: r.exceptions,
            errors: r.errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_receipt_from_node_json() {
        let json = r#"{
            "ID": "0xAB12",
            "amount": "0",
            "gasLimit": "10000",
            "receipt": {
                "cumulative_gas": "500",
                "epoch_num": "2101",
                "event_logs": [
                    {"_eventname": "Minted", "address": "0x509ae6e5d91cee3c6571dcd04aa08288a29d563a",
                     "params": [{"vname": "amount", "type": "Uint128", "value": "100000000"}]}
                ],
                "success": true
            }
        }"#;
        let dto: TransactionDto = serde_json::from_str(json).unwrap();
        let receipt = dto.into_receipt().unwrap();
        assert_eq!(receipt.transaction_id.as_str(), "ab12");
        assert!(receipt.success);
        assert_eq!(receipt.gas_used, 500);
        assert_eq!(receipt.epoch_num, Some(2101));
        assert_eq!(receipt.event_logs.len(), 1);
        assert_eq!(receipt.event_logs[0].event_name, "Minted");
    }

    #[test]
    fn test_numeric_gas_accepted() {
        let json = r#"{"ID": "ab", "receipt": {"cumulative_gas": 321, "success": false,
            "exceptions": [{"line": 12, "message": "Sender is not minter"}]}}"#;
        let dto: TransactionDto = serde_json::from_str(json).unwrap();
        let receipt = dto.into_receipt().unwrap();
        assert_eq!(receipt.gas_used, 321);
        assert!(!receipt.success);
        assert_eq!(receipt.exceptions[0].message, "Sender is not minter");
    }

    #[test]
    fn test_missing_receipt_is_pending() {
        let dto: TransactionDto = serde_json::from_str(r#"{"ID": "ab"}"#).unwrap();
        assert!(dto.into_receipt().is_none());
    }
}
