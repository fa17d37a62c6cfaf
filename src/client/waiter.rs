use crate::client::jsonrpc::Transport;
use crate::client::node::RpcClient;
use crate::error::{Result, SdkError};
use crate::types::primitives::TxId;
use crate::types::receipt::{Receipt, TxStatus};
use std::time::Duration;

/// Polls the node until a transaction has a receipt.
///
/// The first query is sent immediately and the waiter sleeps `poll_interval`
/// between queries, so `max_attempts` queries take at least
/// `(max_attempts - 1) * poll_interval`.
pub struct ReceiptWaiter<'a, T: Transport> {
    client: &'a RpcClient<T>,
}

impl<'a, T: Transport> ReceiptWaiter<'a, T> {
    pub fn new(client: &'a RpcClient<T>) -> Self {
        Self { client }
    }

    /// Wait for the receipt of `tx_id`.
    ///
    /// A receipt with `success == false` is still returned as `Ok`. A node
    /// that cannot be reached counts as a pending attempt; any other node
    /// error ends the wait.
    ///
    /// # Errors
    /// `Timeout` after `max_attempts` queries without a receipt,
    /// `Validation` if `max_attempts` is zero.
    pub async fn wait_for_receipt(
        &self,
        tx_id: &TxId,
        poll_interval: Duration,
        max_attempts: u32,
    ) -> Result<Receipt> {
        if max_attempts == 0 {
            return Err(SdkError::Validation(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        for attempt in 1..=max_attempts {
            match self.client.get_transaction_status(tx_id).await {
                Ok(TxStatus::Confirmed(receipt)) => {
                    tracing::info!(
                        tx_id = %tx_id,
                        attempt,
                        success = receipt.success,
                        gas_used = receipt.gas_used,
                        "Receipt received"
                    );
                    return Ok(receipt);
                }
                Ok(TxStatus::Pending) => {
                    tracing::debug!(tx_id = %tx_id, attempt, max_attempts, "Transaction pending");
                }
                Err(e) if e.is_retryable() => {
                    tracing::warn!(tx_id = %tx_id, attempt, error = %e, "Receipt query failed, retrying");
                }
                Err(e) => return Err(e),
            }

            if attempt < max_attempts {
                tokio::time::sleep(poll_interval).await;
            }
        }

        Err(SdkError::Timeout {
            tx_id: tx_id.to_string(),
            attempts: max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::mock::{MockResponse, MockTransport};
    use serde_json::json;

    fn confirmed() -> serde_json::Value {
        json!({"ID": "ab", "receipt": {"cumulative_gas": "500", "success": false}})
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_receipt_is_returned() {
        let client = RpcClient::with_transport(MockTransport::new());
        client.transport().push_result("GetTransaction", confirmed());

        let receipt = ReceiptWaiter::new(&client)
            .wait_for_receipt(&TxId::new("ab"), Duration::from_secs(1), 3)
            .await
            .unwrap();
        assert!(!receipt.success);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_counts_as_pending() {
        let client = RpcClient::with_transport(MockTransport::new());
        client
            .transport()
            .push(
                "GetTransaction",
                MockResponse::NetworkFailure("connection reset".to_string()),
            )
            .push_result("GetTransaction", confirmed());

        let receipt = ReceiptWaiter::new(&client)
            .wait_for_receipt(&TxId::new("ab"), Duration::from_secs(1), 3)
            .await
            .unwrap();
        assert_eq!(receipt.gas_used, 500);
        assert_eq!(client.transport().calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_ends_wait() {
        let client = RpcClient::with_transport(MockTransport::new());
        client
            .transport()
            .push_error("GetTransaction", -8, "Invalid transaction hash");

        let err = ReceiptWaiter::new(&client)
            .wait_for_receipt(&TxId::new("ab"), Duration::from_secs(1), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::RpcRejected { .. }));
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_rejected() {
        let client = RpcClient::with_transport(MockTransport::new());
        let err = ReceiptWaiter::new(&client)
            .wait_for_receipt(&TxId::new("ab"), Duration::from_secs(1), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(client.transport().calls().is_empty());
    }
}
