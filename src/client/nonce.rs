use crate::client::jsonrpc::Transport;
use crate::client::node::RpcClient;
use crate::error::Result;
use crate::types::address::Address;
use std::collections::{BTreeSet, HashMap};
use tokio::sync::Mutex;

#[derive(Debug)]
struct AccountNonces {
    /// Next nonce never handed out
    next: u64,
    /// Nonces handed back below `next`, reused lowest first
    released: BTreeSet<u64>,
}

/// Hands out nonces per sender account.
///
/// The first reservation for an account reads the chain nonce; later ones are
/// served locally by increment-and-reserve, so concurrent calls from one
/// account never share a nonce. The chain is not consulted again, since it
/// does not see transactions still waiting in the mempool.
#[derive(Debug, Default)]
pub struct NonceManager {
    accounts: Mutex<HashMap<Address, AccountNonces>>,
}

impl NonceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the next nonce for `address`
    pub async fn reserve<T: Transport>(&self, client: &RpcClient<T>, address: &Address) -> Result<u64> {
        // Held across the first fetch so two callers cannot both seed from the chain
        let mut accounts = self.accounts.lock().await;
        let seed = if accounts.contains_key(address) {
            0
        } else {
            client.get_nonce(address).await? + 1
        };
        let state = accounts.entry(*address).or_insert_with(|| AccountNonces {
            next: seed,
            released: BTreeSet::new(),
        });

        let nonce = match state.released.pop_first() {
            Some(nonce) => nonce,
            None => {
                let nonce = state.next;
                state.next += 1;
                nonce
            }
        };
        tracing::debug!(address = %address, nonce, "Nonce reserved");
        Ok(nonce)
    }

    /// Hand back a reserved nonce whose transaction never reached the node.
    ///
    /// The nonce is served again before any fresh one, so no gap is left
    /// behind transactions that are still in flight.
    pub async fn release(&self, address: &Address, nonce: u64) {
        let mut accounts = self.accounts.lock().await;
        let Some(state) = accounts.get_mut(address) else {
            return;
        };
        if nonce >= state.next {
            return;
        }

        if nonce + 1 == state.next {
            state.next = nonce;
            // Collapse earlier releases that now sit directly below `next`
            while state.next > 0 && state.released.remove(&(state.next - 1)) {
                state.next -= 1;
            }
        } else {
            state.released.insert(nonce);
        }
        tracing::debug!(address = %address, nonce, next = state.next, "Nonce released");
    }
}
