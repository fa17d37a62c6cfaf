pub mod contract;
pub mod jsonrpc;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod node;
pub mod nonce;
pub mod waiter;

pub use contract::{ContractHandle, Contracts};
pub use jsonrpc::{JsonRpcHttpTransport, Transport};
#[cfg(any(test, feature = "test-util"))]
pub use mock::{MockResponse, MockTransport};
pub use node::{Balance, RpcClient};
pub use nonce::NonceManager;
pub use waiter::ReceiptWaiter;
