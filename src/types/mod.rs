pub mod address;
pub mod amount;
pub mod args;
pub mod encoding;
pub mod hex_serde;
pub mod primitives;
pub mod receipt;
pub mod transaction;
pub mod version;

// Re-export commonly used types
pub use address::Address;
pub use amount::units::{self, Units};
pub use amount::Amount;
pub use args::{ContractArg, ScillaType, ScillaValue};
pub use primitives::{PublicKey, Signature, TxId};
pub use receipt::{EventLog, ExceptionEntry, Receipt, TxStatus};
pub use transaction::{CreateTransactionParams, SignedTransaction, TransactionRequest, TxOptions};
