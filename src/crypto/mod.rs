pub mod hash;
pub mod keys;
pub mod signing;

// Re-export commonly used items
pub use hash::{sha256, sha256_all};
pub use keys::{
    Account, EnvSecretSource, KeyPair, KeyStore, LiteralSecretSource, SecretSource,
    PRIVATE_KEY_ENV_VAR,
};
pub use signing::{public_key_from_secret, SigningService};
