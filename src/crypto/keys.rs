use crate::crypto::signing::{public_key_from_secret, SigningService};
use crate::error::{Result, SdkError};
use crate::types::address::Address;
use crate::types::primitives::{PublicKey, Signature};
use k256::SecretKey;
use std::collections::HashMap;
use std::fmt;
use zeroize::Zeroizing;

/// Environment variable read by default for the signing key
pub const PRIVATE_KEY_ENV_VAR: &str = "ZIL_PRIVATE_KEY";

/// Key pair structure containing secret and public keys
pub struct KeyPair {
    secret_key: SecretKey,
    public_key: PublicKey,
    address: Address,
}

impl KeyPair {
    /// Create from secret key bytes (32 bytes)
    pub fn from_secret_bytes(bytes: &[u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(bytes).map_err(|_| {
            SdkError::InvalidKey("Secret is not a valid secp256k1 scalar".to_string())
        })?;
        let public_key = public_key_from_secret(&secret_key);
        let address = Address::from_public_key(&public_key);

        Ok(Self {
            secret_key,
            public_key,
            address,
        })
    }

    /// Create from hex-encoded secret key, with or without `0x`
    pub fn from_secret_hex(secret_hex: &str) -> Result<Self> {
        let trimmed = secret_hex.trim();
        let stripped = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let bytes = Zeroizing::new(
            hex::decode(stripped)
                .map_err(|_| SdkError::InvalidKey("Secret is not valid hex".to_string()))?,
        );
        if bytes.len() != 32 {
            return Err(SdkError::InvalidKey(format!(
                "Secret key must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut array = Zeroizing::new([0u8; 32]);
        array.copy_from_slice(&bytes);
        Self::from_secret_bytes(&array)
    }

    /// Get the public key
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn account(&self) -> Account {
        Account {
            address: self.address,
            public_key: self.public_key,
        }
    }

    pub(crate) fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Public half of a key held by a [`KeyStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Account {
    pub address: Address,
    pub public_key: PublicKey,
}

/// Where a private key comes from. Keys are never embedded in code; callers
/// inject the source (environment, vault client, prompt).
pub trait SecretSource {
    /// Hex-encoded 32-byte secret
    fn secret_hex(&self) -> Result<Zeroizing<String>>;
}

/// Reads the secret from an environment variable
#[derive(Debug, Clone)]
pub struct EnvSecretSource {
    var: String,
}

impl EnvSecretSource {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvSecretSource {
    fn default() -> Self {
        Self::new(PRIVATE_KEY_ENV_VAR)
    }
}

impl SecretSource for EnvSecretSource {
    fn secret_hex(&self) -> Result<Zeroizing<String>> {
        std::env::var(&self.var)
            .map(Zeroizing::new)
            .map_err(|_| SdkError::Config(format!("Environment variable {} not set", self.var)))
    }
}

/// Secret supplied directly by the caller, e.g. from a prompt or a test fixture
pub struct LiteralSecretSource(Zeroizing<String>);

impl LiteralSecretSource {
    pub fn new(secret_hex: impl Into<String>) -> Self {
        Self(Zeroizing::new(secret_hex.into()))
    }
}

impl SecretSource for LiteralSecretSource {
    fn secret_hex(&self) -> Result<Zeroizing<String>> {
        Ok(self.0.clone())
    }
}

/// In-memory key store. Keys are never persisted.
///
/// Signing takes `&self`, so one store can be shared behind an `Arc` by
/// concurrent calls.
#[derive(Default)]
pub struct KeyStore {
    keys: HashMap<Address, KeyPair>,
    default_address: Option<Address>,
    signer: SigningService,
}

impl KeyStore {
    /// Create a new key store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key from its hex secret. The first key added becomes the default account.
    pub fn add_key(&mut self, secret_hex: &str) -> Result<Account> {
        let key_pair = KeyPair::from_secret_hex(secret_hex)?;
        let account = key_pair.account();
        self.keys.insert(account.address, key_pair);
        self.default_address.get_or_insert(account.address);
        tracing::debug!(address = %account.address, "Key added to store");
        Ok(account)
    }

    /// Add a key obtained from an injected source
    pub fn add_key_from_source(&mut self, source: &dyn SecretSource) -> Result<Account> {
        let secret = source.secret_hex()?;
        self.add_key(&secret)
    }

    pub fn get(&self, address: &Address) -> Option<Account> {
        self.keys.get(address).map(KeyPair::account)
    }

    pub fn contains(&self, address: &Address) -> bool {
        self.keys.contains_key(address)
    }

    pub fn default_account(&self) -> Option<Account> {
        self.default_address.and_then(|a| self.get(&a))
    }

    /// Make an already-added account the default
    pub fn set_default(&mut self, address: &Address) -> Result<()> {
        if !self.contains(address) {
            return Err(SdkError::InvalidKey(format!("No key for account {}", address)));
        }
        self.default_address = Some(*address);
        Ok(())
    }

    pub fn accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self.keys.values().map(KeyPair::account).collect();
        accounts.sort_by_key(|a| a.address);
        accounts
    }

    /// Sign `payload` with the key belonging to `account`
    pub fn sign(&self, account: &Account, payload: &[u8]) -> Result<Signature> {
        let key_pair = self
            .keys
            .get(&account.address)
            .ok_or_else(|| SdkError::InvalidKey(format!("No key for account {}", account.address)))?;
        self.signer.sign(payload, key_pair.secret_key())
    }

    /// Check a signature made by `account`
    pub fn verify(&self, account: &Account, payload: &[u8], signature: &Signature) -> Result<bool> {
        self.signer.verify(payload, signature, &account.public_key)
    }
}

impl fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyStore")
            .field("accounts", &self.keys.keys().collect::<Vec<_>>())
            .field("default", &self.default_address)
            .finish()
    }
}
