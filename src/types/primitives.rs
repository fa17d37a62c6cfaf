use crate::error::{Result, SdkError};
use crate::types::hex_serde;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Compressed secp256k1 public key length
pub const PUBLIC_KEY_LEN: usize = 33;

/// Schnorr signature length: r (32) || s (32)
pub const SIGNATURE_LEN: usize = 64;

/// 33-byte SEC1 compressed secp256k1 public key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicKey([u8; PUBLIC_KEY_LEN]);

impl PublicKey {
    /// Create from compressed bytes, checking that they encode a curve point
    pub fn new(bytes: [u8; PUBLIC_KEY_LEN]) -> Result<Self> {
        k256::PublicKey::from_sec1_bytes(&bytes)
            .map_err(|_| SdkError::Crypto("Public key is not a valid curve point".to_string()))?;
        Ok(Self(bytes))
    }

    /// Create from any SEC1 encoding (compressed or uncompressed)
    pub fn from_sec1_bytes(bytes: &[u8]) -> Result<Self> {
        let key = k256::PublicKey::from_sec1_bytes(bytes)
            .map_err(|_| SdkError::Crypto("Public key is not a valid curve point".to_string()))?;
        Ok(Self::from_k256(&key))
    }

    pub(crate) fn from_k256(key: &k256::PublicKey) -> Self {
        let encoded = key.to_encoded_point(true);
        let mut bytes = [0u8; PUBLIC_KEY_LEN];
        bytes.copy_from_slice(encoded.as_bytes());
        Self(bytes)
    }

    pub(crate) fn to_k256(self) -> Result<k256::PublicKey> {
        k256::PublicKey::from_sec1_bytes(&self.0)
            .map_err(|_| SdkError::Crypto("Public key is not a valid curve point".to_string()))
    }

    /// Parse from hex (with or without 0x prefix)
    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        Self::from_sec1_bytes(&bytes)
    }

    pub fn as_bytes(&self) -> &[u8; PUBLIC_KEY_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        hex_serde::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let bytes = hex_serde::deserialize(deserializer)?;
        PublicKey::from_sec1_bytes(&bytes).map_err(serde::de::Error::custom)
    }
}

/// 64-byte Schnorr signature format: r (32) || s (32), both big-endian
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Signature([u8; SIGNATURE_LEN]);

impl Signature {
    /// Create a new signature from bytes
    pub fn new(bytes: [u8; SIGNATURE_LEN]) -> Self {
        Self(bytes)
    }

    /// Create from r and s components
    pub fn from_parts(r: &[u8; 32], s: &[u8; 32]) -> Self {
        let mut bytes = [0u8; SIGNATURE_LEN];
        bytes[..32].copy_from_slice(r);
        bytes[32..].copy_from_slice(s);
        Self(bytes)
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s.strip_prefix("0x").unwrap_or(s))?;
        let array: [u8; SIGNATURE_LEN] = bytes.as_slice().try_into().map_err(|_| {
            SdkError::Crypto(format!(
                "Signature must be {} bytes, got {}",
                SIGNATURE_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    pub fn r(&self) -> [u8; 32] {
        let mut r = [0u8; 32];
        r.copy_from_slice(&self.0[..32]);
        r
    }

    pub fn s(&self) -> [u8; 32] {
        let mut s = [0u8; 32];
        s.copy_from_slice(&self.0[32..]);
        s
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({})", self.to_hex())
    }
}

/// Transaction identifier returned by the node (hex of the payload hash)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    /// Normalizes to lowercase hex without a 0x prefix
    pub fn new(id: impl AsRef<str>) -> Self {
        let id = id.as_ref();
        Self(id.strip_prefix("0x").unwrap_or(id).to_lowercase())
    }

    pub fn from_hash(hash: &[u8; 32]) -> Self {
        Self(hex::encode(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(PublicKey::new([7u8; PUBLIC_KEY_LEN]).is_err());
    }

    #[test]
    fn test_signature_parts() {
        let sig = Signature::from_parts(&[1u8; 32], &[2u8; 32]);
        assert_eq!(sig.r(), [1u8; 32]);
        assert_eq!(sig.s(), [2u8; 32]);
        assert_eq!(sig.to_hex().len(), 128);

        let parsed = Signature::from_hex(&format!("0x{}", sig.to_hex())).unwrap();
        assert_eq!(parsed, sig);
    }

    #[test]
    fn test_signature_wrong_length() {
        let err = Signature::from_hex("abcd").unwrap_err();
        assert!(err.to_string().contains("64 bytes"));
    }

    #[test]
    fn test_tx_id_normalized() {
        let id = TxId::new("0xABCDEF");
        assert_eq!(id.as_str(), "abcdef");
        assert_eq!(id, TxId::new("abcdef"));
    }
}
