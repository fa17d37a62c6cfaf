use crate::crypto::hash::sha256;
use crate::error::{Result, SdkError};
use crate::types::primitives::PublicKey;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Account and contract address length in bytes
pub const ADDRESS_LEN: usize = 20;

/// 20-byte account or contract address.
///
/// Derived as the last 20 bytes of `SHA256(compressed public key)`. Displayed in
/// the checksummed hex form with a `0x` prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Derive the address owned by a public key
    pub fn from_public_key(public_key: &PublicKey) -> Self {
        let digest = sha256(public_key.as_bytes());
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
        Self(bytes)
    }

    /// Parse from hex with or without `0x`. Case is not checked; use
    /// [`Address::from_checksummed`] when the input must carry a valid checksum.
    pub fn from_hex(s: &str) -> Result<Self> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|e| SdkError::Validation(format!("Invalid address '{}': {}", s, e)))?;
        let array: [u8; ADDRESS_LEN] = bytes.as_slice().try_into().map_err(|_| {
            SdkError::Validation(format!(
                "Address must be {} bytes, got {}",
                ADDRESS_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Parse and require the mixed-case checksum to match
    pub fn from_checksummed(s: &str) -> Result<Self> {
        let address = Self::from_hex(s)?;
        if !is_valid_checksum(s) {
            return Err(SdkError::Validation(format!(
                "Address '{}' has an invalid checksum",
                s
            )));
        }
        Ok(address)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    /// Lowercase hex without prefix, as the node's account queries expect
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Checksummed hex with a `0x` prefix.
    ///
    /// Each hex letter at position `i` is upper-cased when bit `255 - 6i` of
    /// `SHA256(address bytes)` is set. Digits are left alone.
    pub fn to_checksum(&self) -> String {
        let lower = self.to_hex();
        let digest = sha256(&self.0);
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            if c.is_ascii_digit() {
                out.push(c);
            } else if bit_is_set(&digest, 255 - 6 * i) {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

/// Test a bit of a 256-bit big-endian integer, counting from the least significant bit
fn bit_is_set(digest: &[u8; 32], bit: usize) -> bool {
    let byte = digest[31 - bit / 8];
    (byte >> (bit % 8)) & 1 == 1
}

/// Whether the mixed-case form of `s` matches the address checksum
pub fn is_valid_checksum(s: &str) -> bool {
    let stripped = s.strip_prefix("0x").unwrap_or(s);
    match Address::from_hex(stripped) {
        Ok(address) => address.to_checksum()[2..] == *stripped,
        Err(_) => false,
    }
}

impl FromStr for Address {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_hex(s)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_checksum())
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_checksum())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::from_hex(&s).map_err(serde::de::Error::custom)
    }
}
