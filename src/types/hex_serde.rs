//! Serde helpers for the node's JSON encoding: hex byte strings and integers
//! that may arrive either as JSON numbers or as decimal strings.
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&hex::encode(bytes))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    hex::decode(s.strip_prefix("0x").unwrap_or(&s)).map_err(serde::de::Error::custom)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StrOrNum {
    Str(String),
    Num(u64),
}

impl StrOrNum {
    fn into_u64<E: serde::de::Error>(self) -> Result<u64, E> {
        match self {
            StrOrNum::Num(n) => Ok(n),
            StrOrNum::Str(s) => s.trim().parse().map_err(E::custom),
        }
    }
}

/// Deserialize a `u64` from `123` or `"123"`
pub fn u64_from_str_or_num<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    StrOrNum::deserialize(deserializer)?.into_u64()
}

/// Optional variant of [`u64_from_str_or_num`]
pub fn option_u64_from_str_or_num<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<StrOrNum>::deserialize(deserializer)?
        .map(StrOrNum::into_u64)
        .transpose()
}
