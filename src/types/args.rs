//! Typed transition parameters.
//!
//! A call's parameters arrive as `{vname, type, value}` triples. Each one is
//! parsed into a [`ScillaValue`] matching its declared [`ScillaType`] so that
//! width and sign mistakes are caught before anything is signed.

use crate::error::{Result, SdkError};
use crate::types::address::Address;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{One, Signed};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

/// Declared parameter type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScillaType {
    ByStr20,
    /// Arbitrary-length byte string
    ByStr,
    /// Fixed-length byte string, `ByStrN`
    ByStrN(usize),
    Uint(u16),
    Int(u16),
    String,
    BNum,
    Bool,
}

const INT_WIDTHS: [u16; 4] = [32, 64, 128, 256];

impl FromStr for ScillaType {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || SdkError::Validation(format!("Unsupported parameter type '{}'", s));
        match s {
            "ByStr20" => return Ok(ScillaType::ByStr20),
            "ByStr" => return Ok(ScillaType::ByStr),
            "String" => return Ok(ScillaType::String),
            "BNum" => return Ok(ScillaType::BNum),
            "Bool" => return Ok(ScillaType::Bool),
            _ => {}
        }
        if let Some(width) = s.strip_prefix("Uint") {
            let width: u16 = width.parse().map_err(|_| unknown())?;
            return INT_WIDTHS
                .contains(&width)
                .then_some(ScillaType::Uint(width))
                .ok_or_else(unknown);
        }
        if let Some(width) = s.strip_prefix("Int") {
            let width: u16 = width.parse().map_err(|_| unknown())?;
            return INT_WIDTHS
                .contains(&width)
                .then_some(ScillaType::Int(width))
                .ok_or_else(unknown);
        }
        if let Some(len) = s.strip_prefix("ByStr") {
            let len: usize = len.parse().map_err(|_| unknown())?;
            if len == 0 {
                return Err(unknown());
            }
            return Ok(ScillaType::ByStrN(len));
        }
        Err(unknown())
    }
}

impl fmt::Display for ScillaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScillaType::ByStr20 => f.write_str("ByStr20"),
            ScillaType::ByStr => f.write_str("ByStr"),
            ScillaType::ByStrN(n) => write!(f, "ByStr{}", n),
            ScillaType::Uint(w) => write!(f, "Uint{}", w),
            ScillaType::Int(w) => write!(f, "Int{}", w),
            ScillaType::String => f.write_str("String"),
            ScillaType::BNum => f.write_str("BNum"),
            ScillaType::Bool => f.write_str("Bool"),
        }
    }
}

/// A parameter value that has been checked against its declared type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScillaValue {
    Address(Address),
    Bytes(Vec<u8>),
    Uint(BigUint),
    Int(BigInt),
    Str(String),
    BNum(u64),
    Bool(bool),
}

impl ScillaValue {
    /// JSON form of the value inside the call data
    fn to_json(&self) -> Value {
        match self {
            // Addresses are sent lowercase; the checksum is a display concern.
            ScillaValue::Address(a) => Value::String(format!("0x{}", a.to_hex())),
            ScillaValue::Bytes(b) => Value::String(format!("0x{}", hex::encode(b))),
            ScillaValue::Uint(v) => Value::String(v.to_string()),
            ScillaValue::Int(v) => Value::String(v.to_string()),
            ScillaValue::Str(s) => Value::String(s.clone()),
            ScillaValue::BNum(n) => Value::String(n.to_string()),
            ScillaValue::Bool(b) => json!({
                "constructor": if *b { "True" } else { "False" },
                "argtypes": [],
                "arguments": [],
            }),
        }
    }
}

/// One named, typed transition parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractArg {
    vname: String,
    ty: ScillaType,
    value: ScillaValue,
}

impl ContractArg {
    /// Parse a `{vname, type, value}` triple, validating the value against the type
    pub fn parse(vname: &str, type_tag: &str, raw: &str) -> Result<Self> {
        if vname.is_empty() {
            return Err(SdkError::Validation("Parameter name must not be empty".to_string()));
        }
        let ty: ScillaType = type_tag.parse()?;
        let value = parse_value(vname, ty, raw)?;
        Ok(Self {
            vname: vname.to_string(),
            ty,
            value,
        })
    }

    pub fn address(vname: &str, address: Address) -> Self {
        Self {
            vname: vname.to_string(),
            ty: ScillaType::ByStr20,
            value: ScillaValue::Address(address),
        }
    }

    pub fn uint128(vname: &str, value: u128) -> Self {
        Self {
            vname: vname.to_string(),
            ty: ScillaType::Uint(128),
            value: ScillaValue::Uint(BigUint::from(value)),
        }
    }

    pub fn string(vname: &str, value: impl Into<String>) -> Self {
        Self {
            vname: vname.to_string(),
            ty: ScillaType::String,
            value: ScillaValue::Str(value.into()),
        }
    }

    pub fn vname(&self) -> &str {
        &self.vname
    }

    pub fn ty(&self) -> ScillaType {
        self.ty
    }

    pub fn value(&self) -> &ScillaValue {
        &self.value
    }
}

impl Serialize for ContractArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ContractArg", 3)?;
        state.serialize_field("vname", &self.vname)?;
        state.serialize_field("type", &self.ty.to_string())?;
        state.serialize_field("value", &self.value.to_json())?;
        state.end()
    }
}

fn parse_value(vname: &str, ty: ScillaType, raw: &str) -> Result<ScillaValue> {
    let invalid = |reason: &str| {
        SdkError::Validation(format!(
            "Parameter '{}' of type {}: {} (got '{}')",
            vname, ty, reason, raw
        ))
    };
    let raw = raw.trim();

    match ty {
        ScillaType::ByStr20 => Address::from_hex(raw)
            .map(ScillaValue::Address)
            .map_err(|_| invalid("expected 20 bytes of hex")),
        ScillaType::ByStr => {
            let hex_part = raw.strip_prefix("0x").ok_or_else(|| invalid("expected 0x-prefixed hex"))?;
            hex::decode(hex_part)
                .map(ScillaValue::Bytes)
                .map_err(|_| invalid("expected hex bytes"))
        }
        ScillaType::ByStrN(len) => {
            let hex_part = raw.strip_prefix("0x").ok_or_else(|| invalid("expected 0x-prefixed hex"))?;
            let bytes = hex::decode(hex_part).map_err(|_| invalid("expected hex bytes"))?;
            if bytes.len() != len {
                return Err(invalid(&format!("expected exactly {} bytes", len)));
            }
            Ok(ScillaValue::Bytes(bytes))
        }
        ScillaType::Uint(width) => {
            if raw.starts_with('-') {
                return Err(invalid("unsigned type cannot hold a negative value"));
            }
            if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("expected a decimal integer"));
            }
            let value = BigUint::parse_bytes(raw.as_bytes(), 10)
                .ok_or_else(|| invalid("expected a decimal integer"))?;
            if value.bits() > u64::from(width) {
                return Err(invalid(&format!("value does not fit in {} bits", width)));
            }
            Ok(ScillaValue::Uint(value))
        }
        ScillaType::Int(width) => {
            let digits = raw.strip_prefix('-').unwrap_or(raw);
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(invalid("expected a decimal integer"));
            }
            let value = BigInt::parse_bytes(raw.as_bytes(), 10)
                .ok_or_else(|| invalid("expected a decimal integer"))?;
            let bound = BigInt::one() << (usize::from(width) - 1);
            let fits = if value.sign() == Sign::Minus {
                value.abs() <= bound
            } else {
                value < bound
            };
            if !fits {
                return Err(invalid(&format!("value does not fit in {} bits", width)));
            }
            Ok(ScillaValue::Int(value))
        }
        ScillaType::String => Ok(ScillaValue::Str(raw.to_string())),
        ScillaType::BNum => raw
            .parse::<u64>()
            .map(ScillaValue::BNum)
            .map_err(|_| invalid("expected a block number")),
        ScillaType::Bool => match raw {
            "true" | "True" => Ok(ScillaValue::Bool(true)),
            "false" | "False" => Ok(ScillaValue::Bool(false)),
            _ => Err(invalid("expected true or false")),
        },
    }
}

/// JSON call data for a transition: `{"_tag": method, "params": [...]}`
pub fn encode_call_data(method: &str, args: &[ContractArg]) -> Result<String> {
    #[derive(Serialize)]
    struct CallData<'a> {
        #[serde(rename = "_tag")]
        tag: &'a str,
        params: &'a [ContractArg],
    }

    serde_json::to_string(&CallData { tag: method, params: args }).map_err(SdkError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!("Uint128".parse::<ScillaType>().unwrap(), ScillaType::Uint(128));
        assert_eq!("Int32".parse::<ScillaType>().unwrap(), ScillaType::Int(32));
        assert_eq!("ByStr20".parse::<ScillaType>().unwrap(), ScillaType::ByStr20);
        assert_eq!("ByStr32".parse::<ScillaType>().unwrap(), ScillaType::ByStrN(32));
        assert!("Uint7".parse::<ScillaType>().is_err());
        assert!("Map".parse::<ScillaType>().is_err());
        assert_eq!(ScillaType::Uint(256).to_string(), "Uint256");
    }

    #[test]
    fn test_negative_unsigned_rejected() {
        let err = ContractArg::parse("amount", "Uint128", "-1").unwrap_err();
        assert!(matches!(err, SdkError::Validation(_)));
        assert!(err.to_string().contains("negative"));
    }

    #[test]
    fn test_uint_width_enforced() {
        assert!(ContractArg::parse("n", "Uint32", "4294967295").is_ok());
        assert!(ContractArg::parse("n", "Uint32", "4294967296").is_err());
        let max128 = u128::MAX.to_string();
        assert!(ContractArg::parse("n", "Uint128", &max128).is_ok());
        assert!(ContractArg::parse("n", "Uint128", "340282366920938463463374607431768211456").is_err());
    }

    #[test]
    fn test_int_range() {
        assert!(ContractArg::parse("n", "Int32", "-2147483648").is_ok());
        assert!(ContractArg::parse("n", "Int32", "2147483647").is_ok());
        assert!(ContractArg::parse("n", "Int32", "2147483648").is_err());
        assert!(ContractArg::parse("n", "Int32", "-2147483649").is_err());
        assert!(ContractArg::parse("n", "Int32", "1.5").is_err());
    }

    #[test]
    fn test_bystr_lengths() {
        assert!(ContractArg::parse("a", "ByStr20", "0x509ae6e5d91cee3c6571dcd04aa08288a29d563a").is_ok());
        assert!(ContractArg::parse("a", "ByStr20", "0x1234").is_err());
        assert!(ContractArg::parse("h", "ByStr4", "0xdeadbeef").is_ok());
        assert!(ContractArg::parse("h", "ByStr4", "0xdead").is_err());
        assert!(ContractArg::parse("h", "ByStr", "deadbeef").is_err());
    }

    #[test]
    fn test_bystr20_accepts_unprefixed_and_mixed_case() {
        let expected = Address::from_hex("509ae6e5d91cee3c6571dcd04aa08288a29d563a").unwrap();
        for raw in [
            "509ae6e5d91cee3c6571dcd04aa08288a29d563a",
            "0x509AE6E5D91CEE3C6571DCD04AA08288A29D563A",
            "  509ae6e5d91cee3c6571dcd04aa08288a29d563a  ",
        ] {
            let arg = ContractArg::parse("recipient", "ByStr20", raw).unwrap();
            assert_eq!(arg.value(), &ScillaValue::Address(expected));
        }
        let json = serde_json::to_value(ContractArg::parse("r", "ByStr20", "509AE6E5D91CEE3C6571DCD04AA08288A29D563A").unwrap()).unwrap();
        assert_eq!(json["value"], "0x509ae6e5d91cee3c6571dcd04aa08288a29d563a");
        assert!(ContractArg::parse("r", "ByStr20", "509ae6e5d91cee3c6571dcd04aa08288a29d563").is_err());
    }

    #[test]
    fn test_mint_call_data() {
        let recipient = Address::from_hex("509ae6e5d91cee3c6571dcd04aa08288a29d563a").unwrap();
        let args = vec![
            ContractArg::address("recipient", recipient),
            ContractArg::parse("amount", "Uint128", "100000000").unwrap(),
        ];
        let data = encode_call_data("Mint", &args).unwrap();
        assert_eq!(
            data,
            r#"{"_tag":"Mint","params":[{"vname":"recipient","type":"ByStr20","value":"0x509ae6e5d91cee3c6571dcd04aa08288a29d563a"},{"vname":"amount","type":"Uint128","value":"100000000"}]}"#
        );
    }

    #[test]
    fn test_bool_is_adt() {
        let arg = ContractArg::parse("flag", "Bool", "true").unwrap();
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["value"]["constructor"], "True");
    }
}
