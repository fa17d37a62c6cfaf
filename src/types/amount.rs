use crate::error::{Result, SdkError};
use num_bigint::BigUint;
use num_traits::{ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Non-negative token or gas quantity, in Qa (the smallest unit).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_qa(qa: impl Into<BigUint>) -> Self {
        Self(qa.into())
    }

    /// Parse a plain decimal integer of Qa. Signs and fractions are rejected.
    pub fn from_dec_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(SdkError::Validation(format!(
                "Amount '{}' is not a non-negative integer",
                s
            )));
        }
        let value = BigUint::parse_bytes(trimmed.as_bytes(), 10).ok_or_else(|| {
            SdkError::Validation(format!("Amount '{}' is not a non-negative integer", s))
        })?;
        Ok(Self(value))
    }

    pub fn as_biguint(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Narrow to the 128-bit width used on the wire
    pub fn to_u128(&self) -> Result<u128> {
        self.0.to_u128().ok_or_else(|| {
            SdkError::Validation(format!("Amount {} exceeds the 128-bit wire width", self.0))
        })
    }

    pub fn times(&self, factor: u64) -> Amount {
        Amount(&self.0 * BigUint::from(factor))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(BigUint::from(value))
    }
}

impl From<BigUint> for Amount {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl FromStr for Amount {
    type Err = SdkError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_dec_str(s)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// The node's JSON API carries quantities as decimal strings.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_str_radix(10))
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::from_dec_str(&s).map_err(serde::de::Error::custom)
    }
}

/// Denominations of the native token.
pub mod units {
    use super::Amount;
    use crate::error::{Result, SdkError};
    use num_bigint::BigUint;
    use serde::Deserialize;
    use std::fmt;
    use std::str::FromStr;

    /// Case-insensitive when parsed, so `"li"` and `"Li"` both name Li
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
    #[serde(try_from = "String")]
    pub enum Units {
        Zil,
        Li,
        Qa,
    }

    impl Units {
        /// Number of decimal places between this unit and Qa
        pub fn decimals(self) -> u32 {
            match self {
                Units::Zil => 12,
                Units::Li => 6,
                Units::Qa => 0,
            }
        }
    }

    impl FromStr for Units {
        type Err = SdkError;

        fn from_str(s: &str) -> Result<Self> {
            match s.to_ascii_lowercase().as_str() {
                "zil" => Ok(Units::Zil),
                "li" => Ok(Units::Li),
                "qa" => Ok(Units::Qa),
                other => Err(SdkError::Validation(format!("Unknown unit '{}'", other))),
            }
        }
    }

    impl TryFrom<String> for Units {
        type Error = SdkError;

        fn try_from(s: String) -> Result<Self> {
            s.parse()
        }
    }

    impl fmt::Display for Units {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                Units::Zil => "Zil",
                Units::Li => "Li",
                Units::Qa => "Qa",
            };
            f.write_str(name)
        }
    }

    /// Convert a decimal quantity in `unit` to Qa, e.g. `to_qa("1000", Units::Li)`.
    ///
    /// Fractions are allowed up to the unit's precision.
    pub fn to_qa(value: &str, unit: Units) -> Result<Amount> {
        let value = value.trim();
        let (whole, frac) = match value.split_once('.') {
            Some((w, f)) => (w, f),
            None => (value, ""),
        };
        let decimals = unit.decimals() as usize;
        let digits_ok = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && frac.is_empty()) || !digits_ok(whole) || !digits_ok(frac) {
            return Err(SdkError::Validation(format!(
                "'{}' is not a non-negative decimal quantity",
                value
            )));
        }
        if frac.len() > decimals {
            return Err(SdkError::Validation(format!(
                "'{}' has more than {} decimal places for unit {}",
                value, decimals, unit
            )));
        }

        let mut digits = String::with_capacity(whole.len() + decimals);
        digits.push_str(whole);
        digits.push_str(frac);
        digits.extend(std::iter::repeat('0').take(decimals - frac.len()));
        let digits = digits.trim_start_matches('0');
        if digits.is_empty() {
            return Ok(Amount::zero());
        }
        BigUint::parse_bytes(digits.as_bytes(), 10)
            .map(Amount::from)
            .ok_or_else(|| SdkError::Validation(format!("'{}' is not a valid quantity", value)))
    }

    /// Render a Qa amount in `unit`, trimming trailing zeros of the fraction.
    pub fn from_qa(amount: &Amount, unit: Units) -> String {
        let decimals = unit.decimals() as usize;
        let digits = amount.as_biguint().to_str_radix(10);
        if decimals == 0 {
            return digits;
        }
        let padded = format!("{:0>width$}", digits, width = decimals + 1);
        let (whole, frac) = padded.split_at(padded.len() - decimals);
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, frac)
        }
    }
}
