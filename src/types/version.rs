//! Transaction version field: chain id in the high 16 bits, message version in the low 16.

use crate::error::{Result, SdkError};

/// Chain id of the Zilliqa mainnet
pub const MAINNET_CHAIN_ID: u16 = 1;

/// Chain id of the Zilliqa developer testnet
pub const TESTNET_CHAIN_ID: u16 = 333;

/// Current transaction message version
pub const MSG_VERSION: u16 = 1;

/// Pack chain id and message version into the version field
pub const fn encode(chain_id: u16, msg_version: u16) -> u32 {
    ((chain_id as u32) << 16) | msg_version as u32
}

/// Split a version field back into `(chain_id, msg_version)`
pub const fn decode(version: u32) -> (u16, u16) {
    ((version >> 16) as u16, (version & 0xffff) as u16)
}

/// Pack values that arrive wider than 16 bits, e.g. from configuration.
pub fn pack(chain_id: u32, msg_version: u32) -> Result<u32> {
    let chain_id = u16::try_from(chain_id).map_err(|_| {
        SdkError::Validation(format!("Chain id {} does not fit in 16 bits", chain_id))
    })?;
    let msg_version = u16::try_from(msg_version).map_err(|_| {
        SdkError::Validation(format!(
            "Message version {} does not fit in 16 bits",
            msg_version
        ))
    })?;
    Ok(encode(chain_id, msg_version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testnet_version() {
        assert_eq!(encode(TESTNET_CHAIN_ID, MSG_VERSION), 21_823_489);
        assert_eq!(decode(21_823_489), (333, 1));
    }

    #[test]
    fn test_round_trip_edges() {
        for &(c, v) in &[(0, 0), (1, 1), (333, 1), (u16::MAX, 0), (0, u16::MAX), (u16::MAX, u16::MAX)] {
            assert_eq!(decode(encode(c, v)), (c, v));
        }
    }

    #[test]
    fn test_round_trip_sweep() {
        for c in (0..=u16::MAX).step_by(257) {
            for v in (0..=u16::MAX).step_by(4099) {
                assert_eq!(decode(encode(c, v)), (c, v));
            }
        }
    }

    #[test]
    fn test_pack_overflow() {
        assert_eq!(pack(333, 1).unwrap(), encode(333, 1));
        assert!(matches!(pack(1 << 16, 1), Err(SdkError::Validation(_))));
        assert!(matches!(pack(1, 70_000), Err(SdkError::Validation(_))));
    }
}
