//! Wire helpers shared by the on-chain record types.

use chrono::{DateTime, Utc};
use ethers::types::U256;

/// Serde adapter rendering a `U256` as a plain decimal string.
///
/// `U256`'s own serde impl emits `0x`-prefixed hex, which is unreadable for ids
/// and passenger counts.
pub mod dec {
    use ethers::types::U256;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &U256, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
        let raw = String::deserialize(deserializer)?;
        U256::from_dec_str(&raw).map_err(de::Error::custom)
    }
}

/// Converts a unix timestamp in seconds to a UTC datetime.
///
/// Returns `None` when the value does not fit chrono's representable range.
pub fn timestamp_to_datetime(seconds: U256) -> Option<DateTime<Utc>> {
    if seconds > U256::from(i64::MAX as u64) {
        return None;
    }
    DateTime::from_timestamp(seconds.as_u64() as i64, 0)
}
