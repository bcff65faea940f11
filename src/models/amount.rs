use ethers::types::U256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::str::FromStr;
use thiserror::Error;

/// Decimals of the settlement token (cUSD).
pub const TOKEN_DECIMALS: usize = 18;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AmountError {
    #[error("empty amount")]
    Empty,

    #[error("malformed amount: {0}")]
    Malformed(String),

    #[error("more than 18 decimal places: {0}")]
    TooPrecise(String),

    #[error("amount overflows 256 bits: {0}")]
    Overflow(String),
}

/// An amount of the settlement token, held in base units (wei-style, 18 decimals).
///
/// Arithmetic stays in `U256`; the decimal token representation is produced only
/// by `Display` / serialization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenAmount(U256);

impl TokenAmount {
    pub const fn from_wei(wei: U256) -> Self {
        Self(wei)
    }

    pub fn zero() -> Self {
        Self(U256::zero())
    }

    /// Whole tokens, e.g. `from_tokens(5)` is 5 cUSD.
    pub fn from_tokens(tokens: u64) -> Self {
        Self(U256::from(tokens) * unit())
    }

    pub fn wei(&self) -> U256 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    pub fn checked_mul(self, factor: U256) -> Option<Self> {
        self.0.checked_mul(factor).map(Self)
    }

    /// Decimal token representation with trailing zeros trimmed ("5", "0.25").
    pub fn to_display(&self) -> String {
        let (whole, frac) = self.0.div_mod(unit());
        if frac.is_zero() {
            return whole.to_string();
        }
        let frac = format!("{:0>width$}", frac.to_string(), width = TOKEN_DECIMALS);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

fn unit() -> U256 {
    U256::exp10(TOKEN_DECIMALS)
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display())
    }
}

impl FromStr for TokenAmount {
    type Err = AmountError;

    /// Parses a decimal token amount ("5", "0.25", "1,000.5").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cleaned = s.trim().replace(',', "");
        if cleaned.is_empty() {
            return Err(AmountError::Empty);
        }

        let (whole, frac) = match cleaned.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (cleaned.as_str(), ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if !whole.chars().chain(frac.chars()).all(|c| c.is_ascii_digit()) {
            return Err(AmountError::Malformed(s.to_string()));
        }
        if frac.len() > TOKEN_DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let whole = if whole.is_empty() {
            U256::zero()
        } else {
            U256::from_dec_str(whole).map_err(|_| AmountError::Overflow(s.to_string()))?
        };
        let frac = if frac.is_empty() {
            U256::zero()
        } else {
            let padded = format!("{:0<width$}", frac, width = TOKEN_DECIMALS);
            U256::from_dec_str(&padded).map_err(|_| AmountError::Malformed(s.to_string()))?
        };

        whole
            .checked_mul(unit())
            .and_then(|w| w.checked_add(frac))
            .map(Self)
            .ok_or_else(|| AmountError::Overflow(s.to_string()))
    }
}

impl From<U256> for TokenAmount {
    fn from(wei: U256) -> Self {
        Self(wei)
    }
}

impl Sum for TokenAmount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, x| Self(acc.0.saturating_add(x.0)))
    }
}

impl<'a> Sum<&'a TokenAmount> for TokenAmount {
    fn sum<I: Iterator<Item = &'a TokenAmount>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl Serialize for TokenAmount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TokenAmount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(de::Error::custom)
    }
}
