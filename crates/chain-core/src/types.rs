// chain-core/src/types.rs

use crate::{CoreError, CoreResult};
use num_bigint::BigUint;
use num_traits::Zero;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Timestamp in microseconds since the Unix epoch, supplied by the platform
pub type Timestamp = u64;

/// Coin amount (using BigUint for arbitrary precision)
///
/// Amounts cross the host boundary as decimal strings, so serde round-trips
/// through the decimal representation rather than the internal digits.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount(BigUint);

impl Amount {
    pub fn new(value: BigUint) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(BigUint::zero())
    }

    pub fn from_u64(value: u64) -> Self {
        Self(BigUint::from(value))
    }

    pub fn inner(&self) -> &BigUint {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn checked_add(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 + &other.0))
    }

    pub fn checked_sub(&self, other: &Amount) -> Option<Amount> {
        if self.0 < other.0 {
            None
        } else {
            Some(Amount(&self.0 - &other.0))
        }
    }

    pub fn checked_mul(&self, other: &Amount) -> Option<Amount> {
        Some(Amount(&self.0 * &other.0))
    }

    pub fn checked_div(&self, other: &Amount) -> Option<Amount> {
        if other.0.is_zero() {
            None
        } else {
            Some(Amount(&self.0 / &other.0))
        }
    }

    pub fn checked_rem(&self, other: &Amount) -> Option<Amount> {
        if other.0.is_zero() {
            None
        } else {
            Some(Amount(&self.0 % &other.0))
        }
    }

    /// Whether the amount is an exact multiple of `unit`
    pub fn is_multiple_of(&self, unit: &Amount) -> bool {
        match self.checked_rem(unit) {
            Some(rem) => rem.is_zero(),
            None => false,
        }
    }

    pub fn parse(s: &str) -> CoreResult<Self> {
        let value = BigUint::from_str(s)
            .map_err(|_| CoreError::InvalidAmount(format!("not a decimal integer: {s}")))?;
        Ok(Self(value))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Amount::parse(s)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Amount::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// Validator stake amount
pub type StakeAmount = Amount;

/// A signed stake delta expressed in unsigned big-int arithmetic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StakeChange {
    Increase(Amount),
    Decrease(Amount),
}

impl StakeChange {
    /// Apply the delta to `stake`, or None on underflow
    pub fn apply(&self, stake: &Amount) -> Option<Amount> {
        match self {
            StakeChange::Increase(delta) => stake.checked_add(delta),
            StakeChange::Decrease(delta) => stake.checked_sub(delta),
        }
    }
}

/// Elected roles managed by the governance contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Committee,
    Validator,
    Kol,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Committee => "committee",
            Role::Validator => "validator",
            Role::Kol => "kol",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "committee" => Ok(Role::Committee),
            "validator" => Ok(Role::Validator),
            "kol" => Ok(Role::Kol),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }
}

/// Proposal motions handled by the ballot workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Motion {
    Apply,
    Abolish,
    Withdraw,
    Config,
}

impl Motion {
    pub fn as_str(&self) -> &'static str {
        match self {
            Motion::Apply => "apply",
            Motion::Abolish => "abolish",
            Motion::Withdraw => "withdraw",
            Motion::Config => "config",
        }
    }
}

impl fmt::Display for Motion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Motion {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "apply" => Ok(Motion::Apply),
            "abolish" => Ok(Motion::Abolish),
            "withdraw" => Ok(Motion::Withdraw),
            "config" => Ok(Motion::Config),
            other => Err(CoreError::UnknownMotion(other.to_string())),
        }
    }
}
