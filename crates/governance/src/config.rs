// governance/src/config.rs

use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Role, Timestamp};
use chain_host::FeeSetting;
use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Tunable governance parameters, loaded once per call
///
/// Genesis writes the defaults below; afterwards every field is adjustable
/// only through an approved `config` proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Platform gas price, mirrored to the fee subsystem on change
    pub gas_price: u64,
    /// Platform base reserve, mirrored to the fee subsystem on change
    pub base_reserve: u64,
    /// Maximum committee seats
    pub committee_size: usize,
    /// Formal KOL slots (top slice of the KOL candidate sequence)
    pub kol_size: usize,
    /// KOL candidate sequence capacity
    pub kol_candidate_size: usize,
    /// Minimum pledge attached to a KOL application
    pub kol_min_pledge: Amount,
    /// Formal validator slots (top slice of the validator candidate sequence)
    pub validator_size: usize,
    /// Validator candidate sequence capacity
    pub validator_candidate_size: usize,
    /// Minimum pledge attached to a validator application
    pub validator_min_pledge: Amount,
    /// Stake credited per unit of pledge
    pub pledge_magnification: u64,
    /// Ballot pass rate, in (0, 1]
    pub pass_rate: Decimal,
    /// Proposal validity window in microseconds
    pub valid_period: Timestamp,
    /// Vote and append amounts must be multiples of this unit
    pub vote_unit: Amount,
    /// Reward split percentages: formal validators, validator candidates,
    /// formal KOLs, KOL candidates; must sum to 100
    pub reward_allocation_share: [u64; 4],
    /// Address of the business logic contract
    pub logic_contract: Address,
}

impl Config {
    /// Genesis configuration written by `init`
    pub fn genesis(logic_contract: Address) -> Self {
        Self {
            gas_price: 1000,
            base_reserve: 1_000_000,
            committee_size: 10,
            kol_size: 21,
            kol_candidate_size: 100,
            kol_min_pledge: Amount::from_u64(300_000_000_000_000),
            validator_size: 19,
            validator_candidate_size: 100,
            validator_min_pledge: Amount::from_u64(300_000_000_000_000),
            pledge_magnification: 2,
            pass_rate: Decimal::new(5, 1), // 0.5
            valid_period: 2_592_000_000_000, // 30 days
            vote_unit: Amount::from_u64(1_000_000_000),
            reward_allocation_share: [50, 8, 35, 7],
            logic_contract,
        }
    }

    /// Formal slots for a candidate role
    pub fn formal_size(&self, role: Role) -> usize {
        match role {
            Role::Validator => self.validator_size,
            _ => self.kol_size,
        }
    }

    /// Candidate sequence capacity for a role
    pub fn candidate_capacity(&self, role: Role) -> usize {
        match role {
            Role::Validator => self.validator_candidate_size,
            _ => self.kol_candidate_size,
        }
    }

    /// Minimum application pledge for a role
    pub fn min_pledge(&self, role: Role) -> &Amount {
        match role {
            Role::Validator => &self.validator_min_pledge,
            _ => &self.kol_min_pledge,
        }
    }

    pub fn magnification(&self) -> Amount {
        Amount::from_u64(self.pledge_magnification)
    }

    /// Ballot count a proposal must exceed to pass:
    /// `floor(committee_len * pass_rate)`
    pub fn pass_threshold(&self, committee_len: usize) -> GovernanceResult<usize> {
        let scaled = Decimal::from(committee_len as u64) * self.pass_rate;
        scaled
            .floor()
            .to_usize()
            .ok_or_else(|| GovernanceError::Arithmetic("pass threshold out of range".into()))
    }

    /// Apply an approved config proposal value
    pub fn apply(&mut self, item: ConfigItem, value: &ConfigValue) -> GovernanceResult<()> {
        let mismatch = || {
            GovernanceError::Validation(format!(
                "configuration value has the wrong shape for {item}"
            ))
        };

        match item {
            ConfigItem::GasPrice => self.gas_price = value.as_integer().ok_or_else(mismatch)?,
            ConfigItem::BaseReserve => {
                self.base_reserve = value.as_integer().ok_or_else(mismatch)?
            }
            ConfigItem::CommitteeSize => {
                self.committee_size = value.as_integer().ok_or_else(mismatch)? as usize
            }
            ConfigItem::KolSize => self.kol_size = value.as_integer().ok_or_else(mismatch)? as usize,
            ConfigItem::KolCandidateSize => {
                self.kol_candidate_size = value.as_integer().ok_or_else(mismatch)? as usize
            }
            ConfigItem::KolMinPledge => {
                self.kol_min_pledge = Amount::from_u64(value.as_integer().ok_or_else(mismatch)?)
            }
            ConfigItem::ValidatorSize => {
                self.validator_size = value.as_integer().ok_or_else(mismatch)? as usize
            }
            ConfigItem::ValidatorCandidateSize => {
                self.validator_candidate_size = value.as_integer().ok_or_else(mismatch)? as usize
            }
            ConfigItem::ValidatorMinPledge => {
                self.validator_min_pledge =
                    Amount::from_u64(value.as_integer().ok_or_else(mismatch)?)
            }
            ConfigItem::PledgeMagnification => {
                self.pledge_magnification = value.as_integer().ok_or_else(mismatch)?
            }
            ConfigItem::PassRate => self.pass_rate = value.as_decimal().ok_or_else(mismatch)?,
            ConfigItem::ValidPeriod => {
                self.valid_period = value.as_integer().ok_or_else(mismatch)?
            }
            ConfigItem::VoteUnit => {
                self.vote_unit = Amount::from_u64(value.as_integer().ok_or_else(mismatch)?)
            }
            ConfigItem::RewardAllocationShare => {
                self.reward_allocation_share = value.as_shares().ok_or_else(mismatch)?
            }
            ConfigItem::LogicContract => {
                self.logic_contract = value.as_address().ok_or_else(mismatch)?
            }
        }
        Ok(())
    }
}

/// The closed set of tunable configuration keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigItem {
    GasPrice,
    BaseReserve,
    CommitteeSize,
    KolSize,
    KolCandidateSize,
    KolMinPledge,
    ValidatorSize,
    ValidatorCandidateSize,
    ValidatorMinPledge,
    PledgeMagnification,
    PassRate,
    ValidPeriod,
    VoteUnit,
    RewardAllocationShare,
    LogicContract,
}

impl ConfigItem {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigItem::GasPrice => "gas_price",
            ConfigItem::BaseReserve => "base_reserve",
            ConfigItem::CommitteeSize => "committee_size",
            ConfigItem::KolSize => "kol_size",
            ConfigItem::KolCandidateSize => "kol_candidate_size",
            ConfigItem::KolMinPledge => "kol_min_pledge",
            ConfigItem::ValidatorSize => "validator_size",
            ConfigItem::ValidatorCandidateSize => "validator_candidate_size",
            ConfigItem::ValidatorMinPledge => "validator_min_pledge",
            ConfigItem::PledgeMagnification => "pledge_magnification",
            ConfigItem::PassRate => "pass_rate",
            ConfigItem::ValidPeriod => "valid_period",
            ConfigItem::VoteUnit => "vote_unit",
            ConfigItem::RewardAllocationShare => "reward_allocation_share",
            ConfigItem::LogicContract => "logic_contract",
        }
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigItem {
    type Err = GovernanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gas_price" => Ok(ConfigItem::GasPrice),
            "base_reserve" => Ok(ConfigItem::BaseReserve),
            "committee_size" => Ok(ConfigItem::CommitteeSize),
            "kol_size" => Ok(ConfigItem::KolSize),
            "kol_candidate_size" => Ok(ConfigItem::KolCandidateSize),
            "kol_min_pledge" => Ok(ConfigItem::KolMinPledge),
            "validator_size" => Ok(ConfigItem::ValidatorSize),
            "validator_candidate_size" => Ok(ConfigItem::ValidatorCandidateSize),
            "validator_min_pledge" => Ok(ConfigItem::ValidatorMinPledge),
            "pledge_magnification" => Ok(ConfigItem::PledgeMagnification),
            "pass_rate" => Ok(ConfigItem::PassRate),
            "valid_period" => Ok(ConfigItem::ValidPeriod),
            "vote_unit" => Ok(ConfigItem::VoteUnit),
            "reward_allocation_share" => Ok(ConfigItem::RewardAllocationShare),
            "logic_contract" => Ok(ConfigItem::LogicContract),
            other => Err(GovernanceError::Validation(format!(
                "unknown configuration item: {other}"
            ))),
        }
    }
}

/// A proposed configuration value
///
/// Untagged so the wire shape stays the original's plain JSON value: an
/// integer, a fractional rate, a four-way percentage split, or an address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Integer(u64),
    Decimal(Decimal),
    Shares([u64; 4]),
    Address(Address),
}

impl ConfigValue {
    pub fn as_integer(&self) -> Option<u64> {
        match self {
            ConfigValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            ConfigValue::Decimal(d) => Some(*d),
            ConfigValue::Integer(v) => Some(Decimal::from(*v)),
            _ => None,
        }
    }

    pub fn as_shares(&self) -> Option<[u64; 4]> {
        match self {
            ConfigValue::Shares(s) => Some(*s),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            ConfigValue::Address(a) => Some(*a),
            _ => None,
        }
    }
}

/// The platform fee parameter mirrored by a configuration item, if any
pub fn fee_setting(item: ConfigItem, value: &ConfigValue) -> Option<FeeSetting> {
    match item {
        ConfigItem::GasPrice => value.as_integer().map(FeeSetting::GasPrice),
        ConfigItem::BaseReserve => value.as_integer().map(FeeSetting::BaseReserve),
        _ => None,
    }
}

/// Validate a proposed value for a configuration item
pub fn validate_value(item: ConfigItem, value: &ConfigValue) -> GovernanceResult<()> {
    match item {
        ConfigItem::RewardAllocationShare => {
            let shares = value.as_shares().ok_or_else(|| {
                GovernanceError::Validation("reward allocation must be four percentages".into())
            })?;
            if shares.iter().sum::<u64>() != 100 {
                return Err(GovernanceError::BusinessRule(
                    "reward allocation shares must sum to 100".into(),
                ));
            }
            Ok(())
        }
        ConfigItem::LogicContract => {
            value.as_address().map(|_| ()).ok_or_else(|| {
                GovernanceError::Validation("logic_contract must be an address".into())
            })
        }
        ConfigItem::PassRate => {
            let rate = value.as_decimal().ok_or_else(|| {
                GovernanceError::Validation("pass_rate must be a number".into())
            })?;
            if rate <= Decimal::ZERO || rate > Decimal::ONE {
                return Err(GovernanceError::Validation(format!(
                    "invalid passing rate: {rate}"
                )));
            }
            Ok(())
        }
        _ => {
            let v = value.as_integer().ok_or_else(|| {
                GovernanceError::Validation(format!("{item} must be a positive integer"))
            })?;
            if v == 0 {
                return Err(GovernanceError::Validation(format!(
                    "illegal configuration value for {item}: 0"
                )));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genesis_defaults() {
        let cfg = Config::genesis(Address::zero());
        assert_eq!(cfg.committee_size, 10);
        assert_eq!(cfg.validator_size, 19);
        assert_eq!(cfg.kol_size, 21);
        assert_eq!(cfg.reward_allocation_share.iter().sum::<u64>(), 100);
        assert_eq!(cfg.pass_rate, Decimal::new(5, 1));
        assert_eq!(
            cfg.validator_min_pledge,
            Amount::from_u64(300_000_000_000_000)
        );
    }

    #[test]
    fn test_pass_threshold() {
        let cfg = Config::genesis(Address::zero());
        // floor(10 * 0.5) = 5
        assert_eq!(cfg.pass_threshold(10).unwrap(), 5);
        // floor(3 * 0.5) = 1
        assert_eq!(cfg.pass_threshold(3).unwrap(), 1);
        assert_eq!(cfg.pass_threshold(0).unwrap(), 0);
    }

    #[test]
    fn test_validate_shares() {
        assert!(validate_value(
            ConfigItem::RewardAllocationShare,
            &ConfigValue::Shares([50, 8, 35, 7])
        )
        .is_ok());

        let err = validate_value(
            ConfigItem::RewardAllocationShare,
            &ConfigValue::Shares([50, 8, 35, 8]),
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::BusinessRule(_)));
    }

    #[test]
    fn test_validate_pass_rate() {
        assert!(validate_value(ConfigItem::PassRate, &ConfigValue::Decimal(Decimal::new(7, 1))).is_ok());
        assert!(validate_value(ConfigItem::PassRate, &ConfigValue::Integer(1)).is_ok());
        assert!(validate_value(ConfigItem::PassRate, &ConfigValue::Decimal(Decimal::new(11, 1))).is_err());
        assert!(validate_value(ConfigItem::PassRate, &ConfigValue::Integer(0)).is_err());
    }

    #[test]
    fn test_validate_plain_integers() {
        assert!(validate_value(ConfigItem::KolSize, &ConfigValue::Integer(30)).is_ok());
        assert!(validate_value(ConfigItem::KolSize, &ConfigValue::Integer(0)).is_err());
        assert!(
            validate_value(ConfigItem::KolSize, &ConfigValue::Decimal(Decimal::new(5, 1))).is_err()
        );
    }

    #[test]
    fn test_apply_value() {
        let mut cfg = Config::genesis(Address::zero());

        cfg.apply(ConfigItem::KolSize, &ConfigValue::Integer(30)).unwrap();
        assert_eq!(cfg.kol_size, 30);

        cfg.apply(ConfigItem::PassRate, &ConfigValue::Decimal(Decimal::new(8, 1)))
            .unwrap();
        assert_eq!(cfg.pass_rate, Decimal::new(8, 1));

        cfg.apply(
            ConfigItem::RewardAllocationShare,
            &ConfigValue::Shares([40, 10, 40, 10]),
        )
        .unwrap();
        assert_eq!(cfg.reward_allocation_share, [40, 10, 40, 10]);

        let err = cfg
            .apply(ConfigItem::KolSize, &ConfigValue::Address(Address::zero()))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::Validation(_)));
    }

    #[test]
    fn test_config_item_round_trip() {
        for item in [
            ConfigItem::GasPrice,
            ConfigItem::PassRate,
            ConfigItem::RewardAllocationShare,
            ConfigItem::LogicContract,
        ] {
            assert_eq!(item.as_str().parse::<ConfigItem>().unwrap(), item);
        }
        assert!("block_time".parse::<ConfigItem>().is_err());
    }
}
