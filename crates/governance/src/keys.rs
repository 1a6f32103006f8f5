// governance/src/keys.rs

//! Persisted key space
//!
//! Every record the engine owns lives under one of the fixed keys below or
//! a composite key rendered by the typed key builders. Keeping the
//! composites typed rules out the collision bugs string concatenation at
//! call sites would invite.

use crate::config::ConfigItem;
use chain_core::{Address, Motion, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const STAKE_KEY: &str = "all_stake";
pub const CONFIG_KEY: &str = "dpos_config";
pub const VALIDATOR_CANDIDATES_KEY: &str = "validator_candidates";
pub const KOL_CANDIDATES_KEY: &str = "kol_candidates";
pub const VALIDATOR_REWARD_KEY: &str = "validator_reward_distribution";
pub const KOL_REWARD_KEY: &str = "kol_reward_distribution";
pub const COMMITTEE_KEY: &str = "committee";

/// Candidate sequence key for a role
pub fn candidates_key(role: Role) -> &'static str {
    match role {
        Role::Validator => VALIDATOR_CANDIDATES_KEY,
        _ => KOL_CANDIDATES_KEY,
    }
}

/// Reward ledger key for a role
pub fn reward_key(role: Role) -> &'static str {
    match role {
        Role::Validator => VALIDATOR_REWARD_KEY,
        _ => KOL_REWARD_KEY,
    }
}

/// What a proposal is about: a role seat or a configuration item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProposalItem {
    Role(Role),
    Config(ConfigItem),
}

impl ProposalItem {
    pub fn as_role(&self) -> Option<Role> {
        match self {
            ProposalItem::Role(role) => Some(*role),
            _ => None,
        }
    }
}

impl fmt::Display for ProposalItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProposalItem::Role(role) => f.write_str(role.as_str()),
            ProposalItem::Config(item) => f.write_str(item.as_str()),
        }
    }
}

impl From<Role> for ProposalItem {
    fn from(role: Role) -> Self {
        ProposalItem::Role(role)
    }
}

impl From<ConfigItem> for ProposalItem {
    fn from(item: ConfigItem) -> Self {
        ProposalItem::Config(item)
    }
}

/// Composite key of a proposal record: `(motion, item, address)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalKey {
    pub motion: Motion,
    pub item: ProposalItem,
    pub address: Address,
}

impl ProposalKey {
    pub fn new(motion: Motion, item: impl Into<ProposalItem>, address: Address) -> Self {
        Self {
            motion,
            item: item.into(),
            address,
        }
    }

    /// Rendered storage key, e.g. `apply_validator_0x12…ef`
    pub fn storage_key(&self) -> String {
        format!("{}_{}_{}", self.motion, self.item, self.address.to_hex())
    }
}

/// Storage key of a voter's delegation record
pub fn voter_key(voter: &Address, role: Role, candidate: &Address) -> String {
    format!("voter_{}_{}_{}", voter.to_hex(), role, candidate.to_hex())
}

/// Storage key of a forfeited-pledge record
pub fn penalty_key(evil: &Address, role: Role) -> String {
    format!("penalty_{}_{}", role, evil.to_hex())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proposal_key_rendering() {
        let addr = Address::new([0x11; 20]);
        let key = ProposalKey::new(Motion::Apply, Role::Validator, addr);
        assert_eq!(
            key.storage_key(),
            format!("apply_validator_{}", addr.to_hex())
        );

        let key = ProposalKey::new(Motion::Config, ConfigItem::KolSize, addr);
        assert_eq!(key.storage_key(), format!("config_kol_size_{}", addr.to_hex()));
    }

    #[test]
    fn test_keys_do_not_collide_across_motions() {
        let addr = Address::new([0x22; 20]);
        let apply = ProposalKey::new(Motion::Apply, Role::Kol, addr).storage_key();
        let abolish = ProposalKey::new(Motion::Abolish, Role::Kol, addr).storage_key();
        let withdraw = ProposalKey::new(Motion::Withdraw, Role::Kol, addr).storage_key();
        assert_ne!(apply, abolish);
        assert_ne!(apply, withdraw);
        assert_ne!(abolish, withdraw);
    }

    #[test]
    fn test_voter_and_penalty_keys() {
        let voter = Address::new([0x01; 20]);
        let candidate = Address::new([0x02; 20]);

        let vk = voter_key(&voter, Role::Validator, &candidate);
        assert!(vk.starts_with("voter_"));
        assert!(vk.contains("validator"));

        let pk = penalty_key(&candidate, Role::Kol);
        assert!(pk.starts_with("penalty_kol_"));
    }
}
