// governance/src/rewards.rs

//! Integer-exact reward distribution
//!
//! Newly accrued reward is the contract balance minus the aggregate stake.
//! It is split into four tier pools by the configured percentage shares,
//! distributed evenly inside each tier, and every truncation remainder is
//! assigned to a specific member, so the sum of all increments equals the
//! input reward to the unit. The roll-up precedence on empty tiers is part
//! of the consensus-critical behavior and must not be reordered: alternate
//! orderings change final payouts by rounding remainders.

use crate::config::Config;
use crate::context::TxContext;
use crate::registry::CandidateEntry;
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount};
use chain_host::{Event, Host};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Per-candidate reward accrual and dividend settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardShare {
    /// Reward accrued and not yet paid out
    pub accrued: Amount,
    /// Address receiving the vote-dividend share on payout
    pub pool: Address,
    /// Percentage of the payout routed to the pool, 0..=100
    pub ratio: u8,
}

impl RewardShare {
    pub fn new(pool: Address, ratio: u8) -> Self {
        Self {
            accrued: Amount::zero(),
            pool,
            ratio,
        }
    }
}

/// Reward ledger of one role side, keyed by candidate address
pub type RewardLedger = BTreeMap<Address, RewardShare>;

fn credit(ledger: &mut RewardLedger, address: &Address, amount: &Amount) -> GovernanceResult<()> {
    let share = ledger
        .get_mut(address)
        .ok_or_else(|| GovernanceError::NotFound(format!("no reward record for {address}")))?;
    share.accrued = share
        .accrued
        .checked_add(amount)
        .ok_or_else(|| GovernanceError::Arithmetic("reward accrual overflow".into()))?;
    Ok(())
}

/// Split a tier pool evenly across its members
///
/// Every member is credited the integer quotient; the remainder goes
/// entirely to the tier's top-ranked member. Returns false (pool untouched)
/// when the tier is empty so the caller can roll the pool upward.
pub(crate) fn distribute(
    members: &[CandidateEntry],
    pool: &Amount,
    ledger: &mut RewardLedger,
) -> GovernanceResult<bool> {
    if members.is_empty() {
        return Ok(false);
    }

    let count = Amount::from_u64(members.len() as u64);
    let quotient = pool
        .checked_div(&count)
        .ok_or_else(|| GovernanceError::Arithmetic("division by zero member count".into()))?;
    for member in members {
        credit(ledger, &member.address, &quotient)?;
    }

    let left = pool
        .checked_rem(&count)
        .ok_or_else(|| GovernanceError::Arithmetic("division by zero member count".into()))?;
    credit(ledger, &members[0].address, &left)?;
    Ok(true)
}

/// Run one settlement of `reward` into the ledgers
///
/// The four pools are `floor(reward / 100) * share`, not
/// `reward * share / 100`; the truncation point matters and is kept as is.
/// Empty tiers fold into the next pool before that pool distributes:
/// KOL candidates, then formal KOLs, then validator candidates, each
/// falling back toward the formal validator pool, which must be non-empty.
pub(crate) fn calculate(
    cfg: &Config,
    val_cands: &[CandidateEntry],
    kol_cands: &[CandidateEntry],
    reward: &Amount,
    val_ledger: &mut RewardLedger,
    kol_ledger: &mut RewardLedger,
) -> GovernanceResult<()> {
    let hundred = Amount::from_u64(100);
    let centi = reward
        .checked_div(&hundred)
        .ok_or_else(|| GovernanceError::Arithmetic("division by zero".into()))?;
    let pool = |share: u64| -> GovernanceResult<Amount> {
        centi
            .checked_mul(&Amount::from_u64(share))
            .ok_or_else(|| GovernanceError::Arithmetic("reward pool overflow".into()))
    };

    let mut r_vf = pool(cfg.reward_allocation_share[0])?;
    let r_vc = pool(cfg.reward_allocation_share[1])?;
    let mut r_kf = pool(cfg.reward_allocation_share[2])?;
    let r_kc = pool(cfg.reward_allocation_share[3])?;

    let (kols, kol_rest) = kol_cands.split_at(cfg.kol_size.min(kol_cands.len()));
    let (validators, val_rest) = val_cands.split_at(cfg.validator_size.min(val_cands.len()));

    let fold = |acc: &Amount, extra: &Amount| -> GovernanceResult<Amount> {
        acc.checked_add(extra)
            .ok_or_else(|| GovernanceError::Arithmetic("reward pool overflow".into()))
    };

    if !distribute(kol_rest, &r_kc, kol_ledger)? {
        r_kf = fold(&r_kf, &r_kc)?;
    }
    if !distribute(kols, &r_kf, kol_ledger)? {
        r_vf = fold(&r_vf, &r_kf)?;
    }
    if !distribute(val_rest, &r_vc, val_ledger)? {
        r_vf = fold(&r_vf, &r_vc)?;
    }
    if !distribute(validators, &r_vf, val_ledger)? {
        return Err(GovernanceError::StateConflict(
            "no formal validators to receive rewards".into(),
        ));
    }

    let left = reward
        .checked_rem(&hundred)
        .ok_or_else(|| GovernanceError::Arithmetic("division by zero".into()))?;
    credit(val_ledger, &validators[0].address, &left)
}

impl TxContext {
    /// Settle any newly accrued reward into the ledgers
    ///
    /// Reward is the contract balance in excess of the aggregate stake;
    /// when there is none this changes nothing and emits nothing.
    pub(crate) fn settle_rewards<H: Host>(&mut self, host: &mut H) -> GovernanceResult<()> {
        let reward = self.balance.checked_sub(&self.all_stake).ok_or_else(|| {
            GovernanceError::Arithmetic("contract balance below aggregate stake".into())
        })?;
        if reward.is_zero() {
            return Ok(());
        }

        calculate(
            &self.cfg,
            &self.val_cands,
            &self.kol_cands,
            &reward,
            &mut self.val_ledger,
            &mut self.kol_ledger,
        )?;

        self.reward_dirty = true;
        self.all_stake = self.balance.clone();
        self.persist_stake(host);
        host.emit(Event::RewardDistributed {
            reward: reward.clone(),
            sender: self.call.sender,
        });
        tracing::info!("settled {} newly accrued reward", reward);
        Ok(())
    }
}
