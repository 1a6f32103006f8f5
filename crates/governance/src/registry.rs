// governance/src/registry.rs

//! Ranked candidate sequences
//!
//! Both elected roles keep an ordered sequence of candidates, sorted by
//! descending stake with the byte-wise smaller address winning ties. The
//! first `validator_size`/`kol_size` entries are the formal set; everyone
//! below is a candidate. Any mutation that changes formal membership must
//! settle pending rewards first, because reward shares depend on tier
//! membership at settlement time.

use crate::context::TxContext;
use crate::proposals::ApplyProposal;
use crate::rewards::RewardShare;
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Role, StakeAmount, StakeChange};
use chain_host::{Event, Host};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One member of a candidate sequence
///
/// `node` is the consensus node address, present only on validator entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEntry {
    pub address: Address,
    pub stake: StakeAmount,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Address>,
}

/// Ranking order: stake descending, address ascending on equal stake
pub fn rank_cmp(a: &CandidateEntry, b: &CandidateEntry) -> Ordering {
    b.stake
        .cmp(&a.stake)
        .then_with(|| a.address.cmp(&b.address))
}

fn position(entries: &[CandidateEntry], address: &Address) -> Option<usize> {
    entries.iter().position(|e| e.address == *address)
}

impl TxContext {
    /// Replace the consensus validator set with the formal slice
    ///
    /// The consensus layer addresses validators by node address, so each
    /// entry's node address is substituted for its account address.
    pub(crate) fn push_validators<H: Host>(&mut self, host: &mut H) -> GovernanceResult<()> {
        let formal: Vec<_> = self
            .val_cands
            .iter()
            .take(self.cfg.validator_size)
            .map(|e| (e.node.unwrap_or(e.address), e.stake.clone()))
            .collect();

        host.replace_validators(&formal)?;
        host.emit(Event::ValidatorsUpdated {
            count: formal.len(),
        });
        tracing::info!("validator set replaced with {} members", formal.len());
        Ok(())
    }

    /// Admit an approved applicant into a candidate sequence
    ///
    /// Silently does nothing when the sequence is full and the incoming
    /// stake does not beat the lowest-ranked member; that is a valid
    /// steady-state outcome, not a caller mistake.
    pub(crate) fn admit_candidate<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        address: Address,
        proposal: &ApplyProposal,
    ) -> GovernanceResult<()> {
        let capacity = self.cfg.candidate_capacity(role);
        let stake = proposal
            .pledge
            .checked_mul(&self.cfg.magnification())
            .ok_or_else(|| GovernanceError::Arithmetic("stake overflow".into()))?;

        let entries = self.candidates(role);
        let outranked = entries.last().is_some_and(|last| stake <= last.stake);
        if entries.len() >= capacity && outranked {
            return Ok(());
        }

        self.settle_rewards(host)?;

        let node = match role {
            Role::Validator => Some(proposal.node.unwrap_or(address)),
            _ => None,
        };
        self.candidates_mut(role).push(CandidateEntry {
            address,
            stake,
            node,
        });

        let pool = proposal.reward_pool.unwrap_or(address);
        let ratio = proposal.reward_ratio.unwrap_or(0);
        let ledger = self.ledger_mut(role);
        if !ledger.contains_key(&address) {
            ledger.insert(address, RewardShare::new(pool, ratio));
            self.reward_dirty = true;
        }
        host.emit(Event::CandidateAdded { address, role });

        let entries = self.candidates_mut(role);
        entries.sort_by(rank_cmp);
        if entries.len() > capacity {
            entries.truncate(capacity);
        }
        self.persist_candidates(host, role)?;

        if role == Role::Validator {
            if let Some(pos) = position(&self.val_cands, &address) {
                if pos < self.cfg.validator_size {
                    self.push_validators(host)?;
                }
            }
        }
        Ok(())
    }

    /// Drop a candidate; a no-op when the address is not registered
    pub(crate) fn remove_candidate<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        address: &Address,
    ) -> GovernanceResult<()> {
        let Some(index) = position(self.candidates(role), address) else {
            return Ok(());
        };

        self.settle_rewards(host)?;

        self.candidates_mut(role).remove(index);
        host.emit(Event::CandidateRemoved {
            address: *address,
            role,
        });
        self.persist_candidates(host, role)?;

        if role == Role::Validator && index < self.cfg.validator_size {
            self.push_validators(host)?;
        }
        Ok(())
    }

    /// Apply a stake delta and re-rank
    ///
    /// A move across the formal/candidate boundary forces a reward
    /// settlement, and a validator-set push for validators.
    pub(crate) fn update_stake<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        address: &Address,
        change: StakeChange,
    ) -> GovernanceResult<()> {
        let formal_size = self.cfg.formal_size(role);

        let entries = self.candidates_mut(role);
        let old_pos = position(entries, address).ok_or_else(|| {
            GovernanceError::NotFound(format!("{address} is not a {role} candidate"))
        })?;

        let entry = &mut entries[old_pos];
        entry.stake = change
            .apply(&entry.stake)
            .ok_or_else(|| GovernanceError::Arithmetic("candidate stake underflow".into()))?;
        entries.sort_by(rank_cmp);

        let new_pos = position(entries, address).ok_or_else(|| {
            GovernanceError::NotFound(format!("{address} is not a {role} candidate"))
        })?;

        host.emit(Event::StakeUpdated {
            address: *address,
            role,
            change,
        });
        self.persist_candidates(host, role)?;

        let crossed = (old_pos >= formal_size) != (new_pos >= formal_size);
        if crossed {
            self.settle_rewards(host)?;
            if role == Role::Validator {
                self.push_validators(host)?;
            }
        }
        Ok(())
    }
}
