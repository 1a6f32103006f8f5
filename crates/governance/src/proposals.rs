// governance/src/proposals.rs

//! Proposal lifecycle
//!
//! Every admission, expulsion and configuration change flows through a
//! committee-balloted proposal keyed by `(motion, item, address)`. A
//! pending proposal is approved the moment its ballot count exceeds
//! `floor(committee_len * pass_rate)`, which immediately executes the
//! motion; pending proposals that outlive their expiration can be garbage
//! collected, and withdraw records buffer an approved holder's pledge
//! until the exit period has passed.

use crate::config::{self, ConfigItem, ConfigValue};
use crate::context::TxContext;
use crate::dispatch::Outcome;
use crate::keys::{penalty_key, ProposalItem, ProposalKey};
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Motion, Role, StakeChange, Timestamp};
use chain_host::{Event, Host, TransferMemo};
use serde::{Deserialize, Serialize};

/// An application for a role, balloted by the committee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplyProposal {
    pub pledge: Amount,
    pub expiration: Timestamp,
    pub ballot: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_time: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_pool: Option<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reward_ratio: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<Address>,
}

/// A report asking the committee to expel a role holder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbolishProposal {
    pub informer: Address,
    pub reason: String,
    pub expiration: Timestamp,
    pub ballot: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_time: Option<Timestamp>,
}

/// Buffer record for an approved holder's pending exit refund
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WithdrawProposal {
    pub exiter: Address,
    pub pledge: Amount,
    pub expiration: Timestamp,
}

/// A proposed change to one configuration item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigProposal {
    pub item: ConfigItem,
    pub value: ConfigValue,
    pub expiration: Timestamp,
    pub ballot: Vec<Address>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pass_time: Option<Timestamp>,
}

/// A stored proposal record, tagged by motion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "motion", rename_all = "lowercase")]
pub enum Proposal {
    Apply(ApplyProposal),
    Abolish(AbolishProposal),
    Withdraw(WithdrawProposal),
    Config(ConfigProposal),
}

impl Proposal {
    pub fn expiration(&self) -> Timestamp {
        match self {
            Proposal::Apply(p) => p.expiration,
            Proposal::Abolish(p) => p.expiration,
            Proposal::Withdraw(p) => p.expiration,
            Proposal::Config(p) => p.expiration,
        }
    }

    pub fn pass_time(&self) -> Option<Timestamp> {
        match self {
            Proposal::Apply(p) => p.pass_time,
            Proposal::Abolish(p) => p.pass_time,
            Proposal::Withdraw(_) => None,
            Proposal::Config(p) => p.pass_time,
        }
    }

    /// Ballot of a balloted proposal; withdraw records have none
    pub fn ballot_mut(&mut self) -> Option<&mut Vec<Address>> {
        match self {
            Proposal::Apply(p) => Some(&mut p.ballot),
            Proposal::Abolish(p) => Some(&mut p.ballot),
            Proposal::Withdraw(_) => None,
            Proposal::Config(p) => Some(&mut p.ballot),
        }
    }

    /// Pledge held by the record, where the motion carries one
    pub fn pledge(&self) -> Option<&Amount> {
        match self {
            Proposal::Apply(p) => Some(&p.pledge),
            Proposal::Withdraw(p) => Some(&p.pledge),
            _ => None,
        }
    }

    pub fn into_apply(self) -> GovernanceResult<ApplyProposal> {
        match self {
            Proposal::Apply(p) => Ok(p),
            _ => Err(GovernanceError::Validation(
                "expected an apply proposal".into(),
            )),
        }
    }

    pub fn into_abolish(self) -> GovernanceResult<AbolishProposal> {
        match self {
            Proposal::Abolish(p) => Ok(p),
            _ => Err(GovernanceError::Validation(
                "expected an abolish proposal".into(),
            )),
        }
    }

    pub fn into_withdraw(self) -> GovernanceResult<WithdrawProposal> {
        match self {
            Proposal::Withdraw(p) => Ok(p),
            _ => Err(GovernanceError::Validation(
                "expected a withdraw proposal".into(),
            )),
        }
    }

    pub fn into_config(self) -> GovernanceResult<ConfigProposal> {
        match self {
            Proposal::Config(p) => Ok(p),
            _ => Err(GovernanceError::Validation(
                "expected a config proposal".into(),
            )),
        }
    }
}

pub(crate) fn load_proposal<H: Host>(
    host: &H,
    key: &ProposalKey,
) -> GovernanceResult<Option<Proposal>> {
    Ok(host.load_json(&key.storage_key())?)
}

pub(crate) fn save_proposal<H: Host>(
    host: &mut H,
    key: &ProposalKey,
    proposal: &Proposal,
) -> GovernanceResult<()> {
    host.store_json(&key.storage_key(), proposal)?;
    Ok(())
}

impl TxContext {
    fn expiry(&self) -> GovernanceResult<Timestamp> {
        self.call
            .timestamp
            .checked_add(self.cfg.valid_period)
            .ok_or_else(|| GovernanceError::Arithmetic("expiration overflow".into()))
    }

    fn check_pledge(&self, role: Role) -> GovernanceResult<()> {
        match role {
            Role::Validator | Role::Kol => {
                let minimum = self.cfg.min_pledge(role);
                if &self.call.coin_amount < minimum {
                    return Err(GovernanceError::BusinessRule(format!(
                        "the pledge {} is less than the minimum requirement {minimum} of the {role}",
                        self.call.coin_amount
                    )));
                }
            }
            Role::Committee => {
                if !self.call.coin_amount.is_zero() {
                    return Err(GovernanceError::BusinessRule(
                        "no pledge is required to apply to join the committee".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// File an application for a role
    pub fn apply_role<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        pool: Option<Address>,
        ratio: Option<u8>,
        node: Option<Address>,
    ) -> GovernanceResult<()> {
        let sender = self.call.sender;
        let key = ProposalKey::new(Motion::Apply, role, sender);
        if load_proposal(host, &key)?.is_some() {
            return Err(GovernanceError::StateConflict(format!(
                "{sender} has already applied to become a {role}"
            )));
        }
        self.check_pledge(role)?;

        let mut proposal = ApplyProposal {
            pledge: self.call.coin_amount.clone(),
            expiration: self.expiry()?,
            ballot: Vec::new(),
            pass_time: None,
            reward_pool: None,
            reward_ratio: None,
            node: None,
        };
        if role != Role::Committee {
            let ratio = ratio.unwrap_or(0);
            if ratio > 100 {
                return Err(GovernanceError::Validation(format!(
                    "invalid vote reward ratio: {ratio}"
                )));
            }
            proposal.reward_pool = Some(pool.unwrap_or(sender));
            proposal.reward_ratio = Some(ratio);
            if role == Role::Validator {
                proposal.node = Some(node.unwrap_or(sender));
            }
        }

        host.emit(Event::Applied {
            sender,
            role,
            pool: proposal.reward_pool,
            ratio: proposal.reward_ratio,
            node: proposal.node,
        });
        save_proposal(host, &key, &Proposal::Apply(proposal))
    }

    /// Add pledge to an existing application
    ///
    /// Once the application is approved, the extra pledge also flows into
    /// the live registry entry (or admits the sender if the entry fell out).
    pub fn append_pledge<H: Host>(&mut self, host: &mut H, role: Role) -> GovernanceResult<()> {
        let sender = self.call.sender;
        let key = ProposalKey::new(Motion::Apply, role, sender);
        let proposal = load_proposal(host, &key)?.ok_or_else(|| {
            GovernanceError::NotFound(format!("{sender} has not yet applied to become a {role}"))
        })?;
        let mut proposal = proposal.into_apply()?;

        if self.call.timestamp >= proposal.expiration && proposal.pass_time.is_none() {
            return Err(GovernanceError::BusinessRule("application has expired".into()));
        }
        if !self.call.coin_amount.is_multiple_of(&self.cfg.vote_unit) {
            return Err(GovernanceError::BusinessRule(format!(
                "the amount of additional pledge must be an integer multiple of {}",
                self.cfg.vote_unit
            )));
        }

        proposal.pledge = proposal
            .pledge
            .checked_add(&self.call.coin_amount)
            .ok_or_else(|| GovernanceError::Arithmetic("pledge overflow".into()))?;
        save_proposal(host, &key, &Proposal::Apply(proposal.clone()))?;
        host.emit(Event::Appended {
            sender,
            role,
            amount: self.call.coin_amount.clone(),
        });

        if proposal.pass_time.is_none() {
            // additional deposit on a pending application
            return Ok(());
        }

        if role == Role::Committee {
            return Err(GovernanceError::BusinessRule(
                "only the validator and KOL can add a deposit".into(),
            ));
        }
        if self.candidates(role).iter().any(|e| e.address == sender) {
            let stake = self
                .call
                .coin_amount
                .checked_mul(&self.cfg.magnification())
                .ok_or_else(|| GovernanceError::Arithmetic("stake overflow".into()))?;
            self.update_stake(host, role, &sender, StakeChange::Increase(stake))
        } else {
            self.admit_candidate(host, role, sender, &proposal)
        }
    }

    /// Cast a committee ballot on a pending proposal
    ///
    /// A ballot on an expired proposal is a soft outcome, not an error: the
    /// proposal is left untouched and the caller learns it has expired.
    pub fn approve<H: Host>(
        &mut self,
        host: &mut H,
        motion: Motion,
        item: ProposalItem,
        address: Address,
    ) -> GovernanceResult<Outcome> {
        if motion == Motion::Withdraw {
            return Err(GovernanceError::Validation(
                "unknown proposal operation: withdraw".into(),
            ));
        }
        let sender = self.call.sender;
        if !self.is_committee_member(&sender) {
            return Err(GovernanceError::Authorization(
                "only committee members have the right to approve".into(),
            ));
        }

        let key = ProposalKey::new(motion, item, address);
        let mut proposal = load_proposal(host, &key)?.ok_or_else(|| {
            GovernanceError::NotFound(format!("failed to get {}", key.storage_key()))
        })?;
        if proposal.pass_time().is_some() {
            return Err(GovernanceError::StateConflict(format!(
                "the {} proposal has been approved",
                key.storage_key()
            )));
        }
        if self.call.timestamp >= proposal.expiration() {
            return Ok(Outcome::ProposalExpired);
        }

        let ballot = proposal.ballot_mut().ok_or_else(|| {
            GovernanceError::Validation("withdraw records carry no ballot".into())
        })?;
        if ballot.contains(&sender) {
            return Err(GovernanceError::StateConflict(format!("{sender} has voted")));
        }
        ballot.push(sender);
        let ballots = ballot.len();

        if ballots <= self.cfg.pass_threshold(self.committee.len())? {
            save_proposal(host, &key, &proposal)?;
            return Ok(Outcome::Done);
        }

        host.emit(Event::Approved {
            motion,
            item: item.to_string(),
            address,
        });
        tracing::info!("proposal {} approved with {ballots} ballots", key.storage_key());
        match motion {
            Motion::Config => self.execute_config(host, &key, proposal)?,
            Motion::Apply => self.execute_admission(host, &key, proposal, item, address)?,
            Motion::Abolish => self.execute_expulsion(host, &key, item, address)?,
            Motion::Withdraw => {} // rejected above
        }
        Ok(Outcome::Done)
    }

    /// Rewrite the tunable named by an approved config proposal
    fn execute_config<H: Host>(
        &mut self,
        host: &mut H,
        key: &ProposalKey,
        proposal: Proposal,
    ) -> GovernanceResult<()> {
        let proposal = proposal.into_config()?;
        host.remove(&key.storage_key());

        self.cfg.apply(proposal.item, &proposal.value)?;
        self.persist_config(host)?;

        if let Some(fee) = config::fee_setting(proposal.item, &proposal.value) {
            host.configure_fee(fee)?;
        }
        host.emit(Event::ConfigUpdated {
            item: proposal.item.to_string(),
        });
        tracing::info!("configuration item {} updated", proposal.item);
        Ok(())
    }

    /// Seat or admit the subject of an approved application
    fn execute_admission<H: Host>(
        &mut self,
        host: &mut H,
        key: &ProposalKey,
        proposal: Proposal,
        item: ProposalItem,
        address: Address,
    ) -> GovernanceResult<()> {
        let mut proposal = proposal.into_apply()?;
        proposal.pass_time = Some(self.call.timestamp);
        save_proposal(host, key, &Proposal::Apply(proposal.clone()))?;

        match item {
            ProposalItem::Role(Role::Committee) => {
                if self.committee.len() < self.cfg.committee_size {
                    self.committee.push(address);
                    self.persist_committee(host)?;
                }
                Ok(())
            }
            ProposalItem::Role(role) => self.admit_candidate(host, role, address, &proposal),
            ProposalItem::Config(_) => Err(GovernanceError::Validation(
                "apply proposals must name a role".into(),
            )),
        }
    }

    /// Expel the subject of an approved abolishment and forfeit its pledge
    fn execute_expulsion<H: Host>(
        &mut self,
        host: &mut H,
        key: &ProposalKey,
        item: ProposalItem,
        address: Address,
    ) -> GovernanceResult<()> {
        host.remove(&key.storage_key());

        match item {
            ProposalItem::Role(Role::Committee) => {
                let pos = self
                    .committee
                    .iter()
                    .position(|a| a == &address)
                    .ok_or_else(|| {
                        GovernanceError::NotFound(format!(
                            "there is no {address} in the committee"
                        ))
                    })?;
                self.committee.remove(pos);
                self.persist_committee(host)
            }
            ProposalItem::Role(role) => {
                self.remove_candidate(host, role, &address)?;
                self.penalize(host, address, role)
            }
            ProposalItem::Config(_) => Err(GovernanceError::Validation(
                "abolish proposals must name a role".into(),
            )),
        }
    }

    /// Forfeit an expelled holder's pledge as a write-once penalty record
    ///
    /// The pledge stays inside the aggregate stake, so it is never counted
    /// as distributable reward and never refunded.
    fn penalize<H: Host>(&mut self, host: &mut H, evil: Address, role: Role) -> GovernanceResult<()> {
        let apply_key = ProposalKey::new(Motion::Apply, role, evil);
        let (key, proposal) = match load_proposal(host, &apply_key)? {
            Some(p) => (apply_key, p),
            None => {
                let exit_key = ProposalKey::new(Motion::Withdraw, role, evil);
                let p = load_proposal(host, &exit_key)?.ok_or_else(|| {
                    GovernanceError::NotFound(format!(
                        "failed to get {}",
                        exit_key.storage_key()
                    ))
                })?;
                (exit_key, p)
            }
        };
        let pledge = proposal
            .pledge()
            .ok_or_else(|| {
                GovernanceError::Validation("proposal record holds no pledge".into())
            })?
            .clone();

        host.remove(&key.storage_key());
        host.store(&penalty_key(&evil, role), pledge.to_string());
        host.emit(Event::Penalized { evil, role, pledge });
        Ok(())
    }

    fn report_permission(&self, role: Role) -> GovernanceResult<()> {
        let sender = self.call.sender;
        let authorized = match role {
            Role::Committee => self.committee.contains(&sender),
            Role::Validator | Role::Kol => {
                let formal_size = self.cfg.formal_size(role);
                self.candidates(role)
                    .iter()
                    .take(formal_size)
                    .any(|e| e.address == sender)
            }
        };
        if authorized {
            Ok(())
        } else {
            Err(GovernanceError::Authorization(format!(
                "only {role} members have the right to report illegal practices"
            )))
        }
    }

    /// Report an approved role holder for expulsion
    ///
    /// The first report creates the abolish proposal; repeated reports only
    /// refresh its expiration, keeping informer and reason intact.
    pub fn abolish_role<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        address: Address,
        proof: String,
    ) -> GovernanceResult<()> {
        self.report_permission(role)?;
        let sender = self.call.sender;

        let apply_key = ProposalKey::new(Motion::Apply, role, address);
        let target = load_proposal(host, &apply_key)?
            .ok_or_else(|| {
                GovernanceError::NotFound(format!("failed to get {}", apply_key.storage_key()))
            })?
            .into_apply()?;
        if target.pass_time.is_none() {
            return Err(GovernanceError::BusinessRule(format!(
                "{address} can not be abolished"
            )));
        }

        let key = ProposalKey::new(Motion::Abolish, role, address);
        let mut proposal = match load_proposal(host, &key)? {
            Some(existing) => existing.into_abolish()?,
            None => AbolishProposal {
                informer: sender,
                reason: proof.clone(),
                expiration: 0,
                // a committee reporter's own ballot counts immediately
                ballot: if role == Role::Committee {
                    vec![sender]
                } else {
                    Vec::new()
                },
                pass_time: None,
            },
        };
        proposal.expiration = self.expiry()?;
        save_proposal(host, &key, &Proposal::Abolish(proposal))?;

        host.emit(Event::AbolishProposed {
            informer: sender,
            role,
            address,
            proof,
        });
        Ok(())
    }

    /// Resign a role or collect a buffered exit refund
    pub fn withdraw_role<H: Host>(&mut self, host: &mut H, role: Role) -> GovernanceResult<()> {
        let sender = self.call.sender;

        if role == Role::Committee {
            if !self.committee.contains(&sender) {
                return Err(GovernanceError::Authorization(format!(
                    "there is no {sender} in the committee"
                )));
            }
            if self.committee.len() < 2 {
                return Err(GovernanceError::StateConflict(
                    "inadequate committee members".into(),
                ));
            }
            let apply_key = ProposalKey::new(Motion::Apply, role, sender);
            host.remove(&apply_key.storage_key());
            self.committee.retain(|a| a != &sender);
            self.persist_committee(host)?;
            host.emit(Event::Withdrawn {
                sender,
                role,
                refund: None,
            });
            return Ok(());
        }

        let exit_key = ProposalKey::new(Motion::Withdraw, role, sender);
        match load_proposal(host, &exit_key)? {
            None => {
                let apply_key = ProposalKey::new(Motion::Apply, role, sender);
                let applicant = load_proposal(host, &apply_key)?
                    .ok_or_else(|| {
                        GovernanceError::NotFound(format!(
                            "failed to get {}",
                            apply_key.storage_key()
                        ))
                    })?
                    .into_apply()?;
                host.remove(&apply_key.storage_key());

                if applicant.pass_time.is_none() {
                    // never approved: refund immediately
                    self.transfer_coin(host, &sender, &applicant.pledge, Some(TransferMemo::Refund))?;
                    host.emit(Event::Withdrawn {
                        sender,
                        role,
                        refund: Some(applicant.pledge),
                    });
                    return Ok(());
                }

                self.remove_candidate(host, role, &sender)?;
                let exit = WithdrawProposal {
                    exiter: sender,
                    pledge: applicant.pledge,
                    expiration: self.expiry()?,
                };
                save_proposal(host, &exit_key, &Proposal::Withdraw(exit))?;
                host.emit(Event::Withdrawn {
                    sender,
                    role,
                    refund: None,
                });
                Ok(())
            }
            Some(exit) => {
                let exit = exit.into_withdraw()?;
                if self.call.timestamp < exit.expiration {
                    return Err(GovernanceError::BusinessRule(
                        "buffer period is not finished".into(),
                    ));
                }
                host.remove(&exit_key.storage_key());
                self.transfer_coin(host, &sender, &exit.pledge, Some(TransferMemo::Refund))?;
                host.emit(Event::Withdrawn {
                    sender,
                    role,
                    refund: Some(exit.pledge),
                });
                Ok(())
            }
        }
    }

    /// Propose a configuration change
    ///
    /// Re-proposing the same value while the previous proposal is live is a
    /// silent no-op so committee members cannot reset their own ballots.
    pub fn configure<H: Host>(
        &mut self,
        host: &mut H,
        item: ConfigItem,
        value: ConfigValue,
    ) -> GovernanceResult<()> {
        config::validate_value(item, &value)?;
        let sender = self.call.sender;
        if !self.is_committee_member(&sender) {
            return Err(GovernanceError::Authorization(
                "only the committee has the right to propose to modify the configuration".into(),
            ));
        }

        let key = ProposalKey::new(Motion::Config, item, sender);
        if let Some(Proposal::Config(existing)) = load_proposal(host, &key)? {
            if existing.value == value {
                return Ok(());
            }
        }

        let proposal = ConfigProposal {
            item,
            value: value.clone(),
            expiration: self.expiry()?,
            // the proposer's ballot is pre-cast
            ballot: vec![sender],
            pass_time: None,
        };
        save_proposal(host, &key, &Proposal::Config(proposal))?;

        host.emit(Event::ConfigureProposed {
            sender,
            item: item.to_string(),
            value: serde_json::to_value(&value).unwrap_or(serde_json::Value::Null),
        });
        Ok(())
    }

    /// Garbage-collect an expired, never-approved proposal
    pub fn clean<H: Host>(
        &mut self,
        host: &mut H,
        motion: Motion,
        item: ProposalItem,
        address: Address,
    ) -> GovernanceResult<()> {
        if motion == Motion::Withdraw {
            return Err(GovernanceError::Validation(
                "unknown proposal operation: withdraw".into(),
            ));
        }

        let key = ProposalKey::new(motion, item, address);
        let proposal = load_proposal(host, &key)?.ok_or_else(|| {
            GovernanceError::NotFound(format!("failed to get {}", key.storage_key()))
        })?;
        if self.call.timestamp < proposal.expiration() || proposal.pass_time().is_some() {
            return Err(GovernanceError::StateConflict(
                "the proposal is still valid".into(),
            ));
        }

        host.remove(&key.storage_key());
        if let Proposal::Apply(p) = &proposal {
            if !p.pledge.is_zero() {
                self.transfer_coin(host, &address, &p.pledge, Some(TransferMemo::Refund))?;
            }
        }
        host.emit(Event::Cleaned {
            motion,
            item: item.to_string(),
            address,
        });
        Ok(())
    }

    /// Change the consensus node address tied to a validator application
    pub fn set_node_address<H: Host>(&mut self, host: &mut H, node: Address) -> GovernanceResult<()> {
        let sender = self.call.sender;
        let key = ProposalKey::new(Motion::Apply, Role::Validator, sender);
        let mut proposal = load_proposal(host, &key)?
            .ok_or_else(|| {
                GovernanceError::NotFound(format!(
                    "{sender} has not applied to become a validator"
                ))
            })?
            .into_apply()?;
        proposal.node = Some(node);
        save_proposal(host, &key, &Proposal::Apply(proposal))?;

        let Some(pos) = self
            .val_cands
            .iter()
            .position(|e| e.address == sender)
        else {
            return Ok(());
        };
        self.val_cands[pos].node = Some(node);
        self.persist_candidates(host, Role::Validator)?;
        host.emit(Event::NodeAddressSet { sender, node });

        if pos < self.cfg.validator_size {
            self.push_validators(host)?;
        }
        Ok(())
    }

    /// Change the reward pool and/or dividend ratio of a live candidate
    pub fn set_vote_dividend<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        pool: Option<Address>,
        ratio: Option<u8>,
    ) -> GovernanceResult<()> {
        if let Some(ratio) = ratio {
            if ratio > 100 {
                return Err(GovernanceError::Validation(format!(
                    "invalid vote reward ratio: {ratio}"
                )));
            }
        }

        let sender = self.call.sender;
        let key = ProposalKey::new(Motion::Apply, role, sender);
        let mut proposal = load_proposal(host, &key)?
            .ok_or_else(|| {
                GovernanceError::NotFound(format!("failed to get {}", key.storage_key()))
            })?
            .into_apply()?;

        let entry = self.ledger_mut(role).get_mut(&sender).ok_or_else(|| {
            GovernanceError::NotFound(format!("no reward record for {sender}"))
        })?;
        if let Some(pool) = pool {
            proposal.reward_pool = Some(pool);
            entry.pool = pool;
        }
        if let Some(ratio) = ratio {
            proposal.reward_ratio = Some(ratio);
            entry.ratio = ratio;
        }

        save_proposal(host, &key, &Proposal::Apply(proposal.clone()))?;
        self.persist_ledger(host, role)?;
        host.emit(Event::VoteDividendSet {
            pool: proposal.reward_pool.unwrap_or(sender),
            ratio: proposal.reward_ratio.unwrap_or(0),
        });
        Ok(())
    }
}
