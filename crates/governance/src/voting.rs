// governance/src/voting.rs

//! Delegated voting
//!
//! A vote attaches the call's payment as delegated stake from the voter to
//! a registered candidate; unvoting refunds the full delegation. Candidate
//! stake follows through the registry so rankings stay consistent.

use crate::context::TxContext;
use crate::keys::voter_key;
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Role, StakeChange};
use chain_host::{Event, Host, TransferMemo};

fn elected_role(role: Role) -> GovernanceResult<()> {
    match role {
        Role::Validator | Role::Kol => Ok(()),
        Role::Committee => Err(GovernanceError::Validation(
            "committee seats cannot be voted for".into(),
        )),
    }
}

impl TxContext {
    /// Delegate the attached payment to a candidate
    pub fn vote<H: Host>(&mut self, host: &mut H, role: Role, candidate: Address) -> GovernanceResult<()> {
        elected_role(role)?;
        if !self.call.coin_amount.is_multiple_of(&self.cfg.vote_unit) {
            return Err(GovernanceError::BusinessRule(format!(
                "the number of votes must be an integer multiple of {}",
                self.cfg.vote_unit
            )));
        }

        let key = voter_key(&self.call.sender, role, &candidate);
        let amount = match host.load(&key) {
            Some(existing) => Amount::parse(&existing)?
                .checked_add(&self.call.coin_amount)
                .ok_or_else(|| GovernanceError::Arithmetic("vote amount overflow".into()))?,
            None => self.call.coin_amount.clone(),
        };
        host.store(&key, amount.to_string());
        host.emit(Event::Voted {
            voter: self.call.sender,
            role,
            candidate,
            amount: self.call.coin_amount.clone(),
        });

        if !self.candidates(role).iter().any(|e| e.address == candidate) {
            return Err(GovernanceError::NotFound(format!(
                "{candidate} is not a {role} candidate"
            )));
        }
        let delta = StakeChange::Increase(self.call.coin_amount.clone());
        self.update_stake(host, role, &candidate, delta)
    }

    /// Withdraw a delegation and refund it in full
    ///
    /// Still succeeds when the candidate has already left the registry; the
    /// refund happens either way and there is no stake left to adjust.
    pub fn unvote<H: Host>(&mut self, host: &mut H, role: Role, candidate: Address) -> GovernanceResult<()> {
        elected_role(role)?;

        let key = voter_key(&self.call.sender, role, &candidate);
        let raw = host.load(&key).ok_or_else(|| {
            GovernanceError::NotFound(format!(
                "the account {} has not voted for {candidate}",
                self.call.sender
            ))
        })?;
        let amount = Amount::parse(&raw)?;

        host.remove(&key);
        let sender = self.call.sender;
        self.transfer_coin(host, &sender, &amount, None)?;
        host.emit(Event::Unvoted {
            voter: sender,
            role,
            candidate,
            amount: amount.clone(),
        });

        if !self.candidates(role).iter().any(|e| e.address == candidate) {
            return Ok(());
        }
        self.update_stake(host, role, &candidate, StakeChange::Decrease(amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::context::testing::{address, bare_context};
    use crate::registry::CandidateEntry;
    use crate::rewards::RewardShare;
    use chain_host::MemoryHost;

    fn voting_context(coin: u64) -> TxContext {
        let mut cfg = Config::genesis(address(0));
        cfg.validator_size = 1;
        cfg.vote_unit = Amount::from_u64(10);
        let mut ctx = bare_context(cfg, address(1), 0);
        ctx.call.coin_amount = Amount::from_u64(coin);
        for (addr, stake) in [(10, 500u64), (11, 300)] {
            ctx.val_ledger
                .insert(address(addr), RewardShare::new(address(addr), 0));
            ctx.val_cands.push(CandidateEntry {
                address: address(addr),
                stake: Amount::from_u64(stake),
                node: None,
            });
        }
        ctx
    }

    #[test]
    fn test_vote_accumulates_and_bumps_stake() {
        let mut host = MemoryHost::new();
        let mut ctx = voting_context(100);

        ctx.vote(&mut host, Role::Validator, address(11)).unwrap();
        assert_eq!(ctx.val_cands[1].stake, Amount::from_u64(400));

        let key = voter_key(&address(1), Role::Validator, &address(11));
        assert_eq!(host.load(&key), Some("100".to_string()));

        // second vote accumulates into the same record
        ctx.vote(&mut host, Role::Validator, address(11)).unwrap();
        assert_eq!(host.load(&key), Some("200".to_string()));
        assert_eq!(ctx.val_cands[1].stake, Amount::from_u64(500));
    }

    #[test]
    fn test_vote_rejects_non_unit_amount() {
        let mut host = MemoryHost::new();
        let mut ctx = voting_context(105);

        let err = ctx.vote(&mut host, Role::Validator, address(11)).unwrap_err();
        assert!(matches!(err, GovernanceError::BusinessRule(_)));
    }

    #[test]
    fn test_vote_rejects_unknown_candidate() {
        let mut host = MemoryHost::new();
        let mut ctx = voting_context(100);

        let err = ctx.vote(&mut host, Role::Validator, address(77)).unwrap_err();
        assert!(matches!(err, GovernanceError::NotFound(_)));
    }

    #[test]
    fn test_vote_rejects_committee_role() {
        let mut host = MemoryHost::new();
        let mut ctx = voting_context(100);

        let err = ctx.vote(&mut host, Role::Committee, address(11)).unwrap_err();
        assert!(matches!(err, GovernanceError::Validation(_)));
    }

    #[test]
    fn test_unvote_requires_a_record() {
        let mut host = MemoryHost::new();
        let mut ctx = voting_context(0);

        let err = ctx
            .unvote(&mut host, Role::Validator, address(11))
            .unwrap_err();
        assert!(matches!(err, GovernanceError::NotFound(_)));
    }

    #[test]
    fn test_vote_unvote_round_trip() {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(100));
        let mut ctx = voting_context(100);
        ctx.all_stake = Amount::from_u64(100);
        ctx.balance = Amount::from_u64(100);

        ctx.vote(&mut host, Role::Validator, address(11)).unwrap();
        let stake_after_vote = ctx.val_cands[1].stake.clone();
        assert_eq!(stake_after_vote, Amount::from_u64(400));

        ctx.call.coin_amount = Amount::zero();
        ctx.unvote(&mut host, Role::Validator, address(11)).unwrap();

        // candidate stake and voter balance both restored
        assert_eq!(ctx.val_cands[1].stake, Amount::from_u64(300));
        assert_eq!(host.balance_of(&address(1)), Amount::from_u64(100));
        let key = voter_key(&address(1), Role::Validator, &address(11));
        assert_eq!(host.load(&key), None);
    }

    #[test]
    fn test_unvote_after_candidate_removal_still_refunds() {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(100));
        let mut ctx = voting_context(0);
        ctx.all_stake = Amount::from_u64(100);
        ctx.balance = Amount::from_u64(100);

        let key = voter_key(&address(1), Role::Validator, &address(77));
        host.store(&key, "100".to_string());

        ctx.unvote(&mut host, Role::Validator, address(77)).unwrap();
        assert_eq!(host.balance_of(&address(1)), Amount::from_u64(100));
        assert_eq!(ctx.all_stake, Amount::zero());
    }
}
