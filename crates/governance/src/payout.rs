// governance/src/payout.rs

//! Reward payout
//!
//! Accrued reward is paid according to the candidate's dividend ratio: the
//! pool share is `floor(accrued / 100) * ratio` and the candidate keeps the
//! rest, so the two parts always sum to the original accrual exactly.

use crate::context::TxContext;
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Role};
use chain_host::{Event, Host, TransferMemo};

/// Upper bound on addresses settled by one extract call
const MAX_AWARD_BATCH: usize = 100;

impl TxContext {
    /// Pay out one candidate's accrued reward under one role ledger
    ///
    /// Does nothing when the address has no record. After payout the
    /// accrual resets to zero, and the record is dropped entirely once the
    /// address is no longer in the live candidate sequence.
    pub(crate) fn award<H: Host>(
        &mut self,
        host: &mut H,
        role: Role,
        address: Address,
    ) -> GovernanceResult<()> {
        let Some(share) = self.ledger(role).get(&address).cloned() else {
            return Ok(());
        };

        match share.ratio {
            0 => {
                self.transfer_coin(host, &address, &share.accrued, Some(TransferMemo::Reward))?;
                host.emit(Event::Awarded {
                    address,
                    self_share: share.accrued.clone(),
                    pool: share.pool,
                    pool_share: Amount::zero(),
                });
            }
            100 => {
                self.transfer_coin(host, &share.pool, &share.accrued, Some(TransferMemo::Reward))?;
                host.emit(Event::Awarded {
                    address,
                    self_share: Amount::zero(),
                    pool: share.pool,
                    pool_share: share.accrued.clone(),
                });
            }
            ratio => {
                let one_percent = share
                    .accrued
                    .checked_div(&Amount::from_u64(100))
                    .ok_or_else(|| GovernanceError::Arithmetic("division by zero".into()))?;
                let dividend = one_percent
                    .checked_mul(&Amount::from_u64(ratio as u64))
                    .ok_or_else(|| GovernanceError::Arithmetic("dividend overflow".into()))?;
                self.transfer_coin(host, &share.pool, &dividend, Some(TransferMemo::Reward))?;

                let reserve = share.accrued.checked_sub(&dividend).ok_or_else(|| {
                    GovernanceError::Arithmetic("dividend exceeds accrued reward".into())
                })?;
                self.transfer_coin(host, &address, &reserve, Some(TransferMemo::Reward))?;
                host.emit(Event::Awarded {
                    address,
                    self_share: reserve,
                    pool: share.pool,
                    pool_share: dividend,
                });
            }
        }

        let ledger = self.ledger_mut(role);
        if let Some(entry) = ledger.get_mut(&address) {
            entry.accrued = Amount::zero();
        }
        self.reward_dirty = true;

        if !self.candidates(role).iter().any(|e| e.address == address) {
            self.ledger_mut(role).remove(&address);
        }
        Ok(())
    }

    /// Settle pending reward, then pay out the caller or an explicit batch
    pub fn extract<H: Host>(
        &mut self,
        host: &mut H,
        list: Option<Vec<Address>>,
    ) -> GovernanceResult<()> {
        self.settle_rewards(host)?;

        let recipients = match list {
            None => vec![self.call.sender],
            Some(list) => {
                if list.len() > MAX_AWARD_BATCH {
                    return Err(GovernanceError::Validation(format!(
                        "the award-receiving addresses: {} exceed upper limit: {MAX_AWARD_BATCH}",
                        list.len()
                    )));
                }
                list
            }
        };

        for address in recipients {
            self.award(host, Role::Validator, address)?;
            self.award(host, Role::Kol, address)?;
        }
        Ok(())
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

    fn payout_context(accrued: u64, ratio: u8) -> (MemoryHost, TxContext) {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(10_000));

        let mut cfg = Config::genesis(address(0));
        cfg.validator_size = 1;
        let mut ctx = bare_context(cfg, address(10), 0);
        ctx.all_stake = Amount::from_u64(10_000);
        ctx.balance = Amount::from_u64(10_000);

        ctx.val_cands.push(CandidateEntry {
            address: address(10),
            stake: Amount::from_u64(500),
            node: None,
        });
        let mut share = RewardShare::new(address(90), ratio);
        share.accrued = Amount::from_u64(accrued);
        ctx.val_ledger.insert(address(10), share);
        (host, ctx)
    }

    #[test]
    fn test_award_ratio_zero_pays_self_only() {
        let (mut host, mut ctx) = payout_context(1_000, 0);

        ctx.award(&mut host, Role::Validator, address(10)).unwrap();

        assert_eq!(host.balance_of(&address(10)), Amount::from_u64(1_000));
        assert_eq!(host.balance_of(&address(90)), Amount::zero());
        assert_eq!(ctx.val_ledger[&address(10)].accrued, Amount::zero());
        assert!(ctx.reward_dirty);
    }

    #[test]
    fn test_award_ratio_hundred_pays_pool_only() {
        let (mut host, mut ctx) = payout_context(1_000, 100);

        ctx.award(&mut host, Role::Validator, address(10)).unwrap();

        assert_eq!(host.balance_of(&address(10)), Amount::zero());
        assert_eq!(host.balance_of(&address(90)), Amount::from_u64(1_000));
    }

    #[test]
    fn test_award_split_is_exact() {
        // accrued 1234, ratio 30: pool gets floor(1234/100)*30 = 360
        let (mut host, mut ctx) = payout_context(1_234, 30);

        ctx.award(&mut host, Role::Validator, address(10)).unwrap();

        let pool_share = host.balance_of(&address(90));
        let self_share = host.balance_of(&address(10));
        assert_eq!(pool_share, Amount::from_u64(360));
        assert_eq!(self_share, Amount::from_u64(874));
        assert_eq!(
            pool_share.checked_add(&self_share).unwrap(),
            Amount::from_u64(1_234)
        );
    }

    #[test]
    fn test_award_drops_record_for_departed_candidate() {
        let (mut host, mut ctx) = payout_context(1_000, 0);
        ctx.val_cands.clear();

        ctx.award(&mut host, Role::Validator, address(10)).unwrap();
        assert!(!ctx.val_ledger.contains_key(&address(10)));
    }

    #[test]
    fn test_award_keeps_record_for_live_candidate() {
        let (mut host, mut ctx) = payout_context(1_000, 0);

        ctx.award(&mut host, Role::Validator, address(10)).unwrap();
        assert!(ctx.val_ledger.contains_key(&address(10)));
    }

    #[test]
    fn test_award_without_record_is_a_no_op() {
        let (mut host, mut ctx) = payout_context(1_000, 0);

        ctx.award(&mut host, Role::Validator, address(55)).unwrap();
        assert!(host.transfers.is_empty());
        assert!(host.events.is_empty());
    }

    #[test]
    fn test_extract_settles_then_awards_caller() {
        let (mut host, mut ctx) = payout_context(0, 0);
        // 500 of unsettled reward sitting in the balance
        host.deposit(&Amount::from_u64(500));
        ctx.balance = Amount::from_u64(10_500);

        ctx.extract(&mut host, None).unwrap();

        // sole formal validator takes the whole settlement
        assert_eq!(host.balance_of(&address(10)), Amount::from_u64(500));
        assert_eq!(ctx.all_stake, Amount::from_u64(10_000));
    }

    #[test]
    fn test_extract_rejects_oversized_batch() {
        let (mut host, mut ctx) = payout_context(0, 0);

        let list: Vec<_> = (0..101).map(|_| address(7)).collect();
        let err = ctx.extract(&mut host, Some(list)).unwrap_err();
        assert!(matches!(err, GovernanceError::Validation(_)));
    }
}
