// governance/src/context.rs

use crate::config::Config;
use crate::keys::{
    candidates_key, reward_key, COMMITTEE_KEY, CONFIG_KEY, KOL_CANDIDATES_KEY, KOL_REWARD_KEY,
    STAKE_KEY, VALIDATOR_CANDIDATES_KEY, VALIDATOR_REWARD_KEY,
};
use crate::registry::CandidateEntry;
use crate::rewards::RewardLedger;
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Role};
use chain_host::{CallContext, Host, TransferMemo};

/// Per-call transaction context
///
/// Everything a call works on is loaded fresh from the store when the call
/// enters and written back explicitly; nothing survives between calls.
/// `reward_dirty` marks the reward ledgers as modified so the dispatch
/// epilogue persists them exactly once per call.
#[derive(Debug)]
pub struct TxContext {
    pub call: CallContext,
    pub cfg: Config,
    pub all_stake: Amount,
    pub balance: Amount,
    pub committee: Vec<Address>,
    pub val_cands: Vec<CandidateEntry>,
    pub kol_cands: Vec<CandidateEntry>,
    pub val_ledger: RewardLedger,
    pub kol_ledger: RewardLedger,
    pub reward_dirty: bool,
}

impl TxContext {
    /// Load the full working state for one call
    pub fn load<H: Host>(host: &H, call: CallContext) -> GovernanceResult<Self> {
        let cfg: Config = Self::require(host.load_json(CONFIG_KEY)?, CONFIG_KEY)?;

        let raw_stake = host
            .load(STAKE_KEY)
            .ok_or_else(|| GovernanceError::NotFound(format!("failed to get {STAKE_KEY}")))?;
        let all_stake = Amount::parse(&raw_stake)?;

        let committee = Self::require(host.load_json(COMMITTEE_KEY)?, COMMITTEE_KEY)?;
        let val_cands = Self::require(host.load_json(VALIDATOR_CANDIDATES_KEY)?, VALIDATOR_CANDIDATES_KEY)?;
        let kol_cands = Self::require(host.load_json(KOL_CANDIDATES_KEY)?, KOL_CANDIDATES_KEY)?;
        let val_ledger = Self::require(host.load_json(VALIDATOR_REWARD_KEY)?, VALIDATOR_REWARD_KEY)?;
        let kol_ledger = Self::require(host.load_json(KOL_REWARD_KEY)?, KOL_REWARD_KEY)?;

        Ok(Self {
            call,
            cfg,
            all_stake,
            balance: host.balance(),
            committee,
            val_cands,
            kol_cands,
            val_ledger,
            kol_ledger,
            reward_dirty: false,
        })
    }

    fn require<T>(value: Option<T>, key: &str) -> GovernanceResult<T> {
        value.ok_or_else(|| GovernanceError::NotFound(format!("failed to get {key}")))
    }

    /// Fold the call's attached payment into the aggregate stake
    pub fn absorb_payment<H: Host>(&mut self, host: &mut H) -> GovernanceResult<()> {
        if self.call.coin_amount.is_zero() {
            return Ok(());
        }
        self.all_stake = self
            .all_stake
            .checked_add(&self.call.coin_amount)
            .ok_or_else(|| GovernanceError::Arithmetic("aggregate stake overflow".into()))?;
        self.persist_stake(host);
        Ok(())
    }

    /// Move coin out of the contract, keeping the aggregate stake in step
    ///
    /// Outbound coin is no longer at stake, so the aggregate must shrink in
    /// the same call or the next settlement would misread the balance
    /// difference as reward.
    pub fn transfer_coin<H: Host>(
        &mut self,
        host: &mut H,
        dest: &Address,
        amount: &Amount,
        memo: Option<TransferMemo>,
    ) -> GovernanceResult<()> {
        if amount.is_zero() {
            return Ok(());
        }
        self.all_stake = self
            .all_stake
            .checked_sub(amount)
            .ok_or_else(|| GovernanceError::Arithmetic("aggregate stake underflow".into()))?;
        self.persist_stake(host);
        host.transfer(dest, amount, memo)?;
        self.balance = self.balance.checked_sub(amount).unwrap_or_else(Amount::zero);
        Ok(())
    }

    pub fn candidates(&self, role: Role) -> &[CandidateEntry] {
        match role {
            Role::Validator => &self.val_cands,
            _ => &self.kol_cands,
        }
    }

    pub fn candidates_mut(&mut self, role: Role) -> &mut Vec<CandidateEntry> {
        match role {
            Role::Validator => &mut self.val_cands,
            _ => &mut self.kol_cands,
        }
    }

    pub fn ledger(&self, role: Role) -> &RewardLedger {
        match role {
            Role::Validator => &self.val_ledger,
            _ => &self.kol_ledger,
        }
    }

    pub fn ledger_mut(&mut self, role: Role) -> &mut RewardLedger {
        match role {
            Role::Validator => &mut self.val_ledger,
            _ => &mut self.kol_ledger,
        }
    }

    pub fn is_committee_member(&self, address: &Address) -> bool {
        self.committee.contains(address)
    }

    pub fn persist_stake<H: Host>(&self, host: &mut H) {
        host.store(STAKE_KEY, self.all_stake.to_string());
    }

    pub fn persist_config<H: Host>(&self, host: &mut H) -> GovernanceResult<()> {
        host.store_json(CONFIG_KEY, &self.cfg)?;
        Ok(())
    }

    pub fn persist_committee<H: Host>(&self, host: &mut H) -> GovernanceResult<()> {
        host.store_json(COMMITTEE_KEY, &self.committee)?;
        Ok(())
    }

    pub fn persist_candidates<H: Host>(&self, host: &mut H, role: Role) -> GovernanceResult<()> {
        host.store_json(candidates_key(role), &self.candidates(role))?;
        Ok(())
    }

    pub fn persist_ledger<H: Host>(&self, host: &mut H, role: Role) -> GovernanceResult<()> {
        host.store_json(reward_key(role), self.ledger(role))?;
        Ok(())
    }

    /// Write back both reward ledgers if any settlement or payout ran
    pub fn persist_dirty_ledgers<H: Host>(&self, host: &mut H) -> GovernanceResult<()> {
        if self.reward_dirty {
            host.store_json(VALIDATOR_REWARD_KEY, &self.val_ledger)?;
            host.store_json(KOL_REWARD_KEY, &self.kol_ledger)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use chain_core::Timestamp;

    pub(crate) fn address(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    /// Bare context for unit tests that drive engine internals directly
    pub(crate) fn bare_context(cfg: Config, sender: Address, timestamp: Timestamp) -> TxContext {
        TxContext {
            call: CallContext::new(sender, Amount::zero(), timestamp),
            cfg,
            all_stake: Amount::zero(),
            balance: Amount::zero(),
            committee: Vec::new(),
            val_cands: Vec::new(),
            kol_cands: Vec::new(),
            val_ledger: RewardLedger::new(),
            kol_ledger: RewardLedger::new(),
            reward_dirty: false,
        }
    }
}
