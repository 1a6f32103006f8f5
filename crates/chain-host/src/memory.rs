// chain-host/src/memory.rs

use crate::{Event, FeeSetting, Host, HostError, HostResult, TransferMemo, ValidatorUpdate};
use chain_core::{Address, Amount};
use std::collections::HashMap;

/// An outbound transfer captured for assertions
#[derive(Debug, Clone, PartialEq)]
pub struct TransferRecord {
    pub dest: Address,
    pub amount: Amount,
    pub memo: Option<TransferMemo>,
}

/// In-memory host used by the test suites
///
/// Holds the contract's key-value records and balance alongside external
/// account balances, and records every event, transfer, validator-set push
/// and fee update so tests can assert on the full side-effect trail.
#[derive(Debug, Default)]
pub struct MemoryHost {
    store: HashMap<String, String>,
    balance: Amount,
    balances: HashMap<Address, Amount>,
    genesis_validators: Vec<ValidatorUpdate>,
    pub events: Vec<Event>,
    pub transfers: Vec<TransferRecord>,
    pub validator_updates: Vec<Vec<ValidatorUpdate>>,
    pub fee_updates: Vec<FeeSetting>,
}

impl MemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the validator set reported by `current_validators`
    pub fn with_genesis_validators(mut self, validators: Vec<ValidatorUpdate>) -> Self {
        self.genesis_validators = validators;
        self
    }

    /// Credit the contract account, as the platform does before the call
    /// runs when a payment is attached
    pub fn deposit(&mut self, amount: &Amount) {
        self.balance = Amount::new(self.balance.inner() + amount.inner());
    }

    /// Balance of an external account credited by transfers
    pub fn balance_of(&self, address: &Address) -> Amount {
        self.balances.get(address).cloned().unwrap_or_else(Amount::zero)
    }

    /// The most recent validator-set push, if any
    pub fn last_validator_update(&self) -> Option<&Vec<ValidatorUpdate>> {
        self.validator_updates.last()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.store.contains_key(key)
    }
}

impl Host for MemoryHost {
    fn load(&self, key: &str) -> Option<String> {
        self.store.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: String) {
        self.store.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.store.remove(key);
    }

    fn balance(&self) -> Amount {
        self.balance.clone()
    }

    fn current_validators(&self) -> HostResult<Vec<ValidatorUpdate>> {
        Ok(self.genesis_validators.clone())
    }

    fn transfer(
        &mut self,
        dest: &Address,
        amount: &Amount,
        memo: Option<TransferMemo>,
    ) -> HostResult<()> {
        self.balance =
            self.balance
                .checked_sub(amount)
                .ok_or_else(|| HostError::InsufficientBalance {
                    required: amount.clone(),
                    available: self.balance.clone(),
                })?;

        let credited = self
            .balance_of(dest)
            .checked_add(amount)
            .ok_or_else(|| HostError::PlatformError("balance overflow".into()))?;
        self.balances.insert(*dest, credited);

        self.transfers.push(TransferRecord {
            dest: *dest,
            amount: amount.clone(),
            memo,
        });
        Ok(())
    }

    fn replace_validators(&mut self, validators: &[ValidatorUpdate]) -> HostResult<()> {
        self.validator_updates.push(validators.to_vec());
        Ok(())
    }

    fn configure_fee(&mut self, fee: FeeSetting) -> HostResult<()> {
        self.fee_updates.push(fee);
        Ok(())
    }

    fn emit(&mut self, event: Event) {
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_round_trip() {
        let mut host = MemoryHost::new();
        host.store("k", "v".to_string());
        assert_eq!(host.load("k"), Some("v".to_string()));

        host.remove("k");
        assert_eq!(host.load("k"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let mut host = MemoryHost::new();
        host.store_json("amounts", &vec![Amount::from_u64(7)]).unwrap();

        let back: Option<Vec<Amount>> = host.load_json("amounts").unwrap();
        assert_eq!(back, Some(vec![Amount::from_u64(7)]));

        let missing: Option<Vec<Amount>> = host.load_json("nothing").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(100));

        let dest = Address::new([3u8; 20]);
        host.transfer(&dest, &Amount::from_u64(40), Some(TransferMemo::Refund))
            .unwrap();

        assert_eq!(host.balance(), Amount::from_u64(60));
        assert_eq!(host.balance_of(&dest), Amount::from_u64(40));
        assert_eq!(host.transfers.len(), 1);
    }

    #[test]
    fn test_transfer_rejects_overdraft() {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(10));

        let err = host
            .transfer(&Address::zero(), &Amount::from_u64(40), None)
            .unwrap_err();
        assert!(matches!(err, HostError::InsufficientBalance { .. }));
    }
}
