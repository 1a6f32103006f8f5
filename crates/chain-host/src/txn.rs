// chain-host/src/txn.rs

use crate::{Event, FeeSetting, Host, HostError, HostResult, TransferMemo, ValidatorUpdate};
use chain_core::{Address, Amount};
use std::collections::HashMap;

/// Write-buffering host wrapper giving a call all-or-nothing semantics
///
/// Every mutation is staged against the wrapped host and only applied by
/// [`BufferedHost::commit`]. Dropping the wrapper without committing
/// discards the call's writes, which is how an aborted call leaves no
/// partial state behind. Reads see the staged writes (read-your-writes).
pub struct BufferedHost<'a, H: Host> {
    inner: &'a mut H,
    writes: HashMap<String, Option<String>>,
    pending_out: Amount,
    transfers: Vec<(Address, Amount, Option<TransferMemo>)>,
    validator_updates: Vec<Vec<ValidatorUpdate>>,
    fee_updates: Vec<FeeSetting>,
    events: Vec<Event>,
}

impl<'a, H: Host> BufferedHost<'a, H> {
    pub fn new(inner: &'a mut H) -> Self {
        Self {
            inner,
            writes: HashMap::new(),
            pending_out: Amount::zero(),
            transfers: Vec::new(),
            validator_updates: Vec::new(),
            fee_updates: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Apply all staged effects to the wrapped host
    pub fn commit(self) -> HostResult<()> {
        for (key, value) in self.writes {
            match value {
                Some(v) => self.inner.store(&key, v),
                None => self.inner.remove(&key),
            }
        }
        for (dest, amount, memo) in self.transfers {
            self.inner.transfer(&dest, &amount, memo)?;
        }
        for validators in self.validator_updates {
            self.inner.replace_validators(&validators)?;
        }
        for fee in self.fee_updates {
            self.inner.configure_fee(fee)?;
        }
        for event in self.events {
            self.inner.emit(event);
        }
        Ok(())
    }
}

impl<H: Host> Host for BufferedHost<'_, H> {
    fn load(&self, key: &str) -> Option<String> {
        match self.writes.get(key) {
            Some(staged) => staged.clone(),
            None => self.inner.load(key),
        }
    }

    fn store(&mut self, key: &str, value: String) {
        self.writes.insert(key.to_string(), Some(value));
    }

    fn remove(&mut self, key: &str) {
        self.writes.insert(key.to_string(), None);
    }

    fn balance(&self) -> Amount {
        self.inner
            .balance()
            .checked_sub(&self.pending_out)
            .unwrap_or_else(Amount::zero)
    }

    fn current_validators(&self) -> HostResult<Vec<ValidatorUpdate>> {
        self.inner.current_validators()
    }

    fn transfer(
        &mut self,
        dest: &Address,
        amount: &Amount,
        memo: Option<TransferMemo>,
    ) -> HostResult<()> {
        let available = self.balance();
        if &available < amount {
            return Err(HostError::InsufficientBalance {
                required: amount.clone(),
                available,
            });
        }
        self.pending_out = self
            .pending_out
            .checked_add(amount)
            .ok_or_else(|| HostError::PlatformError("transfer overflow".into()))?;
        self.transfers.push((*dest, amount.clone(), memo));
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
    use crate::MemoryHost;

    #[test]
    fn test_commit_applies_writes() {
        let mut host = MemoryHost::new();
        host.store("keep", "old".to_string());

        let mut buf = BufferedHost::new(&mut host);
        buf.store("keep", "new".to_string());
        buf.store("fresh", "1".to_string());
        buf.remove("missing");
        buf.commit().unwrap();

        assert_eq!(host.load("keep"), Some("new".to_string()));
        assert_eq!(host.load("fresh"), Some("1".to_string()));
    }

    #[test]
    fn test_drop_discards_writes() {
        let mut host = MemoryHost::new();
        host.store("keep", "old".to_string());

        {
            let mut buf = BufferedHost::new(&mut host);
            buf.store("keep", "new".to_string());
            // dropped without commit
        }

        assert_eq!(host.load("keep"), Some("old".to_string()));
    }

    #[test]
    fn test_read_your_writes() {
        let mut host = MemoryHost::new();
        host.store("k", "old".to_string());

        let mut buf = BufferedHost::new(&mut host);
        buf.store("k", "new".to_string());
        assert_eq!(buf.load("k"), Some("new".to_string()));

        buf.remove("k");
        assert_eq!(buf.load("k"), None);
    }

    #[test]
    fn test_balance_tracks_staged_transfers() {
        let mut host = MemoryHost::new();
        host.deposit(&Amount::from_u64(100));

        let mut buf = BufferedHost::new(&mut host);
        buf.transfer(&Address::zero(), &Amount::from_u64(70), None)
            .unwrap();
        assert_eq!(buf.balance(), Amount::from_u64(30));

        let err = buf
            .transfer(&Address::zero(), &Amount::from_u64(31), None)
            .unwrap_err();
        assert!(matches!(err, HostError::InsufficientBalance { .. }));

        buf.commit().unwrap();
        assert_eq!(host.balance(), Amount::from_u64(30));
        assert_eq!(host.balance_of(&Address::zero()), Amount::from_u64(70));
    }
}
