// chain-host/src/lib.rs

//! Platform capability boundary
//!
//! The governance engine never touches the ledger, the persistent store or
//! the consensus layer directly. Everything it needs from the surrounding
//! platform is expressed by the [`Host`] trait:
//! - key-value persistence (load / store / remove)
//! - the contract account balance and outbound coin transfers
//! - the live validator set (read at genesis, replaced on elections)
//! - platform fee reconfiguration
//! - a structured event sink for audit/indexing
//!
//! [`MemoryHost`] is the in-memory implementation used by the test suites.

pub mod event;
pub mod memory;
pub mod txn;

pub use event::Event;
pub use memory::{MemoryHost, TransferRecord};
pub use txn::BufferedHost;

use chain_core::{Address, Amount, Timestamp};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors surfaced by the platform boundary
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("Insufficient balance: need {required}, have {available}")]
    InsufficientBalance { required: Amount, available: Amount },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Host error: {0}")]
    PlatformError(String),
}

/// Context of the call being executed: who sent it, what coin is attached,
/// and the platform clock
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallContext {
    pub sender: Address,
    pub coin_amount: Amount,
    pub timestamp: Timestamp,
}

impl CallContext {
    pub fn new(sender: Address, coin_amount: Amount, timestamp: Timestamp) -> Self {
        Self {
            sender,
            coin_amount,
            timestamp,
        }
    }
}

/// Purpose tag attached to outbound transfers, mirrored into the ledger memo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMemo {
    Reward,
    Refund,
}

/// Platform fee parameter updates driven by approved config proposals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeSetting {
    GasPrice(u64),
    BaseReserve(u64),
}

/// A member of the consensus validator set: node address plus backing stake
pub type ValidatorUpdate = (Address, Amount);

/// The platform capabilities available to the contract
///
/// The platform serializes calls and provides all-or-nothing semantics at
/// the call boundary; implementations do not need their own rollback.
/// `balance` already includes the attached payment of the call in flight.
pub trait Host {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);

    /// Balance of the contract account itself
    fn balance(&self) -> Amount;

    /// The validator set currently known to the consensus layer
    fn current_validators(&self) -> HostResult<Vec<ValidatorUpdate>>;

    /// Move coin out of the contract account
    fn transfer(
        &mut self,
        dest: &Address,
        amount: &Amount,
        memo: Option<TransferMemo>,
    ) -> HostResult<()>;

    /// Replace the consensus validator set
    fn replace_validators(&mut self, validators: &[ValidatorUpdate]) -> HostResult<()>;

    /// Push an updated platform fee parameter
    fn configure_fee(&mut self, fee: FeeSetting) -> HostResult<()>;

    /// Emit a structured audit event
    fn emit(&mut self, event: Event);

    /// Load and decode a JSON record
    fn load_json<T: DeserializeOwned>(&self, key: &str) -> HostResult<Option<T>> {
        match self.load(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| HostError::SerializationError(format!("{key}: {e}"))),
        }
    }

    /// Encode and store a JSON record
    fn store_json<T: Serialize>(&mut self, key: &str, value: &T) -> HostResult<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| HostError::SerializationError(format!("{key}: {e}")))?;
        self.store(key, raw);
        Ok(())
    }
}
