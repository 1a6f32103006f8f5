// chain-host/src/event.rs

use chain_core::{Address, Amount, Motion, Role, StakeChange};
use serde::{Deserialize, Serialize};

/// Structured audit events, one per state-changing operation
///
/// Nested state transitions (reward settlements, validator-set pushes,
/// registry changes) emit their own events in addition to the event of the
/// operation that triggered them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    Initialized {
        sender: Address,
        logic_contract: Address,
    },
    Applied {
        sender: Address,
        role: Role,
        pool: Option<Address>,
        ratio: Option<u8>,
        node: Option<Address>,
    },
    Appended {
        sender: Address,
        role: Role,
        amount: Amount,
    },
    Approved {
        motion: Motion,
        item: String,
        address: Address,
    },
    Voted {
        voter: Address,
        role: Role,
        candidate: Address,
        amount: Amount,
    },
    Unvoted {
        voter: Address,
        role: Role,
        candidate: Address,
        amount: Amount,
    },
    AbolishProposed {
        informer: Address,
        role: Role,
        address: Address,
        proof: String,
    },
    Withdrawn {
        sender: Address,
        role: Role,
        refund: Option<Amount>,
    },
    ConfigureProposed {
        sender: Address,
        item: String,
        value: serde_json::Value,
    },
    ConfigUpdated {
        item: String,
    },
    Cleaned {
        motion: Motion,
        item: String,
        address: Address,
    },
    NodeAddressSet {
        sender: Address,
        node: Address,
    },
    VoteDividendSet {
        pool: Address,
        ratio: u8,
    },
    RewardDistributed {
        reward: Amount,
        sender: Address,
    },
    Awarded {
        address: Address,
        self_share: Amount,
        pool: Address,
        pool_share: Amount,
    },
    CandidateAdded {
        address: Address,
        role: Role,
    },
    CandidateRemoved {
        address: Address,
        role: Role,
    },
    StakeUpdated {
        address: Address,
        role: Role,
        change: StakeChange,
    },
    ValidatorsUpdated {
        count: usize,
    },
    Penalized {
        evil: Address,
        role: Role,
        pledge: Amount,
    },
}
