// governance/src/lib.rs

//! DPoS governance and incentive engine
//!
//! This crate implements the authoritative state-transition logic of the
//! election contract:
//! - Validator and KOL candidate ranking with promotion/demotion between
//!   the candidate and formal tiers
//! - Stake-weighted reward accrual and integer-exact distribution
//! - The committee ballot workflow (apply / abolish / withdraw / config)
//! - Vote-driven stake adjustment and reward payout
//!
//! The engine runs one call at a time against state loaded fresh from the
//! platform [`chain_host::Host`]; a failed call leaves no partial writes.

pub mod config;
pub mod context;
pub mod dispatch;
pub mod keys;
pub mod payout;
pub mod proposals;
pub mod registry;
pub mod rewards;
pub mod voting;

pub use config::{Config, ConfigItem, ConfigValue};
pub use context::TxContext;
pub use dispatch::{execute, query, Outcome, Query, QueryResult, Request};
pub use keys::{ProposalItem, ProposalKey};
pub use proposals::{AbolishProposal, ApplyProposal, ConfigProposal, Proposal, WithdrawProposal};
pub use registry::CandidateEntry;
pub use rewards::{RewardLedger, RewardShare};

/// Result type for governance operations
pub type GovernanceResult<T> = Result<T, GovernanceError>;

/// Errors that abort a governance call
///
/// Any error discards the call's pending writes; the platform reports the
/// reason string back to the caller.
#[derive(Debug, thiserror::Error)]
pub enum GovernanceError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Authorization error: {0}")]
    Authorization(String),

    #[error("State conflict: {0}")]
    StateConflict(String),

    #[error("Business rule violated: {0}")]
    BusinessRule(String),

    #[error("Arithmetic error: {0}")]
    Arithmetic(String),

    #[error("Host error: {0}")]
    Host(#[from] chain_host::HostError),
}

impl From<chain_core::CoreError> for GovernanceError {
    fn from(err: chain_core::CoreError) -> Self {
        GovernanceError::Validation(err.to_string())
    }
}
