// governance/src/dispatch.rs

//! Request dispatch
//!
//! The contract boundary: a closed command enum mapped onto the engine
//! operations, matched exhaustively so every platform method has a handler
//! at compile time. Each call runs against a write buffer that only commits
//! on success, so a failed call leaves no partial state behind.

use crate::config::{Config, ConfigItem, ConfigValue};
use crate::context::TxContext;
use crate::keys::{
    voter_key, ProposalItem, ProposalKey, COMMITTEE_KEY, CONFIG_KEY, KOL_CANDIDATES_KEY,
    KOL_REWARD_KEY, STAKE_KEY, VALIDATOR_CANDIDATES_KEY, VALIDATOR_REWARD_KEY,
};
use crate::proposals::{load_proposal, save_proposal, ApplyProposal, Proposal};
use crate::registry::{rank_cmp, CandidateEntry};
use crate::rewards::{calculate, RewardLedger, RewardShare};
use crate::{GovernanceError, GovernanceResult};
use chain_core::{Address, Amount, Motion, Role};
use chain_host::{BufferedHost, CallContext, Event, Host};
use serde::{Deserialize, Serialize};

/// State-changing contract methods and their parameters
///
/// Serde keeps the original wire shape:
/// `{"method": "vote", "params": {"role": "validator", "address": "0x…"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Request {
    Init {
        committee: Vec<Address>,
        logic_contract: Address,
    },
    Apply {
        role: Role,
        #[serde(default)]
        pool: Option<Address>,
        #[serde(default)]
        ratio: Option<u8>,
        #[serde(default)]
        node: Option<Address>,
    },
    Append {
        role: Role,
    },
    Approve {
        #[serde(rename = "operate")]
        motion: Motion,
        item: ProposalItem,
        address: Address,
    },
    Vote {
        role: Role,
        address: Address,
    },
    UnVote {
        role: Role,
        address: Address,
    },
    Abolish {
        role: Role,
        address: Address,
        proof: String,
    },
    Withdraw {
        role: Role,
    },
    Extract {
        #[serde(default)]
        list: Option<Vec<Address>>,
    },
    Configure {
        item: ConfigItem,
        value: ConfigValue,
    },
    SetNodeAddress {
        address: Address,
    },
    SetVoteDividend {
        role: Role,
        #[serde(default)]
        pool: Option<Address>,
        #[serde(default)]
        ratio: Option<u8>,
    },
    Clean {
        #[serde(rename = "operate")]
        motion: Motion,
        item: ProposalItem,
        address: Address,
    },
}

impl Request {
    /// Only applications, pledge top-ups and votes may carry coin
    fn accepts_payment(&self) -> bool {
        matches!(
            self,
            Request::Init { .. } | Request::Apply { .. } | Request::Append { .. } | Request::Vote { .. }
        )
    }
}

/// Read-only contract queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", content = "params", rename_all = "camelCase")]
pub enum Query {
    GetProposal {
        #[serde(rename = "operate")]
        motion: Motion,
        item: ProposalItem,
        address: Address,
    },
    GetVoteInfo {
        role: Role,
        candidate: Address,
        #[serde(default)]
        voter: Option<Address>,
    },
    GetValidators,
    GetValidatorCandidates,
    GetKols,
    GetKolCandidates,
    GetCommittee,
    GetRewardDistribute,
    GetConfiguration,
}

/// Result of a state-changing call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Done,
    /// A ballot was cast on a proposal past its expiration; nothing changed
    ProposalExpired,
}

/// Result of a read-only query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    Proposal(Option<Proposal>),
    VoteInfo(Option<Amount>),
    Candidates(Vec<CandidateEntry>),
    Committee(Vec<Address>),
    RewardDistribution {
        validators: RewardLedger,
        kols: RewardLedger,
    },
    Configuration(Config),
}

/// Execute one state-changing call
///
/// All writes are staged and committed only when the whole call succeeds.
pub fn execute<H: Host>(
    host: &mut H,
    call: &CallContext,
    request: Request,
) -> GovernanceResult<Outcome> {
    let mut buffered = BufferedHost::new(host);
    let outcome = execute_buffered(&mut buffered, call, request)?;
    buffered.commit()?;
    Ok(outcome)
}

fn execute_buffered<H: Host>(
    host: &mut H,
    call: &CallContext,
    request: Request,
) -> GovernanceResult<Outcome> {
    if let Request::Init {
        committee,
        logic_contract,
    } = &request
    {
        initialize(host, call, committee.clone(), *logic_contract)?;
        return Ok(Outcome::Done);
    }

    let mut ctx = TxContext::load(host, call.clone())?;
    ctx.absorb_payment(host)?;
    if !request.accepts_payment() && !call.coin_amount.is_zero() {
        return Err(GovernanceError::Validation(
            "unexpected payment attached to the call".into(),
        ));
    }

    let outcome = match request {
        Request::Init { .. } => Outcome::Done, // handled above
        Request::Apply {
            role,
            pool,
            ratio,
            node,
        } => {
            ctx.apply_role(host, role, pool, ratio, node)?;
            Outcome::Done
        }
        Request::Append { role } => {
            ctx.append_pledge(host, role)?;
            Outcome::Done
        }
        Request::Approve {
            motion,
            item,
            address,
        } => ctx.approve(host, motion, item, address)?,
        Request::Vote { role, address } => {
            ctx.vote(host, role, address)?;
            Outcome::Done
        }
        Request::UnVote { role, address } => {
            ctx.unvote(host, role, address)?;
            Outcome::Done
        }
        Request::Abolish {
            role,
            address,
            proof,
        } => {
            ctx.abolish_role(host, role, address, proof)?;
            Outcome::Done
        }
        Request::Withdraw { role } => {
            ctx.withdraw_role(host, role)?;
            Outcome::Done
        }
        Request::Extract { list } => {
            ctx.extract(host, list)?;
            Outcome::Done
        }
        Request::Configure { item, value } => {
            ctx.configure(host, item, value)?;
            Outcome::Done
        }
        Request::SetNodeAddress { address } => {
            ctx.set_node_address(host, address)?;
            Outcome::Done
        }
        Request::SetVoteDividend { role, pool, ratio } => {
            ctx.set_vote_dividend(host, role, pool, ratio)?;
            Outcome::Done
        }
        Request::Clean {
            motion,
            item,
            address,
        } => {
            ctx.clean(host, motion, item, address)?;
            Outcome::Done
        }
    };

    ctx.persist_dirty_ledgers(host)?;
    Ok(outcome)
}

/// Seed the contract state at genesis
///
/// The committee is installed with pre-approved application records, and
/// the consensus layer's current validator set becomes the initial
/// validator candidate sequence with each node backing itself.
fn initialize<H: Host>(
    host: &mut H,
    call: &CallContext,
    committee: Vec<Address>,
    logic_contract: Address,
) -> GovernanceResult<()> {
    if host.load(CONFIG_KEY).is_some() {
        return Err(GovernanceError::StateConflict(
            "repeated initialization".into(),
        ));
    }
    let cfg = Config::genesis(logic_contract);
    host.store_json(CONFIG_KEY, &cfg)?;

    if committee.len() > cfg.committee_size {
        return Err(GovernanceError::Validation(
            "the committee size is exceeded".into(),
        ));
    }
    let expiry = call
        .timestamp
        .checked_add(cfg.valid_period)
        .ok_or_else(|| GovernanceError::Arithmetic("expiration overflow".into()))?;

    for member in &committee {
        let proposal = ApplyProposal {
            pledge: Amount::zero(),
            expiration: expiry,
            ballot: Vec::new(),
            pass_time: Some(expiry),
            reward_pool: None,
            reward_ratio: None,
            node: None,
        };
        save_proposal(
            host,
            &ProposalKey::new(Motion::Apply, Role::Committee, *member),
            &Proposal::Apply(proposal),
        )?;
    }
    host.store_json(COMMITTEE_KEY, &committee)?;

    let mut entries = Vec::new();
    let mut ledger = RewardLedger::new();
    for (address, stake) in host.current_validators()? {
        let proposal = ApplyProposal {
            pledge: Amount::zero(),
            expiration: expiry,
            ballot: Vec::new(),
            pass_time: Some(expiry),
            reward_pool: Some(address),
            reward_ratio: Some(0),
            node: Some(address),
        };
        save_proposal(
            host,
            &ProposalKey::new(Motion::Apply, Role::Validator, address),
            &Proposal::Apply(proposal),
        )?;
        ledger.insert(address, RewardShare::new(address, 0));
        entries.push(CandidateEntry {
            address,
            stake,
            node: Some(address),
        });
    }
    entries.sort_by(rank_cmp);

    host.store_json(VALIDATOR_CANDIDATES_KEY, &entries)?;
    host.store_json(KOL_CANDIDATES_KEY, &Vec::<CandidateEntry>::new())?;
    host.store_json(VALIDATOR_REWARD_KEY, &ledger)?;
    host.store_json(KOL_REWARD_KEY, &RewardLedger::new())?;
    host.store(STAKE_KEY, call.coin_amount.to_string());

    host.emit(Event::Initialized {
        sender: call.sender,
        logic_contract,
    });
    tracing::info!(
        "initialized with {} committee members and {} validators",
        committee.len(),
        entries.len()
    );
    Ok(())
}

/// Answer one read-only query
pub fn query<H: Host>(host: &H, call: &CallContext, query: Query) -> GovernanceResult<QueryResult> {
    match query {
        Query::GetProposal {
            motion,
            item,
            address,
        } => {
            let key = ProposalKey::new(motion, item, address);
            Ok(QueryResult::Proposal(load_proposal(host, &key)?))
        }
        Query::GetVoteInfo {
            role,
            candidate,
            voter,
        } => {
            let voter = voter.unwrap_or(call.sender);
            let amount = match host.load(&voter_key(&voter, role, &candidate)) {
                Some(raw) => Some(Amount::parse(&raw)?),
                None => None,
            };
            Ok(QueryResult::VoteInfo(amount))
        }
        Query::GetValidators => {
            let ctx = TxContext::load(host, call.clone())?;
            let formal = ctx.val_cands[..ctx.cfg.validator_size.min(ctx.val_cands.len())].to_vec();
            Ok(QueryResult::Candidates(formal))
        }
        Query::GetValidatorCandidates => {
            let ctx = TxContext::load(host, call.clone())?;
            Ok(QueryResult::Candidates(ctx.val_cands))
        }
        Query::GetKols => {
            let ctx = TxContext::load(host, call.clone())?;
            let formal = ctx.kol_cands[..ctx.cfg.kol_size.min(ctx.kol_cands.len())].to_vec();
            Ok(QueryResult::Candidates(formal))
        }
        Query::GetKolCandidates => {
            let ctx = TxContext::load(host, call.clone())?;
            Ok(QueryResult::Candidates(ctx.kol_cands))
        }
        Query::GetCommittee => {
            let ctx = TxContext::load(host, call.clone())?;
            Ok(QueryResult::Committee(ctx.committee))
        }
        Query::GetRewardDistribute => {
            // settle the pending reward into cloned ledgers; nothing persists
            let ctx = TxContext::load(host, call.clone())?;
            let mut validators = ctx.val_ledger.clone();
            let mut kols = ctx.kol_ledger.clone();
            let reward = ctx.balance.checked_sub(&ctx.all_stake).ok_or_else(|| {
                GovernanceError::Arithmetic("contract balance below aggregate stake".into())
            })?;
            if !reward.is_zero() {
                calculate(
                    &ctx.cfg,
                    &ctx.val_cands,
                    &ctx.kol_cands,
                    &reward,
                    &mut validators,
                    &mut kols,
                )?;
            }
            Ok(QueryResult::RewardDistribution { validators, kols })
        }
        Query::GetConfiguration => {
            let ctx = TxContext::load(host, call.clone())?;
            Ok(QueryResult::Configuration(ctx.cfg))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chain_host::MemoryHost;

    fn address(byte: u8) -> Address {
        Address::new([byte; 20])
    }

    fn call(sender: u8, coin: u64, timestamp: u64) -> CallContext {
        CallContext::new(address(sender), Amount::from_u64(coin), timestamp)
    }

    fn init_request() -> Request {
        Request::Init {
            committee: vec![address(1), address(2), address(3)],
            logic_contract: address(9),
        }
    }

    fn initialized_host() -> MemoryHost {
        let mut host = MemoryHost::new().with_genesis_validators(vec![
            (address(21), Amount::from_u64(100)),
            (address(20), Amount::from_u64(80)),
        ]);
        host.deposit(&Amount::from_u64(1_000));
        execute(&mut host, &call(1, 1_000, 10), init_request()).unwrap();
        host
    }

    #[test]
    fn test_request_wire_shape() {
        let json = r#"{"method":"vote","params":{"role":"validator","address":"0x0505050505050505050505050505050505050505"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            Request::Vote {
                role: Role::Validator,
                address: address(5),
            }
        );

        let back = serde_json::to_value(&request).unwrap();
        assert_eq!(back["method"], "vote");
        assert_eq!(back["params"]["role"], "validator");
    }

    #[test]
    fn test_approve_wire_shape_uses_operate() {
        let json = r#"{"method":"approve","params":{"operate":"apply","item":"kol","address":"0x0707070707070707070707070707070707070707"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert_eq!(
            request,
            Request::Approve {
                motion: Motion::Apply,
                item: ProposalItem::Role(Role::Kol),
                address: address(7),
            }
        );
    }

    #[test]
    fn test_config_item_parses_in_proposal_item_position() {
        let json = r#"{"method":"clean","params":{"operate":"config","item":"kol_size","address":"0x0707070707070707070707070707070707070707"}}"#;
        let request: Request = serde_json::from_str(json).unwrap();
        assert!(matches!(
            request,
            Request::Clean {
                motion: Motion::Config,
                item: ProposalItem::Config(ConfigItem::KolSize),
                ..
            }
        ));
    }

    #[test]
    fn test_query_wire_shape() {
        let query: Query = serde_json::from_str(r#"{"method":"getValidators"}"#).unwrap();
        assert_eq!(query, Query::GetValidators);
    }

    #[test]
    fn test_initialization_seeds_state() {
        let host = initialized_host();

        assert_eq!(host.load(STAKE_KEY), Some("1000".to_string()));

        let committee: Vec<Address> =
            serde_json::from_str(&host.load(COMMITTEE_KEY).unwrap()).unwrap();
        assert_eq!(committee, vec![address(1), address(2), address(3)]);

        let candidates: Vec<CandidateEntry> =
            serde_json::from_str(&host.load(VALIDATOR_CANDIDATES_KEY).unwrap()).unwrap();
        assert_eq!(candidates.len(), 2);
        // sorted by stake descending, node defaulted to self
        assert_eq!(candidates[0].address, address(21));
        assert_eq!(candidates[0].stake, Amount::from_u64(100));
        assert_eq!(candidates[0].node, Some(address(21)));
        assert_eq!(candidates[1].address, address(20));

        let kols: Vec<CandidateEntry> =
            serde_json::from_str(&host.load(KOL_CANDIDATES_KEY).unwrap()).unwrap();
        assert!(kols.is_empty());

        let ledger: RewardLedger =
            serde_json::from_str(&host.load(VALIDATOR_REWARD_KEY).unwrap()).unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[&address(21)].pool, address(21));
    }

    #[test]
    fn test_repeated_initialization_conflicts() {
        let mut host = initialized_host();

        let err = execute(&mut host, &call(1, 0, 20), init_request()).unwrap_err();
        assert!(matches!(err, GovernanceError::StateConflict(_)));
    }

    #[test]
    fn test_payment_guard_rejects_coin_on_plain_calls() {
        let mut host = initialized_host();
        host.deposit(&Amount::from_u64(50));

        let before = host.load(STAKE_KEY);
        let err = execute(
            &mut host,
            &call(1, 50, 20),
            Request::Withdraw {
                role: Role::Committee,
            },
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::Validation(_)));
        // the aborted call staged no writes, including the payment fold-in
        assert_eq!(host.load(STAKE_KEY), before);
    }

    #[test]
    fn test_failed_call_leaves_no_partial_state() {
        let mut host = initialized_host();
        host.deposit(&Amount::from_u64(299_999_999_999_999));

        let err = execute(
            &mut host,
            &call(5, 299_999_999_999_999, 20),
            Request::Apply {
                role: Role::Validator,
                pool: None,
                ratio: None,
                node: None,
            },
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::BusinessRule(_)));

        // no proposal record, aggregate stake untouched
        let key = ProposalKey::new(Motion::Apply, Role::Validator, address(5));
        assert_eq!(host.load(&key.storage_key()), None);
        assert_eq!(host.load(STAKE_KEY), Some("1000".to_string()));
    }

    #[test]
    fn test_query_get_validators_returns_formal_slice() {
        let host = initialized_host();

        let result = query(&host, &call(1, 0, 20), Query::GetValidators).unwrap();
        let QueryResult::Candidates(validators) = result else {
            panic!("expected candidates");
        };
        assert_eq!(validators.len(), 2);
        assert_eq!(validators[0].address, address(21));
    }

    #[test]
    fn test_query_reward_distribute_does_not_persist() {
        let mut host = initialized_host();
        // 500 of pending reward
        host.deposit(&Amount::from_u64(500));

        let result = query(&host, &call(1, 0, 20), Query::GetRewardDistribute).unwrap();
        let QueryResult::RewardDistribution { validators, .. } = result else {
            panic!("expected reward distribution");
        };
        // the hypothetical settlement shows up in the answer…
        let total: Amount = validators
            .values()
            .fold(Amount::zero(), |acc, s| acc.checked_add(&s.accrued).unwrap());
        assert_eq!(total, Amount::from_u64(500));

        // …but nothing was written back
        assert_eq!(host.load(STAKE_KEY), Some("1000".to_string()));
        let stored: RewardLedger =
            serde_json::from_str(&host.load(VALIDATOR_REWARD_KEY).unwrap()).unwrap();
        assert!(stored.values().all(|s| s.accrued.is_zero()));
    }

    #[test]
    fn test_extract_settles_and_pays_through_dispatch() {
        let mut host = initialized_host();
        host.deposit(&Amount::from_u64(500));

        execute(
            &mut host,
            &call(21, 0, 20),
            Request::Extract { list: None },
        )
        .unwrap();

        // validator 21 is top ranked: 500/2 = 250 each, remainder 0,
        // mod-100 leftover 0; caller 21 receives its own 250
        assert_eq!(host.balance_of(&address(21)), Amount::from_u64(250));
        assert_eq!(host.load(STAKE_KEY), Some("1250".to_string()));

        let ledger: RewardLedger =
            serde_json::from_str(&host.load(VALIDATOR_REWARD_KEY).unwrap()).unwrap();
        assert_eq!(ledger[&address(21)].accrued, Amount::zero());
        assert_eq!(ledger[&address(20)].accrued, Amount::from_u64(250));
    }

    #[test]
    fn test_vote_requires_registered_candidate() {
        let mut host = initialized_host();
        host.deposit(&Amount::from_u64(1_000_000_000));

        let err = execute(
            &mut host,
            &call(5, 1_000_000_000, 20),
            Request::Vote {
                role: Role::Validator,
                address: address(77),
            },
        )
        .unwrap_err();
        assert!(matches!(err, GovernanceError::NotFound(_)));
        // no voter record left behind
        assert_eq!(
            host.load(&voter_key(&address(5), Role::Validator, &address(77))),
            None
        );
    }
}
