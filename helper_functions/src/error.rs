use thiserror::Error;
use types::primitives::{Shard, Slot, ValidatorIndex};

#[derive(Debug, Error)]
pub enum Error {
    #[error("sum of effective balances overflowed")]
    BalanceOverflow,
    #[error("no committee for shard {shard} at slot {slot}")]
    CommitteeNotFound { slot: Slot, shard: Shard },
    #[error("validator index {index} is out of range (registry length: {registry_length})")]
    IndexOutOfRange {
        index: ValidatorIndex,
        registry_length: usize,
    },
    #[error("recent block roots are empty")]
    MissingBlockRoot,
}
