use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::{
    containers::{PendingAttestation, ShardCommittee, ValidatorRecord},
    primitives::{Slot, H256},
};

/// Snapshot of the parts of the beacon state read during epoch boundary processing.
///
/// Functions in `helper_functions` and `transition_functions` only ever borrow it immutably.
#[serde_as]
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BeaconState {
    // > Versioning
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub slot: Slot,

    // > History
    pub recent_block_roots: Vec<H256>,

    // > Committees
    //
    // `committees_by_slot[0]` holds the committees for `committees_start_slot`.
    #[serde(default)]
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub committees_start_slot: Slot,
    pub committees_by_slot: Vec<Vec<ShardCommittee>>,

    // > Registry
    pub validator_registry: Vec<ValidatorRecord>,

    // > Attestations
    pub latest_attestations: Vec<PendingAttestation>,
}
