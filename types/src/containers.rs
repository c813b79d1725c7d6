use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};

use crate::{
    bitfield::ParticipationBitfield,
    primitives::{Gwei, Shard, Slot, ValidatorIndex, H256},
};

// Integer fields accept both native numbers and decimal strings.
// Snapshots exported by other clients tend to quote 64-bit values.

#[serde_as]
#[derive(
    Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Debug, Deserialize, Serialize,
)]
#[serde(deny_unknown_fields)]
pub struct AttestationData {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub slot: Slot,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub shard: Shard,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub justified_slot: Slot,
    pub justified_block_root: H256,
    pub epoch_boundary_root: H256,
}

#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PendingAttestation {
    pub data: AttestationData,
    pub participation_bitfield: ParticipationBitfield,
}

/// Validators assigned to attest for one shard in one slot.
///
/// The position of a validator in `committee` is the position of its bit in
/// [`PendingAttestation::participation_bitfield`].
#[serde_as]
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ShardCommittee {
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub shard: Shard,
    #[serde_as(as = "Vec<PickFirst<(_, DisplayFromStr)>>")]
    pub committee: Vec<ValidatorIndex>,
}

#[serde_as]
#[derive(Clone, PartialEq, Eq, Default, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorRecord {
    #[serde(with = "hex")]
    pub pubkey: Vec<u8>,
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub balance: Gwei,
}
