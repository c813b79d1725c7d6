use anyhow::Result;
use hashlink::LinkedHashSet;
use helper_functions::{
    accessors::{
        get_attesting_indices, get_epoch_boundary_root, get_total_balance, get_validator,
    },
    misc::{compute_epoch_at_slot, compute_epoch_boundary_slot, compute_epoch_window_start},
};
use itertools::Itertools as _;
use log::{debug, trace};
use serde::Serialize;
use tap::Pipe as _;
use types::{
    beacon_state::BeaconState,
    config::Config,
    containers::{PendingAttestation, ValidatorRecord},
    primitives::{Epoch, Gwei, Slot, ValidatorIndex, H256},
};

/// Values consumed by justification at an epoch transition.
#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct BoundarySummary {
    pub epoch: Epoch,
    pub boundary_slot: Slot,
    pub boundary_root: H256,
    pub window_attestation_count: usize,
    pub boundary_attestation_count: usize,
    pub attester_indices: Vec<ValidatorIndex>,
    pub attesting_balance: Gwei,
    pub total_balance: Gwei,
}

/// Selects attestations made in the last epoch.
///
/// Attestations at or after `slot - epoch_length` are kept. While the chain is younger than one
/// epoch every retained attestation is kept.
#[must_use]
pub fn epoch_attestations<'state>(
    config: &Config,
    state: &'state BeaconState,
) -> Vec<&'state PendingAttestation> {
    let window_start = compute_epoch_window_start(config, state.slot);

    state
        .latest_attestations
        .iter()
        .filter(|attestation| attestation.data.slot >= window_start)
        .collect()
}

/// Keeps attestations that vote for the canonical block root at the epoch boundary slot.
///
/// The root is resolved before any attestation is looked at,
/// so this fails without block root history even if `attestations` is empty.
pub fn boundary_attestations<'attestations>(
    config: &Config,
    state: &BeaconState,
    attestations: impl IntoIterator<Item = &'attestations PendingAttestation>,
) -> Result<Vec<&'attestations PendingAttestation>> {
    let boundary_root = get_epoch_boundary_root(config, state)?;

    attestations
        .into_iter()
        .filter(|attestation| attestation.data.epoch_boundary_root == boundary_root)
        .collect_vec()
        .pipe(Ok)
}

/// Decodes participation in `attestations` into validator indices.
///
/// Each index appears once, at the position it was first seen in. Attestations are scanned in
/// order and bits within each attestation from position 0 upward.
pub fn boundary_attester_indices<'attestations>(
    state: &BeaconState,
    attestations: impl IntoIterator<Item = &'attestations PendingAttestation>,
) -> Result<Vec<ValidatorIndex>> {
    let mut attester_indices = LinkedHashSet::new();

    for attestation in attestations {
        let PendingAttestation {
            data,
            participation_bitfield,
        } = attestation;

        trace!(
            "decoding participation (slot: {}, shard: {}, bitfield: {participation_bitfield:?})",
            data.slot,
            data.shard,
        );

        for validator_index in get_attesting_indices(state, *data, participation_bitfield)? {
            // `LinkedHashSet::insert` would move an existing entry to the back.
            if !attester_indices.contains(&validator_index) {
                attester_indices.insert(validator_index);
            }
        }
    }

    Ok(attester_indices.into_iter().collect())
}

/// Resolves validator indices to records. Order and duplicates are preserved.
pub fn boundary_attesters(
    state: &BeaconState,
    attester_indices: impl IntoIterator<Item = ValidatorIndex>,
) -> Result<Vec<&ValidatorRecord>> {
    attester_indices
        .into_iter()
        .map(|validator_index| get_validator(state, validator_index))
        .collect()
}

/// Sums effective balances of `attesters`.
///
/// Duplicates are counted as many times as they appear.
/// Deduplicate with [`boundary_attester_indices`] first.
/// Fails only if the sum does not fit in [`Gwei`].
pub fn boundary_attesting_balance<'validators>(
    config: &Config,
    attesters: impl IntoIterator<Item = &'validators ValidatorRecord>,
) -> Result<Gwei> {
    get_total_balance(config, attesters)
}

pub fn boundary_summary(config: &Config, state: &BeaconState) -> Result<BoundarySummary> {
    let epoch = compute_epoch_at_slot(config, state.slot);
    let boundary_slot = compute_epoch_boundary_slot(config, state.slot);
    let boundary_root = get_epoch_boundary_root(config, state)?;

    let window_attestations = epoch_attestations(config, state);
    let window_attestation_count = window_attestations.len();

    let boundary_attestations = boundary_attestations(config, state, window_attestations)?;
    let boundary_attestation_count = boundary_attestations.len();

    debug!(
        "selected boundary attestations \
         (slot: {}, epoch: {epoch}, boundary_slot: {boundary_slot}, \
         boundary_root: {boundary_root:?}, in_window: {window_attestation_count}, \
         matching_boundary: {boundary_attestation_count})",
        state.slot,
    );

    let attester_indices = boundary_attester_indices(state, boundary_attestations)?;
    let attesters = boundary_attesters(state, attester_indices.iter().copied())?;
    let attesting_balance = boundary_attesting_balance(config, attesters)?;
    let total_balance = get_total_balance(config, &state.validator_registry)?;

    debug!(
        "computed boundary attesting balance \
         (epoch: {epoch}, attesters: {}, attesting_balance: {attesting_balance}, \
         total_balance: {total_balance})",
        attester_indices.len(),
    );

    Ok(BoundarySummary {
        epoch,
        boundary_slot,
        boundary_root,
        window_attestation_count,
        boundary_attestation_count,
        attester_indices,
        attesting_balance,
        total_balance,
    })
}
