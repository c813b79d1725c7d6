use anyhow::{bail, ensure, Result};
use tap::Pipe as _;
use types::{
    beacon_state::BeaconState,
    bitfield::ParticipationBitfield,
    config::Config,
    containers::{AttestationData, ValidatorRecord},
    primitives::{Gwei, Shard, Slot, ValidatorIndex, H256},
};

use crate::{error::Error, misc};

/// Looks up the canonical block root recorded for `slot`.
///
/// `recent_block_roots` is treated as a ring buffer, so `slot` is reduced modulo its length.
/// Callers are responsible for only asking about slots the history still covers.
pub fn get_block_root_at_slot(state: &BeaconState, slot: Slot) -> Result<H256> {
    let roots = state.recent_block_roots.as_slice();

    ensure!(!roots.is_empty(), Error::MissingBlockRoot);

    let length = u64::try_from(roots.len())?;
    let index = usize::try_from(slot % length)?;

    Ok(roots[index])
}

pub fn get_epoch_boundary_root(config: &Config, state: &BeaconState) -> Result<H256> {
    let boundary_slot = misc::compute_epoch_boundary_slot(config, state.slot);
    get_block_root_at_slot(state, boundary_slot)
}

/// Returns the committee assigned to `shard` at `slot`.
///
/// The per-slot list of committees is short, so it is scanned linearly.
pub fn beacon_committee(
    state: &BeaconState,
    slot: Slot,
    shard: Shard,
) -> Result<&[ValidatorIndex]> {
    let shard_committee = slot
        .checked_sub(state.committees_start_slot)
        .and_then(|offset| usize::try_from(offset).ok())
        .and_then(|offset| state.committees_by_slot.get(offset))
        .and_then(|shard_committees| {
            shard_committees
                .iter()
                .find(|shard_committee| shard_committee.shard == shard)
        });

    let Some(shard_committee) = shard_committee else {
        bail!(Error::CommitteeNotFound { slot, shard });
    };

    Ok(shard_committee.committee.as_slice())
}

/// Yields members of the attestation's committee whose participation bits are set.
///
/// Indices are yielded in committee order. Padding bits past the end of the committee are ignored.
/// A bitfield shorter than the committee is treated as if the missing bits were unset.
pub fn get_attesting_indices<'all>(
    state: &'all BeaconState,
    attestation_data: AttestationData,
    participation_bitfield: &'all ParticipationBitfield,
) -> Result<impl Iterator<Item = ValidatorIndex> + 'all> {
    let committee = beacon_committee(state, attestation_data.slot, attestation_data.shard)?;

    participation_bitfield
        .bits()
        .zip(committee)
        .filter_map(|(present, validator_index)| present.then_some(*validator_index))
        .pipe(Ok)
}

pub fn get_validator(state: &BeaconState, index: ValidatorIndex) -> Result<&ValidatorRecord> {
    let registry = state.validator_registry.as_slice();

    let Some(validator) = usize::try_from(index)
        .ok()
        .and_then(|position| registry.get(position))
    else {
        bail!(Error::IndexOutOfRange {
            index,
            registry_length: registry.len(),
        });
    };

    Ok(validator)
}

#[must_use]
pub fn effective_balance(config: &Config, validator: &ValidatorRecord) -> Gwei {
    validator.balance.min(config.max_effective_balance)
}

/// Sums effective balances. Every validator is capped independently.
pub fn get_total_balance<'validators>(
    config: &Config,
    validators: impl IntoIterator<Item = &'validators ValidatorRecord>,
) -> Result<Gwei> {
    validators
        .into_iter()
        .map(|validator| effective_balance(config, validator))
        .try_fold(0, |total: Gwei, balance| {
            total.checked_add(balance).ok_or(Error::BalanceOverflow)
        })
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use itertools::Itertools as _;
    use test_case::test_case;
    use types::containers::ShardCommittee;

    use super::*;

    fn roots(count: u8) -> Vec<H256> {
        (0..count).map(H256::repeat_byte).collect()
    }

    fn state_with_committees(
        committees_start_slot: Slot,
        committees_by_slot: Vec<Vec<ShardCommittee>>,
    ) -> BeaconState {
        BeaconState {
            committees_start_slot,
            committees_by_slot,
            ..BeaconState::default()
        }
    }

    fn shard_committee(shard: Shard, committee: impl IntoIterator<Item = u64>) -> ShardCommittee {
        ShardCommittee {
            shard,
            committee: committee.into_iter().collect(),
        }
    }

    fn assert_committee_not_found(result: Result<&[ValidatorIndex]>, slot: Slot, shard: Shard) {
        let error = result.expect_err("committee lookup should fail");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::CommitteeNotFound {
                slot: actual_slot,
                shard: actual_shard,
            }) if *actual_slot == slot && *actual_shard == shard,
        ));
    }

    #[test_case(0, 0)]
    #[test_case(5, 5)]
    #[test_case(63, 63)]
    #[test_case(64, 0)]
    #[test_case(130, 2)]
    fn block_root_at_slot_wraps_around_history(slot: Slot, expected_index: u8) -> Result<()> {
        let state = BeaconState {
            recent_block_roots: roots(64),
            ..BeaconState::default()
        };

        assert_eq!(
            get_block_root_at_slot(&state, slot)?,
            H256::repeat_byte(expected_index),
        );

        Ok(())
    }

    #[test]
    fn block_root_at_slot_fails_without_history() {
        let error = get_block_root_at_slot(&BeaconState::default(), 0)
            .expect_err("there are no block roots to look up");

        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::MissingBlockRoot)));
    }

    #[test_case(10, 0)]
    #[test_case(64, 0)]
    #[test_case(100, 36)]
    fn epoch_boundary_root_is_root_one_epoch_back(slot: Slot, expected_index: u8) -> Result<()> {
        let state = BeaconState {
            slot,
            recent_block_roots: roots(64),
            ..BeaconState::default()
        };

        assert_eq!(
            get_epoch_boundary_root(&Config::mainnet(), &state)?,
            H256::repeat_byte(expected_index),
        );

        Ok(())
    }

    #[test]
    fn beacon_committee_scans_shards_in_slot() -> Result<()> {
        let state = state_with_committees(
            0,
            vec![
                vec![shard_committee(1, [0, 1])],
                vec![shard_committee(7, [2, 3]), shard_committee(3, [4, 5, 6])],
            ],
        );

        assert_eq!(beacon_committee(&state, 0, 1)?, [0, 1]);
        assert_eq!(beacon_committee(&state, 1, 3)?, [4, 5, 6]);
        assert_eq!(beacon_committee(&state, 1, 7)?, [2, 3]);

        Ok(())
    }

    #[test]
    fn beacon_committee_is_offset_by_committees_start_slot() -> Result<()> {
        let state = state_with_committees(
            64,
            vec![vec![shard_committee(0, [9])], vec![shard_committee(0, [8])]],
        );

        assert_eq!(beacon_committee(&state, 64, 0)?, [9]);
        assert_eq!(beacon_committee(&state, 65, 0)?, [8]);

        assert_committee_not_found(beacon_committee(&state, 63, 0), 63, 0);
        assert_committee_not_found(beacon_committee(&state, 66, 0), 66, 0);

        Ok(())
    }

    #[test]
    fn beacon_committee_fails_for_unknown_shard() {
        let state = state_with_committees(0, vec![vec![shard_committee(100, 0..10)]]);

        assert_committee_not_found(beacon_committee(&state, 0, 99), 0, 99);
    }

    #[test_case(&[0b1000_0000, 0b0100_0000], &[0, 9]; "bits in both bytes")]
    #[test_case(&[0b0000_0000, 0b0011_1111], &[]; "padding bits past committee")]
    #[test_case(&[0b0000_0001], &[7]; "bitfield shorter than committee")]
    #[test_case(&[], &[]; "empty bitfield")]
    fn attesting_indices_follow_committee_order(
        bytes: &[u8],
        expected_positions: &[usize],
    ) -> Result<()> {
        // Committee members are offset so positions and validator indices differ.
        let state = state_with_committees(0, vec![vec![shard_committee(2, 100..110)]]);

        let data = AttestationData {
            slot: 0,
            shard: 2,
            ..AttestationData::default()
        };

        let bitfield = ParticipationBitfield::from(bytes);
        let indices = get_attesting_indices(&state, data, &bitfield)?.collect_vec();

        let expected_indices = expected_positions
            .iter()
            .map(|position| u64::try_from(*position).map(|position| 100 + position))
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(indices, expected_indices);

        Ok(())
    }

    #[test]
    fn attesting_indices_propagate_missing_committee() {
        let state = state_with_committees(0, vec![vec![shard_committee(2, 0..8)]]);

        let data = AttestationData {
            slot: 1,
            shard: 2,
            ..AttestationData::default()
        };

        let bitfield = ParticipationBitfield::from([0xff]);

        let Err(error) = get_attesting_indices(&state, data, &bitfield) else {
            panic!("slot 1 has no committees");
        };

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::CommitteeNotFound { slot: 1, shard: 2 }),
        ));
    }

    #[test]
    fn get_validator_fails_past_registry_end() -> Result<()> {
        let state = BeaconState {
            validator_registry: vec![ValidatorRecord::default(); 3],
            ..BeaconState::default()
        };

        get_validator(&state, 2)?;

        let error = get_validator(&state, 3).expect_err("registry has 3 validators");

        assert!(matches!(
            error.downcast_ref::<Error>(),
            Some(Error::IndexOutOfRange {
                index: 3,
                registry_length: 3,
            }),
        ));

        Ok(())
    }

    #[test_case(0, 0)]
    #[test_case(31_999_999_999, 31_999_999_999)]
    #[test_case(32_000_000_000, 32_000_000_000)]
    #[test_case(32_000_000_001, 32_000_000_000)]
    #[test_case(Gwei::MAX, 32_000_000_000)]
    fn effective_balance_is_capped(balance: Gwei, expected: Gwei) {
        let validator = ValidatorRecord {
            balance,
            ..ValidatorRecord::default()
        };

        assert_eq!(effective_balance(&Config::mainnet(), &validator), expected);
    }

    #[test]
    fn total_balance_uses_configured_cap() -> Result<()> {
        let config = Config {
            max_effective_balance: 10,
            ..Config::minimal()
        };

        let validators = [5, 10, 15]
            .map(|balance| ValidatorRecord {
                balance,
                ..ValidatorRecord::default()
            });

        assert_eq!(get_total_balance(&config, &validators)?, 25);
        assert_eq!(get_total_balance(&config, [])?, 0);

        Ok(())
    }

    #[test]
    fn total_balance_fails_on_overflow_instead_of_panicking() {
        let config = Config {
            max_effective_balance: Gwei::MAX,
            ..Config::mainnet()
        };

        let validator = ValidatorRecord {
            balance: Gwei::MAX,
            ..ValidatorRecord::default()
        };

        let error = get_total_balance(&config, [&validator, &validator])
            .expect_err("two maximal balances do not fit in a u64");

        assert!(matches!(error.downcast_ref::<Error>(), Some(Error::BalanceOverflow)));
    }
}
