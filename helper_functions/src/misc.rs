use types::{
    config::Config,
    primitives::{Epoch, Slot},
};

#[must_use]
pub const fn compute_epoch_at_slot(config: &Config, slot: Slot) -> Epoch {
    slot / config.epoch_length.get()
}

/// First slot of the one-epoch lookback ending at `slot`.
///
/// Saturates at the genesis slot while the chain is younger than one epoch.
#[must_use]
pub const fn compute_epoch_window_start(config: &Config, slot: Slot) -> Slot {
    slot.saturating_sub(config.epoch_length.get())
}

/// Slot whose canonical block root boundary attestations must vote for.
///
/// This is the same slot the attestation window starts at.
#[must_use]
pub const fn compute_epoch_boundary_slot(config: &Config, slot: Slot) -> Slot {
    compute_epoch_window_start(config, slot)
}
