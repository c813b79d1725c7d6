use core::num::NonZeroU64;
use std::{borrow::Cow, collections::BTreeMap};

use nonzero_ext::nonzero;
use serde::{de::IgnoredAny, Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr, PickFirst};
use thiserror::Error;

use crate::primitives::Gwei;

/// Protocol parameters that affect epoch boundary processing.
///
/// Values are passed by reference to every function that needs them.
/// Nothing reads them from global state, so tests are free to use custom values.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, rename_all = "SCREAMING_SNAKE_CASE")]
pub struct Config {
    // Meta
    pub config_name: Cow<'static, str>,

    // Time parameters
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub epoch_length: NonZeroU64,

    // Gwei values
    #[serde_as(as = "PickFirst<(_, DisplayFromStr)>")]
    pub max_effective_balance: Gwei,

    // Other unknown variables
    //
    // Collect unknown variables in a map so binaries can log a warning about them.
    #[serde(flatten, skip_serializing)]
    pub unknown: BTreeMap<String, IgnoredAny>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            // Use `default` as the default `config_name` and override it in `Config::mainnet`.
            config_name: Cow::Borrowed("default"),
            epoch_length: nonzero!(64_u64),
            max_effective_balance: 32_000_000_000,
            unknown: BTreeMap::new(),
        }
    }
}

impl Config {
    #[must_use]
    pub fn mainnet() -> Self {
        Self {
            config_name: Cow::Borrowed("mainnet"),
            ..Self::default()
        }
    }

    /// Shorter epochs for tests and local networks.
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            config_name: Cow::Borrowed("minimal"),
            epoch_length: nonzero!(8_u64),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.config_name.is_empty() {
            return Err(Error::NameEmpty);
        }

        for character in self.config_name.chars() {
            if !matches!(character, 'a'..='z' | '0'..='9' | '-') {
                return Err(Error::NameContainsIllegalCharacters);
            }
        }

        if self.max_effective_balance == 0 {
            return Err(Error::MaxEffectiveBalanceZero);
        }

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration name is empty")]
    NameEmpty,
    #[error("configuration name contains illegal characters")]
    NameContainsIllegalCharacters,
    #[error("maximum effective balance is zero")]
    MaxEffectiveBalanceZero,
}

#[expect(
    clippy::needless_pass_by_value,
    reason = "Refactoring worsens readability, which is more important in tests."
)]
