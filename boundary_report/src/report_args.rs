use core::{fmt::Display, num::NonZeroU64};
use std::path::PathBuf;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory as _, Error as ClapError, Parser, ValueEnum};
use itertools::Itertools as _;
use log::warn;
use types::{config::Config, primitives::Gwei};

const APPLICATION_NAME: &str = "boundary_report";

/// Summarizes epoch boundary attestations in a beacon state snapshot
#[derive(Parser)]
#[clap(display_name = APPLICATION_NAME, verbatim_doc_comment)]
pub struct ReportArgs {
    /// Name of the built-in configuration to use
    #[clap(long, value_enum)]
    network: Option<Network>,

    /// Load configuration from YAML_FILE
    #[clap(long, value_name = "YAML_FILE")]
    configuration_file: Option<PathBuf>,

    /// Override the number of slots per epoch
    #[clap(long, value_name = "SLOTS")]
    epoch_length: Option<NonZeroU64>,

    /// Override the maximum effective balance
    #[clap(long, value_name = "GWEI")]
    max_effective_balance: Option<Gwei>,

    /// Load the beacon state from JSON_FILE
    #[clap(long, value_name = "JSON_FILE")]
    state_file: PathBuf,
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum Network {
    #[default]
    Mainnet,
    Minimal,
}

impl Network {
    fn config(self) -> Config {
        match self {
            Self::Mainnet => Config::mainnet(),
            Self::Minimal => Config::minimal(),
        }
    }
}

pub struct ReportConfig {
    pub config: Config,
    pub state_file: PathBuf,
}

impl ReportArgs {
    pub fn try_into_config(self) -> Result<ReportConfig> {
        let Self {
            network,
            configuration_file,
            epoch_length,
            max_effective_balance,
            state_file,
        } = self;

        let mut config = match (network, configuration_file) {
            (network, Some(path)) => {
                // There's technically nothing wrong with this, but the user may have made a mistake.
                if network.is_some() {
                    warn!(
                        "both --network and --configuration-file specified; \
                         --configuration-file will take precedence",
                    );
                }

                let bytes = fs_err::read(path)?;
                serde_yaml::from_slice(bytes.as_slice())?
            }
            (network, None) => network.unwrap_or_default().config(),
        };

        let unknown = core::mem::take(&mut config.unknown);

        if !unknown.is_empty() {
            warn!(
                "unknown configuration variables: [{}]",
                unknown.keys().format(", "),
            );
        }

        if let Some(epoch_length) = epoch_length {
            config.epoch_length = epoch_length;
        }

        if let Some(max_effective_balance) = max_effective_balance {
            config.max_effective_balance = max_effective_balance;
        }

        config.validate()?;

        Ok(ReportConfig { config, state_file })
    }

    pub fn clap_error(message: impl Display) -> ClapError {
        Self::command().error(ErrorKind::ValueValidation, message)
    }
}
