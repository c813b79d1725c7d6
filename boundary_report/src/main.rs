use std::{
    io::{self, Write as _},
    path::Path,
    process::ExitCode,
};

use anyhow::{Context as _, Result};
use clap::{Error as ClapError, Parser as _};
use log::{error, info};
use transition_functions::epoch_intermediates::{self, BoundarySummary};
use types::{beacon_state::BeaconState, config::Config};

use crate::report_args::{ReportArgs, ReportConfig};

mod report_args;

fn main() -> ExitCode {
    if let Err(error) = try_main() {
        error.downcast_ref().map(ClapError::exit);
        error!("{error:?}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    binary_utils::initialize_logger(module_path!(), cfg!(feature = "logger-always-write-style"))?;

    let ReportConfig { config, state_file } = ReportArgs::try_parse()?
        .try_into_config()
        .map_err(ReportArgs::clap_error)?;

    info!(
        "summarizing epoch boundary (configuration: {}, state file: {state_file:?})",
        config.config_name,
    );

    let summary = summarize_state_file(&config, &state_file)?;

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &summary)?;
    writeln!(stdout)?;

    Ok(())
}

fn load_state(path: &Path) -> Result<BeaconState> {
    let bytes = fs_err::read(path)?;

    serde_json::from_slice(bytes.as_slice())
        .with_context(|| format!("failed to parse beacon state in {}", path.display()))
}

fn summarize_state_file(config: &Config, path: &Path) -> Result<BoundarySummary> {
    let state = load_state(path)?;

    info!(
        "loaded beacon state (slot: {}, validators: {}, attestations: {})",
        state.slot,
        state.validator_registry.len(),
        state.latest_attestations.len(),
    );

    epoch_intermediates::boundary_summary(config, &state)
}
