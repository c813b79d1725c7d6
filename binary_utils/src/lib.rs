use std::io::Write as _;

use anyhow::Result;
use chrono::{Local, SecondsFormat};
use env_logger::{Builder, Env, WriteStyle};
use log::LevelFilter;

// Crates whose records are shown by default. Everything else is filtered out.
const LOGGING_CRATES: &[&str] = &["helper_functions", "transition_functions", "types"];

/// Installs `env_logger` as the global logger.
///
/// Records from `module_path` and the library crates are shown at `info` and above.
/// Directives in `RUST_LOG` are applied on top of the defaults.
pub fn initialize_logger(module_path: &str, always_write_style: bool) -> Result<()> {
    let mut builder = Builder::new();

    builder
        .filter_level(LevelFilter::Off)
        .filter_module(module_path, LevelFilter::Info)
        .filter_module(module_path!(), LevelFilter::Info);

    for crate_name in LOGGING_CRATES {
        builder.filter_module(crate_name, LevelFilter::Info);
    }

    builder
        .parse_env(Env::default())
        .format(|formatter, record| {
            let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Millis, true);
            let level_style = formatter.default_level_style(record.level());

            writeln!(
                formatter,
                "[{timestamp}] {level_style}{:<5}{level_style:#} {}: {}",
                record.level(),
                record.target(),
                record.args(),
            )
        });

    if always_write_style {
        builder.write_style(WriteStyle::Always);
    }

    builder.try_init()?;

    Ok(())
}
