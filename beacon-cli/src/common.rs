use anyhow::{Context, Result};
use clap::{Arg, ArgMatches};

use beacon_core::BeaconConfig;

pub const CONFIG_ARG: &str = "config";

pub fn config_arg() -> Arg {
    Arg::new(CONFIG_ARG)
        .long("config")
        .short('c')
        .help("TOML config file; BEACON_* environment variables override it")
}

/// Defaults, then the config file if given, then environment overrides.
pub fn load_config(matches: &ArgMatches) -> Result<BeaconConfig> {
    let config = match matches.get_one::<String>(CONFIG_ARG) {
        Some(path) => BeaconConfig::from_file(path)
            .with_context(|| format!("Failed to read config file {}", path))?,
        None => BeaconConfig::default(),
    };
    config
        .with_env_overrides()
        .context("Invalid BEACON_* environment settings")
}
