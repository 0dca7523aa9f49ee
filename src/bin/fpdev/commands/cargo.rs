//! `fpdev cargo` command

use anyhow::{Context, Result};

use super::{configuration_for, resolve_platform};
use crate::cli::CargoArgs;
use fpdev::core::CargoDirectives;
use fpdev::util::Config;

pub fn execute(args: CargoArgs, config: &Config) -> Result<()> {
    let platform = resolve_platform(&args.platform)?;
    let build = configuration_for(&platform, config);

    let directives = CargoDirectives::from_config(&build);
    directives
        .emit(std::io::stdout().lock())
        .context("failed to write cargo directives")?;

    Ok(())
}
