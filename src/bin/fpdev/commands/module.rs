//! `fpdev module` command

use anyhow::{Context, Result};

use super::{configuration_for, resolve_platform};
use crate::cli::ModuleArgs;
use fpdev::core::{ExtensionModule, PackageMetadata};
use fpdev::util::Config;

pub fn execute(args: ModuleArgs, config: &Config) -> Result<()> {
    let platform = resolve_platform(&args.platform)?;

    let metadata = if args.legacy {
        PackageMetadata::v1_0_0()
    } else {
        config.package_metadata()
    };

    let mut module = ExtensionModule::py_fp_with(&platform, &config.vendor_layout(), metadata);
    module.config = configuration_for(&platform, config);

    let json = module
        .to_json()
        .context("failed to serialize module descriptor")?;
    println!("{}", json);

    Ok(())
}
