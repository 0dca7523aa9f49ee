//! `fpdev commands` command: the build plan for the module

use anyhow::{Context, Result};

use super::{configuration_for, resolve_platform};
use crate::cli::CommandsArgs;
use fpdev::builder::{toolchain_for, BuildPlan};
use fpdev::core::ExtensionModule;
use fpdev::util::Config;

pub fn execute(args: CommandsArgs, config: &Config) -> Result<()> {
    let platform = resolve_platform(&args.platform)?;
    let out_dir = args.out_dir.unwrap_or_else(|| config.out_dir());

    let mut module = ExtensionModule::py_fp_with(
        &platform,
        &config.vendor_layout(),
        config.package_metadata(),
    );
    module.config = configuration_for(&platform, config);

    let toolchain = toolchain_for(&platform);
    tracing::debug!(
        "using {} toolchain ({})",
        toolchain.platform().as_str(),
        toolchain.compiler_path().display()
    );

    let plan = BuildPlan::new(&module, toolchain.as_ref(), &out_dir);

    if args.json {
        let json = serde_json::to_string_pretty(&plan.to_output())
            .context("failed to serialize build plan")?;
        println!("{}", json);
        return Ok(());
    }

    for cmd in plan.commands() {
        println!("{}", cmd);
    }

    Ok(())
}
