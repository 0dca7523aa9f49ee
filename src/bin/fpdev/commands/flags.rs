//! `fpdev flags` command

use anyhow::{Context, Result};

use super::{configuration_for, resolve_platform};
use crate::cli::FlagsArgs;
use fpdev::core::Os;
use fpdev::util::Config;

pub fn execute(args: FlagsArgs, config: &Config) -> Result<()> {
    let platform = resolve_platform(&args.platform)?;
    let build = configuration_for(&platform, config);

    if args.json {
        let json = serde_json::to_string_pretty(&build)
            .context("failed to serialize build configuration")?;
        println!("{}", json);
        return Ok(());
    }

    let msvc = platform.os == Os::Windows;

    if !args.link {
        println!("# Compile flags for `{}`:", platform);

        for dir in &build.include_dirs {
            if msvc {
                println!("  /I{}", dir);
            } else {
                println!("  -I{}", dir);
            }
        }

        for define in &build.defines {
            if msvc {
                println!("  {}", define.to_msvc_flag());
            } else {
                println!("  {}", define.to_gnu_flag());
            }
        }

        for flag in &build.compile_flags {
            println!("  {}", flag);
        }
    }

    if !args.compile && !args.link {
        println!();
    }

    if !args.compile {
        println!("# Link flags for `{}`:", platform);

        for flag in &build.link_flags {
            println!("  {}", flag);
        }
    }

    Ok(())
}
