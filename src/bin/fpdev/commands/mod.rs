//! Command implementations

pub mod cargo;
pub mod flags;
pub mod module;
pub mod plan;

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::PlatformArgs;
use fpdev::core::{BuildConfiguration, TargetPlatform};
use fpdev::util::config::{self, Config};

/// Load the explicit config file, or merge the global and project ones.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        return Config::load(path);
    }

    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let global = config::global_config_path();
    Ok(config::load_config(
        global.as_deref(),
        &config::project_config_path(&cwd),
    ))
}

/// Resolve `--os`/`--arch`, filling missing values from the host.
pub fn resolve_platform(args: &PlatformArgs) -> Result<TargetPlatform> {
    let host = TargetPlatform::host();
    let os = args.os.clone().unwrap_or_else(|| host.os.to_string());
    let arch = args.arch.clone().unwrap_or(host.arch);

    let platform = TargetPlatform::try_parse(&os, &arch)
        .with_context(|| format!("invalid target platform `{}`/`{}`", os, arch))?;
    tracing::debug!("target platform: {}", platform);
    Ok(platform)
}

/// Derive the configuration, warning when the platform is unsupported.
pub fn configuration_for(platform: &TargetPlatform, config: &Config) -> BuildConfiguration {
    let build = BuildConfiguration::for_platform_with(platform, &config.vendor_layout());
    if build.is_empty() {
        tracing::warn!(
            "unsupported operating system `{}`: no compile or link flags",
            platform.os
        );
    }
    build
}
