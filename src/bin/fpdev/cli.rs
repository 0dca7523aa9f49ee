//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// fpdev - build settings for the py_fp FrontPanel extension
#[derive(Parser)]
#[command(name = "fpdev")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.fpdev and .fpdev
    #[arg(long, global = true, env = "FPDEV_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show compile/link flags for a platform
    Flags(FlagsArgs),

    /// Print the extension module descriptor as JSON
    Module(ModuleArgs),

    /// Print the compiler and linker commands building the module
    Commands(CommandsArgs),

    /// Print cargo build-script directives linking okFrontPanel
    Cargo(CargoArgs),
}

/// Target platform selection shared by all commands.
#[derive(Args, Clone, Default)]
pub struct PlatformArgs {
    /// Target operating system (defaults to the host)
    #[arg(long)]
    pub os: Option<String>,

    /// Target architecture (defaults to the host)
    #[arg(long)]
    pub arch: Option<String>,
}

#[derive(Args)]
pub struct FlagsArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Show compile flags only
    #[arg(long, conflicts_with = "link")]
    pub compile: bool,

    /// Show link flags only
    #[arg(long)]
    pub link: bool,

    /// Print the build configuration as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ModuleArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Use the 1.0.0 package metadata
    #[arg(long)]
    pub legacy: bool,
}

#[derive(Args)]
pub struct CommandsArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,

    /// Output directory for objects and the module
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print the commands as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct CargoArgs {
    #[command(flatten)]
    pub platform: PlatformArgs,
}
