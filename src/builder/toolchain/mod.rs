//! Toolchain abstraction for rendering a build configuration.
//!
//! A [`BuildConfiguration`] only lists flags. A toolchain turns those flags
//! into concrete compiler and linker invocations for one translation unit or
//! one module link.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::build_config::BuildConfiguration;
use crate::core::platform::{Os, TargetPlatform};

mod gcc;
mod msvc;

pub use gcc::GccToolchain;
pub use msvc::MsvcToolchain;

/// A command to execute, with program and arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// The program to run (e.g., "g++", "cl.exe")
    pub program: PathBuf,
    /// Command arguments
    pub args: Vec<String>,
}

impl CommandSpec {
    /// Create a new command spec.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        CommandSpec {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Add an argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments.
    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|a| a.into()));
        self
    }

    /// Whether an argument is present verbatim.
    pub fn has_arg(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            if arg.contains(' ') {
                write!(f, " \"{}\"", arg)?;
            } else {
                write!(f, " {}", arg)?;
            }
        }
        Ok(())
    }
}

/// The family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainPlatform {
    /// GCC (GNU Compiler Collection)
    Gcc,
    /// Apple Clang (macOS)
    AppleClang,
    /// Microsoft Visual C++
    Msvc,
}

impl ToolchainPlatform {
    /// Get the platform name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolchainPlatform::Gcc => "gcc",
            ToolchainPlatform::AppleClang => "apple-clang",
            ToolchainPlatform::Msvc => "msvc",
        }
    }
}

/// Trait for toolchain implementations.
///
/// Each toolchain knows how to spell the configuration for its compiler.
pub trait Toolchain: Send + Sync {
    /// Get the toolchain platform.
    fn platform(&self) -> ToolchainPlatform;

    /// Get the C++ compiler path.
    fn compiler_path(&self) -> &Path;

    /// Generate a compile command for one C++ source.
    fn compile_command(
        &self,
        source: &Path,
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec;

    /// Generate the link command producing a loadable module.
    fn link_module_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec;

    /// Get the object file extension.
    fn object_extension(&self) -> &str;
}

/// Pick the toolchain conventionally used on a platform.
///
/// Unknown platforms fall back to GCC.
pub fn toolchain_for(platform: &TargetPlatform) -> Box<dyn Toolchain> {
    match platform.os {
        Os::Windows => Box::new(MsvcToolchain::default()),
        Os::MacOs => Box::new(GccToolchain::new("clang++", ToolchainPlatform::AppleClang)),
        Os::Linux | Os::Other(_) => Box::new(GccToolchain::new("g++", ToolchainPlatform::Gcc)),
    }
}
