//! GCC/Clang toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::build_config::BuildConfiguration;

use super::{CommandSpec, Toolchain, ToolchainPlatform};

/// GCC/Clang toolchain (Unix-like systems).
#[derive(Debug, Clone)]
pub struct GccToolchain {
    /// Path to the C++ compiler, also used as the link driver
    pub cxx: PathBuf,
    /// Compiler family (gcc, apple-clang)
    pub family: ToolchainPlatform,
}

impl GccToolchain {
    /// Create a new GCC-style toolchain.
    pub fn new(cxx: impl Into<PathBuf>, family: ToolchainPlatform) -> Self {
        GccToolchain {
            cxx: cxx.into(),
            family,
        }
    }
}

impl Toolchain for GccToolchain {
    fn platform(&self) -> ToolchainPlatform {
        self.family
    }

    fn compiler_path(&self) -> &Path {
        &self.cxx
    }

    fn compile_command(
        &self,
        source: &Path,
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx);

        // Compile only, position independent for the shared module
        cmd = cmd.arg("-c").arg("-fPIC");

        // Include directories
        for dir in &config.include_dirs {
            cmd = cmd.arg(format!("-I{}", dir));
        }

        // Defines
        for define in &config.defines {
            cmd = cmd.arg(define.to_gnu_flag());
        }

        cmd = cmd.args(config.compile_flags.iter().cloned());

        cmd = cmd.arg(source.display().to_string());
        cmd = cmd.arg("-o");
        cmd = cmd.arg(output.display().to_string());

        cmd
    }

    fn link_module_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cxx);

        cmd = cmd.arg("-shared");

        // Runtime symbols are resolved when the host process loads the module
        if self.family == ToolchainPlatform::AppleClang {
            cmd = cmd.arg("-undefined").arg("dynamic_lookup");
        }

        cmd = cmd.arg("-o");
        cmd = cmd.arg(output.display().to_string());

        for obj in objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        // Libraries must follow the objects that reference them
        cmd = cmd.args(config.link_flags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "o"
    }
}
