//! MSVC toolchain implementation.

use std::path::{Path, PathBuf};

use crate::core::build_config::BuildConfiguration;

use super::{CommandSpec, Toolchain, ToolchainPlatform};

/// MSVC toolchain (Windows).
#[derive(Debug, Clone)]
pub struct MsvcToolchain {
    /// Path to cl.exe (compiler)
    pub cl: PathBuf,
    /// Path to link.exe (linker)
    pub link: PathBuf,
}

impl MsvcToolchain {
    /// Create a new MSVC toolchain.
    pub fn new(cl: PathBuf, link: PathBuf) -> Self {
        MsvcToolchain { cl, link }
    }
}

impl Default for MsvcToolchain {
    fn default() -> Self {
        MsvcToolchain::new(PathBuf::from("cl.exe"), PathBuf::from("link.exe"))
    }
}

impl Toolchain for MsvcToolchain {
    fn platform(&self) -> ToolchainPlatform {
        ToolchainPlatform::Msvc
    }

    fn compiler_path(&self) -> &Path {
        &self.cl
    }

    fn compile_command(
        &self,
        source: &Path,
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.cl);

        // Quiet logo, compile only, force C++ with standard exception model
        cmd = cmd.arg("/nologo").arg("/c").arg("/TP").arg("/EHsc");

        for dir in &config.include_dirs {
            cmd = cmd.arg(format!("/I{}", dir));
        }

        for define in &config.defines {
            cmd = cmd.arg(define.to_msvc_flag());
        }

        cmd = cmd.args(config.compile_flags.iter().cloned());

        cmd = cmd.arg(source.display().to_string());
        cmd = cmd.arg(format!("/Fo{}", output.display()));

        cmd
    }

    fn link_module_command(
        &self,
        objects: &[PathBuf],
        output: &Path,
        config: &BuildConfiguration,
    ) -> CommandSpec {
        let mut cmd = CommandSpec::new(&self.link);

        cmd = cmd.arg("/nologo");
        cmd = cmd.arg("/DLL");
        cmd = cmd.arg(format!("/OUT:{}", output.display()));

        for obj in objects {
            cmd = cmd.arg(obj.display().to_string());
        }

        cmd = cmd.args(config.link_flags.iter().cloned());

        cmd
    }

    fn object_extension(&self) -> &str {
        "obj"
    }
}
