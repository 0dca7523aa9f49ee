//! Build plan for the extension module.
//!
//! One compile step per source followed by a single link step. The plan is
//! only rendered, never executed; running it is left to the packaging tool.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::builder::toolchain::{CommandSpec, Toolchain};
use crate::core::extension::ExtensionModule;

/// A compile step.
#[derive(Debug, Clone)]
pub struct CompileStep {
    pub source: PathBuf,
    pub object: PathBuf,
    pub command: CommandSpec,
}

/// Ordered commands producing the module artifact.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub compile: Vec<CompileStep>,
    pub link: CommandSpec,
    pub artifact: PathBuf,
}

/// JSON-friendly rendering of a plan.
#[derive(Debug, Serialize)]
pub struct BuildPlanOutput {
    pub artifact: String,
    pub commands: Vec<Vec<String>>,
}

impl BuildPlan {
    /// Plan the build of `module` with `toolchain`, placing outputs in `out_dir`.
    pub fn new(module: &ExtensionModule, toolchain: &dyn Toolchain, out_dir: &Path) -> Self {
        let mut compile = Vec::with_capacity(module.sources.len());

        for source in &module.sources {
            let stem = source
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| module.name.clone());
            let object = out_dir.join(format!("{}.{}", stem, toolchain.object_extension()));
            let command = toolchain.compile_command(source, &object, &module.config);

            tracing::debug!("planned compile of {}", source.display());
            compile.push(CompileStep {
                source: source.clone(),
                object,
                command,
            });
        }

        let objects: Vec<PathBuf> = compile.iter().map(|s| s.object.clone()).collect();
        let artifact = out_dir.join(module.artifact_file_name());
        let link = toolchain.link_module_command(&objects, &artifact, &module.config);

        BuildPlan {
            compile,
            link,
            artifact,
        }
    }

    /// All commands in execution order.
    pub fn commands(&self) -> impl Iterator<Item = &CommandSpec> {
        self.compile.iter().map(|s| &s.command).chain(std::iter::once(&self.link))
    }

    /// Convert to the JSON output form.
    pub fn to_output(&self) -> BuildPlanOutput {
        BuildPlanOutput {
            artifact: self.artifact.display().to_string(),
            commands: self
                .commands()
                .map(|cmd| {
                    std::iter::once(cmd.program.display().to_string())
                        .chain(cmd.args.iter().cloned())
                        .collect()
                })
                .collect(),
        }
    }
}
