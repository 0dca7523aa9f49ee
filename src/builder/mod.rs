//! Extension build planning.
//!
//! Renders a [`BuildConfiguration`](crate::core::BuildConfiguration) into the
//! compiler and linker invocations that produce the `py_fp` module.

pub mod plan;
pub mod toolchain;

pub use plan::{BuildPlan, BuildPlanOutput, CompileStep};
pub use toolchain::{
    toolchain_for, CommandSpec, GccToolchain, MsvcToolchain, Toolchain, ToolchainPlatform,
};
