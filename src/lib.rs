//! fpdev - build descriptor and device layer for the `py_fp` extension
//!
//! This crate maps a target platform onto the compiler and linker settings
//! needed to build the `py_fp` module against the okFrontPanel SDK, and
//! provides the device session the module exposes.

pub mod builder;
pub mod core;
pub mod device;
pub mod util;

/// Test utilities and mocks for fpdev unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory FrontPanel backend.
#[cfg(test)]
pub mod test_support;

pub use core::{
    build_config::BuildConfiguration, extension::ExtensionModule, platform::TargetPlatform,
};

pub use device::{FpDevice, Session};
pub use util::config::Config;
