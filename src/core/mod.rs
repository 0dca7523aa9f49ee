//! Core data structures for fpdev.
//!
//! - Target platform descriptor
//! - Platform-conditional build configuration
//! - Extension module descriptor and package metadata
//! - Cargo directives for linking the vendor library

pub mod build_config;
pub mod cargo;
pub mod extension;
pub mod platform;

pub use build_config::{BuildConfiguration, Define, VendorLayout, VendorLinkage};
pub use cargo::CargoDirectives;
pub use extension::{ExtensionModule, PackageLayout, PackageMetadata};
pub use platform::{Os, PlatformError, TargetPlatform};
