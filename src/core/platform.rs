//! Target platform descriptor.
//!
//! The build descriptor only looks at two facts about the target: the
//! operating system and the CPU architecture. Both are read once, either from
//! the running host or from the Cargo build-script environment, and are passed
//! around explicitly afterwards.
//!
//! This file is also compiled into `build.rs`, so it may only depend on `std`,
//! `serde` and `thiserror`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejected platform identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlatformError {
    #[error("operating system name is empty")]
    EmptyOs,

    #[error("architecture name is empty")]
    EmptyArch,
}

/// Operating system family of a build target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Os {
    /// macOS (`darwin` in most packaging tools)
    MacOs,
    /// Linux
    Linux,
    /// Windows (`win32` in most packaging tools)
    Windows,
    /// Anything else, kept lowercased
    Other(String),
}

impl Os {
    /// Parse an OS identifier.
    ///
    /// Accepts both Rust (`macos`, `windows`) and packaging-tool spellings
    /// (`darwin`, `win32`). Unknown names are preserved as [`Os::Other`].
    pub fn parse(name: &str) -> Os {
        let name = name.trim().to_ascii_lowercase();
        match name.as_str() {
            "macos" | "darwin" | "mac" | "osx" => Os::MacOs,
            "linux" => Os::Linux,
            "windows" | "win32" | "win" => Os::Windows,
            _ => Os::Other(name),
        }
    }

    /// Canonical name of the OS.
    pub fn as_str(&self) -> &str {
        match self {
            Os::MacOs => "macos",
            Os::Linux => "linux",
            Os::Windows => "windows",
            Os::Other(name) => name,
        }
    }
}

impl From<String> for Os {
    fn from(name: String) -> Self {
        Os::parse(&name)
    }
}

impl From<&str> for Os {
    fn from(name: &str) -> Self {
        Os::parse(name)
    }
}

impl From<Os> for String {
    fn from(os: Os) -> Self {
        os.as_str().to_string()
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operating system and CPU architecture of a build target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetPlatform {
    /// Operating system
    pub os: Os,
    /// CPU architecture as reported by the environment (`x86_64`, `arm64`, ...)
    pub arch: String,
}

impl TargetPlatform {
    /// Create a platform descriptor.
    pub fn new(os: Os, arch: impl Into<String>) -> Self {
        TargetPlatform {
            os,
            arch: arch.into(),
        }
    }

    /// Parse a platform from OS and architecture identifiers.
    pub fn parse(os: &str, arch: &str) -> Self {
        TargetPlatform::new(Os::parse(os), arch.trim())
    }

    /// Parse a platform, rejecting blank identifiers.
    ///
    /// Unknown but non-empty names are accepted; they simply map to
    /// [`Os::Other`].
    pub fn try_parse(os: &str, arch: &str) -> Result<Self, PlatformError> {
        if os.trim().is_empty() {
            return Err(PlatformError::EmptyOs);
        }
        if arch.trim().is_empty() {
            return Err(PlatformError::EmptyArch);
        }
        Ok(TargetPlatform::parse(os, arch))
    }

    /// Detect the host platform.
    pub fn host() -> Self {
        TargetPlatform::parse(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Read the target platform from a Cargo build-script environment.
    ///
    /// Returns `None` outside of a build script.
    pub fn from_cargo_env() -> Option<Self> {
        let os = std::env::var("CARGO_CFG_TARGET_OS").ok()?;
        let arch = std::env::var("CARGO_CFG_TARGET_ARCH").ok()?;
        Some(TargetPlatform::parse(&os, &arch))
    }

    /// Whether the architecture is 64-bit ARM.
    ///
    /// Packaging tools on Apple Silicon report `arm64`, Rust reports `aarch64`.
    pub fn is_arm64(&self) -> bool {
        self.arch.eq_ignore_ascii_case("arm64") || self.arch.eq_ignore_ascii_case("aarch64")
    }
}

impl fmt::Display for TargetPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}
