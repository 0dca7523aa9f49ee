//! Platform-conditional build configuration.
//!
//! Maps a [`TargetPlatform`] to the include directories, defines, compile
//! flags and link flags needed to build the extension sources against the
//! okFrontPanel SDK shipped under the vendor directory.
//!
//! The mapping is a pure function of the platform and the [`VendorLayout`].
//! Nothing here touches the filesystem; a missing SDK is reported by the
//! linker, not by this module.
//!
//! This file is also compiled into `build.rs`, so it may only depend on `std`,
//! `serde` and the sibling `platform` module.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::platform::{Os, TargetPlatform};

/// C++17 flag for GCC and Clang.
pub const GNU_CXX17_FLAG: &str = "-std=c++17";

/// C++17 flag for MSVC.
pub const MSVC_CXX17_FLAG: &str = "/std:c++17";

/// A preprocessor define.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Define {
    /// Simple flag: -DFOO
    Flag(String),
    /// Key-value: -DFOO=bar
    KeyValue { name: String, value: String },
}

impl Define {
    /// Create a simple flag define.
    pub fn flag(name: impl Into<String>) -> Self {
        Define::Flag(name.into())
    }

    /// Create a key-value define.
    pub fn key_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Define::KeyValue {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Get the define name.
    pub fn name(&self) -> &str {
        match self {
            Define::Flag(n) => n,
            Define::KeyValue { name, .. } => name,
        }
    }

    /// Get the define value, if any.
    pub fn value(&self) -> Option<&str> {
        match self {
            Define::Flag(_) => None,
            Define::KeyValue { value, .. } => Some(value),
        }
    }

    /// Convert to GCC/Clang flag format.
    pub fn to_gnu_flag(&self) -> String {
        format!("-D{}", self)
    }

    /// Convert to MSVC flag format.
    pub fn to_msvc_flag(&self) -> String {
        format!("/D{}", self)
    }
}

impl fmt::Display for Define {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Define::Flag(name) => write!(f, "{}", name),
            Define::KeyValue { name, value } => write!(f, "{}={}", name, value),
        }
    }
}

/// Where the vendor SDK lives relative to the build directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorLayout {
    /// SDK root; doubles as the include directory
    pub root: String,
    /// Library name without prefix or extension
    pub library: String,
    /// Runtime library search path embedded on platforms that use one
    pub runtime_search_path: String,
}

impl Default for VendorLayout {
    fn default() -> Self {
        VendorLayout {
            root: "frontpanel".to_string(),
            library: "okFrontPanel".to_string(),
            runtime_search_path: "./".to_string(),
        }
    }
}

impl VendorLayout {
    /// Library search path for a platform, or `None` for unsupported ones.
    pub fn search_path(&self, platform: &TargetPlatform) -> Option<String> {
        match platform.os {
            Os::MacOs if platform.is_arm64() => Some(format!("{}/mac/arm64/", self.root)),
            Os::MacOs => Some(format!("{}/mac", self.root)),
            Os::Linux => Some(format!("{}/linux", self.root)),
            Os::Windows => Some(format!("{}/win/x64", self.root)),
            Os::Other(_) => None,
        }
    }

    /// Whether the platform gets an embedded runtime search path.
    pub fn embeds_runtime_search_path(platform: &TargetPlatform) -> bool {
        match platform.os {
            Os::MacOs => platform.is_arm64(),
            Os::Linux => true,
            Os::Windows | Os::Other(_) => false,
        }
    }
}

/// Structured view of how the vendor library is linked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorLinkage {
    /// Library name (`okFrontPanel`)
    pub library: String,
    /// Directory searched for the library at link time
    pub search_path: String,
    /// Runtime search path embedded into the module, if any
    pub runtime_search_path: Option<String>,
}

/// Compiler and linker parameters for one target platform.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildConfiguration {
    /// Include directories
    pub include_dirs: Vec<String>,
    /// Preprocessor defines
    pub defines: Vec<Define>,
    /// Extra compiler flags
    pub compile_flags: Vec<String>,
    /// Extra linker flags
    pub link_flags: Vec<String>,
    /// Vendor library linkage, `None` on unsupported platforms
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linkage: Option<VendorLinkage>,
}

impl BuildConfiguration {
    /// Derive the configuration for a platform using the default layout.
    pub fn for_platform(platform: &TargetPlatform) -> Self {
        Self::for_platform_with(platform, &VendorLayout::default())
    }

    /// Derive the configuration for the host platform.
    pub fn for_host() -> Self {
        Self::for_platform(&TargetPlatform::host())
    }

    /// Derive the configuration for a platform and vendor layout.
    ///
    /// Unknown operating systems get include directories only; the compiler
    /// will then fail on its own.
    pub fn for_platform_with(platform: &TargetPlatform, layout: &VendorLayout) -> Self {
        let mut config = BuildConfiguration {
            include_dirs: vec![layout.root.clone()],
            ..Default::default()
        };

        let Some(search_path) = layout.search_path(platform) else {
            return config;
        };

        let runtime_search_path = VendorLayout::embeds_runtime_search_path(platform)
            .then(|| layout.runtime_search_path.clone());

        match platform.os {
            Os::MacOs => {
                config.compile_flags.push(GNU_CXX17_FLAG.to_string());
                config.link_flags.push(format!("-l{}", layout.library));
                config.link_flags.push(format!("-L{}", search_path));
                if let Some(ref rpath) = runtime_search_path {
                    // ld64 takes the rpath as a separate argument
                    config.link_flags.push("-Wl,-rpath".to_string());
                    config.link_flags.push(rpath.clone());
                }
            }
            Os::Linux => {
                config.compile_flags.push(GNU_CXX17_FLAG.to_string());
                config.link_flags.push(format!("-l{}", layout.library));
                config.link_flags.push(format!("-L{}", search_path));
                if let Some(ref rpath) = runtime_search_path {
                    config.link_flags.push(format!("-Wl,-rpath={}", rpath));
                }
            }
            Os::Windows => {
                config.defines.push(Define::key_value("WIN32", "1"));
                config.compile_flags.push(MSVC_CXX17_FLAG.to_string());
                config.link_flags.push(format!("/LIBPATH:{}", search_path));
            }
            Os::Other(_) => return config,
        }

        config.linkage = Some(VendorLinkage {
            library: layout.library.clone(),
            search_path,
            runtime_search_path,
        });

        config
    }

    /// Whether no flags or defines were selected.
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty() && self.compile_flags.is_empty() && self.link_flags.is_empty()
    }

    /// Vendor linkage, if the platform is supported.
    pub fn linkage(&self) -> Option<&VendorLinkage> {
        self.linkage.as_ref()
    }

    /// Look up a define by name.
    pub fn define(&self, name: &str) -> Option<&Define> {
        self.defines.iter().find(|d| d.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(os: &str, arch: &str) -> BuildConfiguration {
        BuildConfiguration::for_platform(&TargetPlatform::parse(os, arch))
    }

    #[test]
    fn test_macos_arm64() {
        let cfg = config("darwin", "arm64");
        assert_eq!(cfg.compile_flags, vec!["-std=c++17"]);
        assert_eq!(
            cfg.link_flags,
            vec!["-lokFrontPanel", "-Lfrontpanel/mac/arm64/", "-Wl,-rpath", "./"]
        );
        assert!(cfg.defines.is_empty());
        assert_eq!(cfg.include_dirs, vec!["frontpanel"]);
    }

    #[test]
    fn test_macos_aarch64_matches_arm64() {
        assert_eq!(config("macos", "aarch64"), config("darwin", "arm64"));
    }

    #[test]
    fn test_macos_x86_64() {
        let cfg = config("darwin", "x86_64");
        assert_eq!(cfg.compile_flags, vec!["-std=c++17"]);
        assert_eq!(cfg.link_flags, vec!["-lokFrontPanel", "-Lfrontpanel/mac"]);
        assert!(!cfg.link_flags.iter().any(|f| f.contains("rpath")));
        assert_eq!(cfg.linkage().unwrap().runtime_search_path, None);
    }

    #[test]
    fn test_linux_any_arch() {
        for arch in ["x86_64", "aarch64", "riscv64"] {
            let cfg = config("linux", arch);
            assert_eq!(cfg.compile_flags, vec!["-std=c++17"]);
            assert_eq!(
                cfg.link_flags,
                vec!["-lokFrontPanel", "-Lfrontpanel/linux", "-Wl,-rpath=./"]
            );
            assert!(cfg.defines.is_empty());
        }
    }

    #[test]
    fn test_windows_any_arch() {
        for arch in ["AMD64", "x86_64", "ARM64"] {
            let cfg = config("win32", arch);
            assert_eq!(cfg.define("WIN32").and_then(|d| d.value()), Some("1"));
            assert_eq!(cfg.defines.len(), 1);
            assert_eq!(cfg.compile_flags, vec!["/std:c++17"]);
            assert_eq!(cfg.link_flags, vec!["/LIBPATH:frontpanel/win/x64"]);
        }
    }

    #[test]
    fn test_unknown_os_is_empty() {
        let cfg = config("freebsd", "x86_64");
        assert!(cfg.is_empty());
        assert!(cfg.linkage().is_none());
        assert_eq!(cfg.include_dirs, vec!["frontpanel"]);
    }

    #[test]
    fn test_derivation_is_pure() {
        let platform = TargetPlatform::parse("linux", "x86_64");
        let first = BuildConfiguration::for_platform(&platform);
        let second = BuildConfiguration::for_platform(&platform);
        assert_eq!(first, second);
    }

    #[test]
    fn test_for_host_matches_host_platform() {
        let host = BuildConfiguration::for_host();
        assert_eq!(host, BuildConfiguration::for_platform(&TargetPlatform::host()));
        assert_eq!(host.include_dirs, vec!["frontpanel".to_string()]);
    }

    #[test]
    fn test_custom_layout() {
        let layout = VendorLayout {
            root: "vendor/fp".to_string(),
            library: "okFP".to_string(),
            runtime_search_path: "$ORIGIN".to_string(),
        };
        let cfg =
            BuildConfiguration::for_platform_with(&TargetPlatform::parse("linux", "x86_64"), &layout);
        assert_eq!(cfg.include_dirs, vec!["vendor/fp"]);
        assert_eq!(
            cfg.link_flags,
            vec!["-lokFP", "-Lvendor/fp/linux", "-Wl,-rpath=$ORIGIN"]
        );
    }

    #[test]
    fn test_define_flags() {
        let d = Define::key_value("WIN32", "1");
        assert_eq!(d.to_gnu_flag(), "-DWIN32=1");
        assert_eq!(d.to_msvc_flag(), "/DWIN32=1");
        assert_eq!(Define::flag("NOMINMAX").to_msvc_flag(), "/DNOMINMAX");
    }
}
