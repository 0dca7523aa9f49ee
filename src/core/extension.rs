//! Extension module descriptor.
//!
//! Bundles the module name, its C++ sources, the package metadata and the
//! derived [`BuildConfiguration`] into the one record an external packaging
//! tool needs to compile `py_fp`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::build_config::{BuildConfiguration, VendorLayout};
use crate::core::platform::{Os, TargetPlatform};

/// Name of the importable extension module.
pub const MODULE_NAME: &str = "py_fp";

/// C++ translation units of the extension.
pub const MODULE_SOURCES: &[&str] = &["py_fp.cpp", "fpdev.cpp"];

/// How the module is laid out in the distribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PackageLayout {
    /// The extension sits at the top level.
    Flat,
    /// The extension ships inside sub-packages together with data files.
    Package {
        /// Package names
        packages: Vec<String>,
        /// Data files per package (stubs, type markers)
        package_data: Vec<(String, Vec<String>)>,
    },
}

/// Distribution metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageMetadata {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub author_email: String,
    pub layout: PackageLayout,
}

impl PackageMetadata {
    /// The first release: flat layout, no stubs.
    pub fn v1_0_0() -> Self {
        PackageMetadata {
            name: MODULE_NAME.to_string(),
            version: "1.0.0".to_string(),
            description: "fp library".to_string(),
            author: "Daniel Turecek".to_string(),
            author_email: "daniel@turecek.de".to_string(),
            layout: PackageLayout::Flat,
        }
    }

    /// The second release: `py_fp` sub-package with type stubs.
    pub fn v1_0_1() -> Self {
        PackageMetadata {
            version: "1.0.1".to_string(),
            description: "Interface to Front Panel device".to_string(),
            layout: PackageLayout::Package {
                packages: vec![MODULE_NAME.to_string()],
                package_data: vec![(
                    MODULE_NAME.to_string(),
                    vec!["__init__.pyi".to_string(), "py.typed".to_string()],
                )],
            },
            ..Self::v1_0_0()
        }
    }

    /// Metadata of the current release.
    pub fn current() -> Self {
        Self::v1_0_1()
    }
}

/// Everything needed to build one extension module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionModule {
    /// Importable module name
    pub name: String,
    /// Source files
    pub sources: Vec<PathBuf>,
    /// Distribution metadata
    pub metadata: PackageMetadata,
    /// Platform the configuration was derived for
    pub platform: TargetPlatform,
    /// Derived build configuration
    pub config: BuildConfiguration,
}

impl ExtensionModule {
    /// The `py_fp` module for a platform with the default vendor layout.
    pub fn py_fp(platform: &TargetPlatform) -> Self {
        Self::py_fp_with(platform, &VendorLayout::default(), PackageMetadata::current())
    }

    /// The `py_fp` module for a platform, layout and metadata.
    pub fn py_fp_with(
        platform: &TargetPlatform,
        layout: &VendorLayout,
        metadata: PackageMetadata,
    ) -> Self {
        ExtensionModule {
            name: MODULE_NAME.to_string(),
            sources: MODULE_SOURCES.iter().map(PathBuf::from).collect(),
            metadata,
            platform: platform.clone(),
            config: BuildConfiguration::for_platform_with(platform, layout),
        }
    }

    /// File name of the built module.
    pub fn artifact_file_name(&self) -> String {
        match self.platform.os {
            Os::Windows => format!("{}.pyd", self.name),
            _ => format!("{}.so", self.name),
        }
    }

    /// Serialize the descriptor as pretty JSON.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
