//! Configuration file support for fpdev.
//!
//! fpdev supports two configuration file locations:
//! - Global: `~/.fpdev/config.toml` - User-wide defaults
//! - Project: `.fpdev/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Only the vendor
//! layout and output settings are configurable; the platform mapping itself
//! is fixed.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::build_config::VendorLayout;
use crate::core::extension::PackageMetadata;

/// fpdev configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Vendor SDK layout overrides
    pub vendor: VendorConfig,

    /// Build output settings
    pub build: BuildConfig,
}

/// Vendor SDK layout overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VendorConfig {
    /// SDK root directory (default `frontpanel`)
    pub root: Option<String>,

    /// Library name (default `okFrontPanel`)
    pub library: Option<String>,

    /// Embedded runtime search path (default `./`)
    pub runtime_search_path: Option<String>,
}

/// Build output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory for objects and the module artifact
    pub out_dir: Option<PathBuf>,

    /// Package metadata release: "1.0.0" or "1.0.1"
    pub release: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.vendor.root.is_some() {
            self.vendor.root = other.vendor.root;
        }
        if other.vendor.library.is_some() {
            self.vendor.library = other.vendor.library;
        }
        if other.vendor.runtime_search_path.is_some() {
            self.vendor.runtime_search_path = other.vendor.runtime_search_path;
        }

        if other.build.out_dir.is_some() {
            self.build.out_dir = other.build.out_dir;
        }
        if other.build.release.is_some() {
            self.build.release = other.build.release;
        }
    }

    /// Vendor layout with overrides applied over the defaults.
    pub fn vendor_layout(&self) -> VendorLayout {
        let mut layout = VendorLayout::default();
        if let Some(ref root) = self.vendor.root {
            layout.root = root.clone();
        }
        if let Some(ref library) = self.vendor.library {
            layout.library = library.clone();
        }
        if let Some(ref rpath) = self.vendor.runtime_search_path {
            layout.runtime_search_path = rpath.clone();
        }
        layout
    }

    /// Package metadata for the configured release.
    ///
    /// Unknown releases fall back to the current one with a warning.
    pub fn package_metadata(&self) -> PackageMetadata {
        match self.build.release.as_deref() {
            None | Some("1.0.1") => PackageMetadata::v1_0_1(),
            Some("1.0.0") => PackageMetadata::v1_0_0(),
            Some(other) => {
                let current = PackageMetadata::current();
                tracing::warn!("unknown release `{}`, using {}", other, current.version);
                current
            }
        }
    }

    /// Output directory, defaulting to `build`.
    pub fn out_dir(&self) -> PathBuf {
        self.build
            .out_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("build"))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.fpdev/config.toml)
/// 2. Global config (~/.fpdev/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            tracing::debug!("loading global config {}", global_path.display());
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        tracing::debug!("loading project config {}", project_path.display());
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global fpdev config directory (~/.fpdev).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".fpdev"))
}

/// Get the global config path (~/.fpdev/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.fpdev/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".fpdev").join("config.toml")
}
