//! Cargo build-script directives for the vendor library.
//!
//! Lets a Rust crate link the okFrontPanel SDK with the same search paths the
//! extension build uses. This file is also compiled into `build.rs`.

use std::fmt;
use std::io::{self, Write};

use super::build_config::BuildConfiguration;

/// `cargo:` lines linking the vendor library.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CargoDirectives {
    lines: Vec<String>,
}

impl CargoDirectives {
    /// Derive directives from a build configuration.
    ///
    /// Unsupported platforms produce no directives.
    pub fn from_config(config: &BuildConfiguration) -> Self {
        let mut lines = Vec::new();

        if let Some(linkage) = config.linkage() {
            lines.push(format!(
                "cargo:rustc-link-search=native={}",
                linkage.search_path
            ));
            lines.push(format!("cargo:rustc-link-lib=dylib={}", linkage.library));
            if let Some(ref rpath) = linkage.runtime_search_path {
                lines.push(format!("cargo:rustc-link-arg=-Wl,-rpath,{}", rpath));
            }
        }

        CargoDirectives { lines }
    }

    /// The directive lines.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether there is nothing to emit.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Write all directives, one per line.
    pub fn emit(&self, mut out: impl Write) -> io::Result<()> {
        for line in &self.lines {
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }
}

impl fmt::Display for CargoDirectives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
