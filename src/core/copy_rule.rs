//! Artifact copy rules.
//!
//! Each rule says which runtime-loadable files a dependency exposes for one
//! platform convention, where they live inside the package folder, and where
//! they go in the local run layout.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::core::settings::normalize_os;

/// Directory that receives every imported runtime artifact.
pub const RUNTIME_DIR: &str = "bin";

/// Shared-library naming convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Windows DLLs, shipped next to executables in `bin/`
    Windows,
    /// Apple dylibs, possibly versioned (`libfoo.1.dylib`, `libfoo.dylib.1`)
    Macos,
    /// ELF shared objects, possibly versioned (`libfoo.so.1.2`)
    Unix,
}

impl Platform {
    /// Whether binaries for `os` use this convention.
    pub fn matches_os(&self, os: &str) -> bool {
        let os = normalize_os(os);
        match self {
            Platform::Windows => os == "windows",
            Platform::Macos => matches!(os.as_str(), "macos" | "ios" | "watchos" | "tvos"),
            Platform::Unix => !matches!(
                os.as_str(),
                "windows" | "macos" | "ios" | "watchos" | "tvos"
            ),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Platform::Windows => "windows",
            Platform::Macos => "macos",
            Platform::Unix => "unix",
        };
        f.write_str(s)
    }
}

/// One `(platform, pattern, src, dst)` entry of the import table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopyRule {
    pub platform: Platform,

    /// File-name glob (`*.so*`)
    pub pattern: String,

    /// Directory inside the dependency's package folder
    pub src: PathBuf,

    /// Directory inside the local run layout; only [`RUNTIME_DIR`] is accepted
    #[serde(default = "default_dst")]
    pub dst: PathBuf,
}

fn default_dst() -> PathBuf {
    PathBuf::from(RUNTIME_DIR)
}

impl CopyRule {
    pub fn new(platform: Platform, pattern: &str, src: &str) -> Self {
        CopyRule {
            platform,
            pattern: pattern.to_string(),
            src: PathBuf::from(src),
            dst: default_dst(),
        }
    }
}

/// The standard import table: DLLs from `bin`, dylibs and shared objects from
/// `lib`, all into the runtime directory.
pub fn default_rules() -> Vec<CopyRule> {
    vec![
        CopyRule::new(Platform::Windows, "*.dll", "bin"),
        CopyRule::new(Platform::Macos, "*.dylib*", "lib"),
        CopyRule::new(Platform::Unix, "*.so*", "lib"),
    ]
}
