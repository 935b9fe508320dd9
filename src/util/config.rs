//! Configuration file support for pkgcheck.
//!
//! Two locations are read:
//! - Global: `~/.pkgcheck/config.toml` - User-wide defaults
//! - Project: `pkgcheck.toml` in the test-package directory
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::core::copy_rule::CopyRule;
use crate::core::settings::SettingsOverrides;

/// File name of the project configuration.
pub const PROJECT_CONFIG_NAME: &str = "pkgcheck.toml";

/// pkgcheck configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Settings axes
    pub settings: SettingsOverrides,

    /// Example build settings
    pub build: BuildConfig,

    /// Artifact import settings
    pub imports: ImportsConfig,
}

/// Example build configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// CMake generator (e.g. "Ninja")
    pub generator: Option<String>,

    /// Path to the cmake executable
    pub cmake: Option<PathBuf>,

    /// Directory holding the example's CMakeLists.txt
    pub source_dir: Option<PathBuf>,

    /// Extra `-D` cache definitions
    pub definitions: BTreeMap<String, String>,
}

/// Artifact import configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportsConfig {
    /// Only run copy rules for the target platform
    pub filter_host_platform: Option<bool>,

    /// Rules appended to the standard table
    pub rules: Vec<CopyRule>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        self.settings.merge(other.settings);

        if other.build.generator.is_some() {
            self.build.generator = other.build.generator;
        }
        if other.build.cmake.is_some() {
            self.build.cmake = other.build.cmake;
        }
        if other.build.source_dir.is_some() {
            self.build.source_dir = other.build.source_dir;
        }
        self.build.definitions.extend(other.build.definitions);

        if other.imports.filter_host_platform.is_some() {
            self.imports.filter_host_platform = other.imports.filter_host_platform;
        }
        self.imports.rules.extend(other.imports.rules);
    }
}

/// Load merged configuration.
///
/// Order of precedence (highest to lowest):
/// 1. Explicit config file (`--config`)
/// 2. Project config (`pkgcheck.toml`)
/// 3. Global config (`~/.pkgcheck/config.toml`)
/// 4. Defaults
///
/// Missing implicit files are skipped; an explicit file that cannot be read is
/// an error.
pub fn load_config(
    global_path: Option<&Path>,
    project_path: &Path,
    explicit_path: Option<&Path>,
) -> Result<Config> {
    let mut config = Config::default();

    if let Some(global) = global_path.filter(|p| p.exists()) {
        tracing::debug!("Loading global config from {}", global.display());
        config.merge(Config::load(global)?);
    }

    if project_path.exists() {
        tracing::debug!("Loading project config from {}", project_path.display());
        config.merge(Config::load(project_path)?);
    }

    if let Some(explicit) = explicit_path {
        config.merge(Config::load(explicit)?);
    }

    Ok(config)
}

/// Get the global pkgcheck config directory (~/.pkgcheck).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".pkgcheck"))
}

/// Get the global config path (~/.pkgcheck/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path.
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_NAME)
}
