//! Command implementations

pub mod build;
pub mod completions;
pub mod imports;
pub mod settings;
pub mod verify;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{SettingsFlags, StepArgs};
use pkgcheck::core::{Settings, SettingsOverrides};
use pkgcheck::ops::verify::VerifyOptions;
use pkgcheck::util::config::{global_config_path, load_config, project_config_path, Config};

/// Load global, project and explicit configuration.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    load_config(
        global_config_path().as_deref(),
        &project_config_path(&cwd),
        explicit,
    )
}

/// Settings from host detection, then config, then flags.
pub fn resolve_settings(config: &Config, flags: &SettingsFlags) -> Settings {
    let mut overrides = config.settings.clone();
    overrides.merge(SettingsOverrides {
        os: flags.os.clone(),
        compiler: flags.compiler.clone(),
        compiler_version: flags.compiler_version.clone(),
        build_type: flags.build_type.clone(),
        arch: flags.arch.clone(),
        os_build: flags.os_build.clone(),
        arch_build: flags.arch_build.clone(),
    });
    Settings::detect().apply(&overrides)
}

/// Pipeline options from config and flags.
pub fn resolve_options(config: &Config, args: &StepArgs) -> Result<VerifyOptions> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    let source_dir = args
        .source_dir
        .clone()
        .or_else(|| config.build.source_dir.clone())
        .map(|p| cwd.join(p))
        .unwrap_or_else(|| cwd.clone());
    let build_dir = args
        .build_dir
        .clone()
        .map(|p| cwd.join(p))
        .unwrap_or_else(|| source_dir.join("build"));
    let package_folder = args
        .package_folder
        .clone()
        .map(|p| cwd.join(p))
        .unwrap_or_default();

    let settings = resolve_settings(config, &args.settings);
    let mut options = VerifyOptions::new(settings, &package_folder, &source_dir, &build_dir);

    options.imports.rules.extend(config.imports.rules.iter().cloned());
    options.imports.filter_host_platform =
        args.filter_host || config.imports.filter_host_platform.unwrap_or(false);

    options.build.generator = args.generator.clone().or_else(|| config.build.generator.clone());
    options.build.cmake = config.build.cmake.as_deref().map(|p| resolve_tool(&cwd, p));
    options.build.definitions = config
        .build
        .definitions
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    options.build.definitions.extend(args.define.iter().cloned());

    Ok(options)
}

/// Resolve a configured tool path against `cwd`.
///
/// A bare program name (`cmake3`) is left for `PATH` lookup; a path with a
/// directory part is relative to where pkgcheck was started, not to the build
/// directory the tool later runs in.
fn resolve_tool(cwd: &Path, tool: &Path) -> PathBuf {
    if tool.components().count() > 1 {
        cwd.join(tool)
    } else {
        tool.to_path_buf()
    }
}

/// Require `--package-folder` for steps that read the dependency.
pub fn require_package_folder(args: &StepArgs) -> Result<PathBuf> {
    args.package_folder
        .clone()
        .context("--package-folder is required (or set PKGCHECK_PACKAGE_FOLDER)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_cmake_is_joined_onto_cwd() {
        let cwd = Path::new("/work/test_package");
        assert_eq!(
            resolve_tool(cwd, Path::new("tools/cmake")),
            cwd.join("tools/cmake")
        );
        assert_eq!(
            resolve_tool(cwd, Path::new("../cmake")),
            cwd.join("../cmake")
        );
    }

    #[test]
    fn test_bare_cmake_name_is_left_for_path_lookup() {
        let cwd = Path::new("/work/test_package");
        assert_eq!(resolve_tool(cwd, Path::new("cmake3")), PathBuf::from("cmake3"));
    }

    #[cfg(unix)]
    #[test]
    fn test_absolute_cmake_is_unchanged() {
        let cwd = Path::new("/work/test_package");
        assert_eq!(
            resolve_tool(cwd, Path::new("/opt/cmake/bin/cmake")),
            PathBuf::from("/opt/cmake/bin/cmake")
        );
    }
}
