//! Staging of the dependency's runtime artifacts.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use super::types::{ImportOptions, ImportReport};
use crate::core::copy_rule::RUNTIME_DIR;
use crate::core::settings::Settings;
use crate::util::errors::VerifyError;
use crate::util::fs::{check_readable_dir, find_matching_files};

/// Copy runtime-loadable artifacts from the package folder into the run
/// layout.
///
/// Every match is collected before anything is written, so a failure while
/// reading the package folder leaves the destination untouched. A rule whose
/// source directory is absent, or which matches nothing, is not an error.
/// Every rule must target the runtime directory; the example's loader path
/// only covers that one directory.
pub fn import_artifacts(
    options: &ImportOptions,
    settings: &Settings,
) -> Result<ImportReport, VerifyError> {
    for rule in &options.rules {
        if rule.dst != Path::new(RUNTIME_DIR) {
            return Err(VerifyError::Config(format!(
                "copy rule `{}` targets `{}`; runtime artifacts must go to `{}`",
                rule.pattern,
                rule.dst.display(),
                RUNTIME_DIR
            )));
        }
    }

    check_readable_dir(&options.package_folder)
        .map_err(|e| VerifyError::filesystem(&options.package_folder, e))?;

    let mut report = ImportReport::default();

    // destination (relative to dest_root) -> source file
    let mut plan: BTreeMap<PathBuf, PathBuf> = BTreeMap::new();

    for rule in &options.rules {
        if options.filter_host_platform && !rule.platform.matches_os(&settings.os) {
            tracing::debug!("Skipping `{}` rule for {}", rule.pattern, rule.platform);
            report.filtered_out.push(rule.pattern.clone());
            continue;
        }

        let pattern = Pattern::new(&rule.pattern).map_err(|e| {
            VerifyError::Config(format!("invalid copy pattern `{}`: {}", rule.pattern, e))
        })?;

        let src_dir = options.package_folder.join(&rule.src);
        if !src_dir.is_dir() {
            tracing::debug!(
                "No `{}` directory in package folder, nothing to copy for `{}`",
                rule.src.display(),
                rule.pattern
            );
            continue;
        }

        let matches = find_matching_files(&src_dir, &pattern)
            .map_err(|e| VerifyError::filesystem(&src_dir, e))?;

        tracing::debug!(
            "`{}` matched {} file(s) in {}",
            rule.pattern,
            matches.len(),
            src_dir.display()
        );

        for relative in matches {
            plan.insert(rule.dst.join(&relative), src_dir.join(&relative));
        }
    }

    for (dest_rel, src) in &plan {
        let dest = options.dest_root.join(dest_rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| VerifyError::filesystem(parent, e))?;
        }
        fs::copy(src, &dest).map_err(|e| VerifyError::filesystem(src, e))?;
        tracing::debug!("Copied {} -> {}", src.display(), dest.display());
    }

    report.copied = plan.into_keys().collect();
    tracing::info!("Imported {} runtime artifact(s)", report.copied.len());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::copy_rule::{CopyRule, Platform};
    use crate::util::errors::VerifyErrorKind;
    use crate::test_support::list_files;
    use tempfile::TempDir;

    fn linux() -> Settings {
        Settings::new("Linux", "gcc", "Release", "x86_64").with_build_machine("Linux", "x86_64")
    }

    fn package_with(files: &[&str]) -> TempDir {
        let pkg = TempDir::new().unwrap();
        for file in files {
            let path = pkg.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("contents of {}", file)).unwrap();
        }
        pkg
    }

    #[test]
    fn test_imports_shared_object() {
        let pkg = package_with(&["lib/liba.so", "lib/liba.a", "include/a.h"]);
        let work = TempDir::new().unwrap();

        let options = ImportOptions::new(pkg.path(), work.path());
        let report = import_artifacts(&options, &linux()).unwrap();

        assert_eq!(report.copied, vec![PathBuf::from("bin/liba.so")]);
        assert!(work.path().join("bin/liba.so").exists());
        assert!(!work.path().join("bin/liba.a").exists());
    }

    #[test]
    fn test_imports_all_platform_conventions() {
        let pkg = package_with(&[
            "bin/a.dll",
            "lib/liba.1.dylib",
            "lib/liba.dylib.1",
            "lib/liba.so.1.2.3",
        ]);
        let work = TempDir::new().unwrap();

        let options = ImportOptions::new(pkg.path(), work.path());
        import_artifacts(&options, &linux()).unwrap();

        assert_eq!(
            list_files(&work.path().join("bin")),
            vec![
                PathBuf::from("a.dll"),
                PathBuf::from("liba.1.dylib"),
                PathBuf::from("liba.dylib.1"),
                PathBuf::from("liba.so.1.2.3"),
            ]
        );
    }

    #[test]
    fn test_zero_matches_is_not_an_error() {
        let pkg = package_with(&["include/a.h"]);
        let work = TempDir::new().unwrap();

        let options = ImportOptions::new(pkg.path(), work.path());
        let report = import_artifacts(&options, &linux()).unwrap();

        assert!(report.copied.is_empty());
    }

    #[test]
    fn test_import_is_idempotent() {
        let pkg = package_with(&["lib/liba.so", "lib/sub/libb.so.2", "bin/c.dll"]);
        let work = TempDir::new().unwrap();
        let options = ImportOptions::new(pkg.path(), work.path());

        import_artifacts(&options, &linux()).unwrap();
        let first = list_files(&work.path().join("bin"));
        let first_contents = fs::read(work.path().join("bin/liba.so")).unwrap();

        import_artifacts(&options, &linux()).unwrap();
        let second = list_files(&work.path().join("bin"));

        assert_eq!(first, second);
        assert_eq!(fs::read(work.path().join("bin/liba.so")).unwrap(), first_contents);
        assert!(work.path().join("bin/sub/libb.so.2").exists());
    }

    #[test]
    fn test_missing_package_folder_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        fs::create_dir_all(work.path().join("bin")).unwrap();
        fs::write(work.path().join("bin/existing.so"), "keep").unwrap();
        let before = list_files(&work.path().join("bin"));

        let options = ImportOptions::new(tmp.path().join("missing"), work.path());
        let err = import_artifacts(&options, &linux()).unwrap_err();

        assert_eq!(err.kind(), VerifyErrorKind::Filesystem);
        assert_eq!(list_files(&work.path().join("bin")), before);
    }

    #[test]
    fn test_missing_package_folder_creates_nothing() {
        let tmp = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();

        let options = ImportOptions::new(tmp.path().join("missing"), work.path());
        assert!(import_artifacts(&options, &linux()).is_err());
        assert!(!work.path().join("bin").exists());
    }

    #[test]
    fn test_filter_host_platform() {
        let pkg = package_with(&["bin/a.dll", "lib/liba.so"]);
        let work = TempDir::new().unwrap();

        let mut options = ImportOptions::new(pkg.path(), work.path());
        options.filter_host_platform = true;
        let report = import_artifacts(&options, &linux()).unwrap();

        assert_eq!(report.copied, vec![PathBuf::from("bin/liba.so")]);
        assert_eq!(report.filtered_out, vec!["*.dll".to_string(), "*.dylib*".to_string()]);
    }

    #[test]
    fn test_custom_rule_source() {
        let pkg = package_with(&["lib64/libz.so.1"]);
        let work = TempDir::new().unwrap();

        let mut options = ImportOptions::new(pkg.path(), work.path());
        options.rules.push(CopyRule::new(Platform::Unix, "*.so*", "lib64"));
        import_artifacts(&options, &linux()).unwrap();

        assert!(work.path().join("bin/libz.so.1").exists());
    }

    #[test]
    fn test_rule_outside_runtime_dir_is_config_error() {
        let pkg = package_with(&["lib/liba.so", "lib64/libz.so.1"]);
        let work = TempDir::new().unwrap();

        let mut options = ImportOptions::new(pkg.path(), work.path());
        options.rules.push(CopyRule {
            platform: Platform::Unix,
            pattern: "*.so*".to_string(),
            src: PathBuf::from("lib64"),
            dst: PathBuf::from("runtime"),
        });
        let err = import_artifacts(&options, &linux()).unwrap_err();

        assert_eq!(err.kind(), VerifyErrorKind::Config);
        assert!(err.to_string().contains("runtime"));
        assert!(list_files(work.path()).is_empty());
    }

    #[test]
    fn test_configured_escaping_destination_is_rejected() {
        let pkg = package_with(&["lib64/libz.so.1"]);
        let work = TempDir::new().unwrap();
        let rule: CopyRule = toml::from_str(
            r#"
            platform = "unix"
            pattern = "*.so*"
            src = "lib64"
            dst = "../../escaped"
            "#,
        )
        .unwrap();

        let mut options = ImportOptions::new(pkg.path(), work.path().join("build"));
        options.rules.push(rule);
        let err = import_artifacts(&options, &linux()).unwrap_err();

        assert_eq!(err.kind(), VerifyErrorKind::Config);
        assert!(list_files(work.path()).is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_config_error() {
        let pkg = package_with(&["lib/liba.so"]);
        let work = TempDir::new().unwrap();

        let mut options = ImportOptions::new(pkg.path(), work.path());
        options.rules = vec![CopyRule::new(Platform::Unix, "[", "lib")];
        let err = import_artifacts(&options, &linux()).unwrap_err();

        assert_eq!(err.kind(), VerifyErrorKind::Config);
    }
}
