//! Consumer-side package verification.
//!
//! A test package is a tiny consumer project (a `CMakeLists.txt` producing an
//! `example` executable) built against an installed library. Verifying it
//! proves the package can be found, linked and loaded.
//!
//! ## Usage
//!
//! ```bash
//! pkgcheck verify --package-folder ~/pkgs/zlib      # Verify with host settings
//! pkgcheck verify --package-folder pkg --arch armv8 # Cross build, test skipped
//! pkgcheck verify --package-folder pkg --output-format github
//! ```
//!
//! ## Verification Steps
//!
//! 1. Declare settings (os, compiler, build_type, arch)
//! 2. Import runtime artifacts (`*.dll`, `*.dylib*`, `*.so*`) into `bin/`
//! 3. Configure and build the example with CMake
//! 4. Run `./example` once, unless cross building
//!
//! The first failing step ends verification; later steps are not run.

mod build;
mod format;
mod imports;
mod smoke;
mod types;

use std::time::Instant;

use crate::core::settings::Settings;
use crate::util::errors::VerifyError;
use crate::util::process::CommandRunner;

pub use self::build::{build_example, CMakeExample};
pub use self::format::{format_result, format_result_for_output};
pub use self::imports::import_artifacts;
pub use self::smoke::run_smoke_test;
pub use self::types::{
    BuildOptions, BuildResult, ImportOptions, ImportReport, OutputFormat, OutputFormatParseError,
    StepStatus, TestOptions, TestResult, VerifyOptions, VerifyResult, VerifyStep, EXAMPLE_NAME,
};

/// Ordered `declare → imports → build → test` pipeline.
pub struct Verifier<'a> {
    options: VerifyOptions,
    runner: &'a dyn CommandRunner,
}

impl<'a> Verifier<'a> {
    pub fn new(options: VerifyOptions, runner: &'a dyn CommandRunner) -> Self {
        Verifier { options, runner }
    }

    /// The settings this run is bound to.
    pub fn declare_settings(&self) -> &Settings {
        &self.options.settings
    }

    pub fn imports(&self) -> Result<ImportReport, VerifyError> {
        import_artifacts(&self.options.imports, &self.options.settings)
    }

    pub fn build(&self) -> Result<BuildResult, VerifyError> {
        build_example(&self.options.build, &self.options.settings, self.runner)
    }

    pub fn test(&self) -> Result<TestResult, VerifyError> {
        run_smoke_test(&self.options.test, &self.options.settings, self.runner)
    }

    /// Run every step in order, stopping at the first failure.
    pub fn run(&self) -> VerifyResult {
        let start = Instant::now();
        let settings = self.declare_settings().clone();
        let mut result = VerifyResult::new(settings.clone());

        // Step 1: Settings
        let declared = if result.cross_building {
            format!("{} (cross building)", settings)
        } else {
            settings.to_string()
        };
        result.add_step(VerifyStep::pass("Settings", declared, start.elapsed()));

        // Step 2: Imports
        let step_start = Instant::now();
        match self.imports() {
            Ok(report) => {
                let mut message = format!("Imported {} runtime artifact(s)", report.copied.len());
                if !report.filtered_out.is_empty() {
                    message.push_str(&format!(
                        "; skipped patterns for other platforms: {}",
                        report.filtered_out.join(", ")
                    ));
                }
                result.artifacts = report.copied;
                result.add_step(VerifyStep::pass("Imports", message, step_start.elapsed()));
            }
            Err(e) => return self.abort(result, "Imports", e, step_start, start),
        }

        // Step 3: Build
        let step_start = Instant::now();
        match self.build() {
            Ok(build) => {
                result.add_step(VerifyStep::pass(
                    "Build",
                    format!("{}\n{}", build.configure_command, build.build_command),
                    step_start.elapsed(),
                ));
            }
            Err(e) => return self.abort(result, "Build", e, step_start, start),
        }

        // Step 4: Test
        let step_start = Instant::now();
        match self.test() {
            Ok(TestResult::Passed { command }) => {
                result.add_step(VerifyStep::pass(
                    "Test",
                    format!("`{}` exited with status 0", command),
                    step_start.elapsed(),
                ));
            }
            Ok(TestResult::Skipped { reason }) => {
                result.add_step(VerifyStep::skip(
                    "Test",
                    format!("skipped: {}", reason),
                    step_start.elapsed(),
                ));
            }
            Err(e) => return self.abort(result, "Test", e, step_start, start),
        }

        result.total_duration = start.elapsed();
        result
    }

    fn abort(
        &self,
        mut result: VerifyResult,
        step: &str,
        error: VerifyError,
        step_start: Instant,
        start: Instant,
    ) -> VerifyResult {
        tracing::error!("{} step failed: {}", step, error);
        result.add_step(VerifyStep::fail(step, &error, step_start.elapsed()));
        result.total_duration = start.elapsed();
        result
    }
}

/// Verify a test package with the given options.
pub fn verify(options: VerifyOptions, runner: &dyn CommandRunner) -> VerifyResult {
    Verifier::new(options, runner).run()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingRunner;
    use crate::util::errors::VerifyErrorKind;
    use std::path::PathBuf;
    use tempfile::TempDir;

    struct Layout {
        _tmp: TempDir,
        package: PathBuf,
        test_package: PathBuf,
        build: PathBuf,
    }

    fn layout() -> Layout {
        let tmp = TempDir::new().unwrap();
        let package = tmp.path().join("package");
        let test_package = tmp.path().join("test_package");
        let build = test_package.join("build");
        std::fs::create_dir_all(package.join("lib")).unwrap();
        std::fs::write(package.join("lib/liba.so"), "elf").unwrap();
        std::fs::create_dir_all(&test_package).unwrap();
        Layout {
            _tmp: tmp,
            package,
            test_package,
            build,
        }
    }

    fn options(layout: &Layout, settings: Settings) -> VerifyOptions {
        let mut opts = VerifyOptions::new(
            settings,
            &layout.package,
            &layout.test_package,
            &layout.build,
        );
        opts.build.cmake = Some(PathBuf::from("cmake"));
        opts
    }

    fn linux() -> Settings {
        Settings::new("Linux", "gcc", "Release", "x86_64").with_build_machine("Linux", "x86_64")
    }

    #[test]
    fn test_linux_scenario_passes() {
        let layout = layout();
        let runner = RecordingRunner::new();

        let result = verify(options(&layout, linux()), &runner);

        assert!(result.passed, "{:?}", result.steps);
        assert!(layout.build.join("bin/liba.so").exists());
        assert_eq!(result.artifacts, vec![PathBuf::from("bin/liba.so")]);
        let names: Vec<_> = result.steps.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Settings", "Imports", "Build", "Test"]);
        // configure, build, example
        assert_eq!(runner.calls().len(), 3);
    }

    #[test]
    fn test_failing_example_fails_verification() {
        let layout = layout();
        let runner = RecordingRunner::new().with_exit_codes([0, 0, 1]);

        let result = verify(options(&layout, linux()), &runner);

        assert!(!result.passed);
        assert_eq!(result.failure_kind(), Some(VerifyErrorKind::TestExecution));
    }

    #[test]
    fn test_cross_build_skips_test() {
        let layout = layout();
        let runner = RecordingRunner::new();
        let settings = Settings::new("Windows", "Visual Studio", "Release", "armv8")
            .with_build_machine("Linux", "x86_64");

        let result = verify(options(&layout, settings), &runner);

        assert!(result.passed);
        assert!(result.cross_building);
        assert_eq!(result.step("Test").unwrap().status, StepStatus::Skipped);
        // configure and build only
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_build_failure_stops_pipeline() {
        let layout = layout();
        let runner = RecordingRunner::new().with_exit_codes([1]);

        let result = verify(options(&layout, linux()), &runner);

        assert!(!result.passed);
        assert_eq!(result.failure_kind(), Some(VerifyErrorKind::Build));
        assert!(result.step("Test").is_none());
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_missing_package_folder_stops_before_build() {
        let layout = layout();
        let runner = RecordingRunner::new();
        let mut opts = options(&layout, linux());
        opts.imports.package_folder = layout.package.join("does-not-exist");

        let result = verify(opts, &runner);

        assert_eq!(result.failure_kind(), Some(VerifyErrorKind::Filesystem));
        assert!(runner.calls().is_empty());
        assert!(!layout.build.join("bin").exists());
    }
}
