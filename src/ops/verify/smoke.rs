//! Execution of the built example.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

use super::types::{TestOptions, TestResult};
use crate::core::settings::Settings;
use crate::util::errors::VerifyError;
use crate::util::process::{combined_output, CommandRunner, ProcessBuilder};

/// Loader search path variable for the running host.
fn loader_path_var() -> &'static str {
    if cfg!(windows) {
        "PATH"
    } else if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    }
}

/// `dir` prepended to the current value of `var`.
fn prepend_path(var: &str, dir: &Path) -> String {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = env::var_os(var) {
        paths.extend(env::split_paths(&existing));
    }
    env::join_paths(paths)
        .unwrap_or_else(|_| OsString::from(dir.as_os_str()))
        .to_string_lossy()
        .into_owned()
}

/// Locate the example binary.
///
/// Single-config generators put it directly in the build directory,
/// multi-config ones in a per-configuration subdirectory.
fn locate_example(options: &TestOptions, settings: &Settings) -> PathBuf {
    let file_name = format!("{}{}", options.example_name, env::consts::EXE_SUFFIX);
    let candidates = [
        options.build_dir.join(&file_name),
        options.build_dir.join(&settings.build_type).join(&file_name),
        options.build_dir.join("bin").join(&file_name),
    ];

    candidates
        .iter()
        .find(|p| p.is_file())
        .cloned()
        .unwrap_or_else(|| candidates[0].clone())
}

/// Run the example once, unless the settings describe a cross build.
///
/// A cross build never launches anything and reports [`TestResult::Skipped`].
pub fn run_smoke_test(
    options: &TestOptions,
    settings: &Settings,
    runner: &dyn CommandRunner,
) -> Result<TestResult, VerifyError> {
    if settings.is_cross_building() {
        let reason = format!(
            "cross building for {}/{} on {}/{}",
            settings.os,
            settings.arch,
            settings.build_os(),
            settings.build_arch()
        );
        tracing::info!("Smoke test skipped ({})", reason);
        return Ok(TestResult::Skipped { reason });
    }

    let program = locate_example(options, settings);
    let command = format!(".{}{}", MAIN_SEPARATOR, options.example_name);
    let var = loader_path_var();

    let cmd = ProcessBuilder::new(&program)
        .cwd(&options.build_dir)
        .env(var, prepend_path(var, &options.runtime_dir));

    tracing::info!("Running `{}`", command);
    let output = runner.run(&cmd).map_err(|e| VerifyError::TestExecution {
        command: command.clone(),
        code: None,
        message: format!("{:#}", e),
    })?;

    let captured = combined_output(&output);
    if !captured.is_empty() {
        tracing::debug!("example output:\n{}", captured);
    }

    if !output.status.success() {
        return Err(VerifyError::TestExecution {
            command,
            code: output.status.code(),
            message: captured,
        });
    }

    tracing::info!("Smoke test passed");
    Ok(TestResult::Passed { command })
}
