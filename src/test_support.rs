//! Test utilities and mocks for pkgcheck unit tests.
//!
//! [`RecordingRunner`] stands in for the operating system when a test needs
//! to observe which commands the pipeline would launch.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;

use anyhow::{bail, Result};
use walkdir::WalkDir;

use crate::util::fs::relative_path;
use crate::util::process::{CommandRunner, ProcessBuilder};

/// Build an `ExitStatus` carrying the given exit code.
pub fn exit_status(code: i32) -> ExitStatus {
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        ExitStatus::from_raw(code << 8)
    }

    #[cfg(windows)]
    {
        use std::os::windows::process::ExitStatusExt;
        ExitStatus::from_raw(code as u32)
    }
}

/// Command runner that records invocations instead of spawning.
///
/// Exit codes are consumed in order; once exhausted every command succeeds.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: Mutex<Vec<ProcessBuilder>>,
    exit_codes: Mutex<VecDeque<i32>>,
    launch_fails: bool,
}

impl RecordingRunner {
    pub fn new() -> Self {
        RecordingRunner::default()
    }

    /// Queue exit codes for successive commands.
    pub fn with_exit_codes(self, codes: impl IntoIterator<Item = i32>) -> Self {
        self.exit_codes.lock().unwrap().extend(codes);
        self
    }

    /// Make every command fail to launch.
    pub fn failing_to_launch(mut self) -> Self {
        self.launch_fails = true;
        self
    }

    /// Recorded commands, as displayed.
    pub fn calls(&self) -> Vec<String> {
        self.invocations
            .lock()
            .unwrap()
            .iter()
            .map(ProcessBuilder::display_command)
            .collect()
    }

    /// Recorded commands.
    pub fn invocations(&self) -> Vec<ProcessBuilder> {
        self.invocations.lock().unwrap().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &ProcessBuilder) -> Result<Output> {
        self.invocations.lock().unwrap().push(cmd.clone());

        if self.launch_fails {
            bail!("failed to spawn `{}`", cmd.get_program().display());
        }

        let code = self.exit_codes.lock().unwrap().pop_front().unwrap_or(0);
        let stderr = if code == 0 {
            Vec::new()
        } else {
            format!("exit {}", code).into_bytes()
        };

        Ok(Output {
            status: exit_status(code),
            stdout: Vec::new(),
            stderr,
        })
    }
}

/// Write an executable shell script.
#[cfg(unix)]
pub fn write_script(path: &Path, body: &str) {
    use std::os::unix::fs::PermissionsExt;

    std::fs::write(path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

/// Every file below `dir`, relative to it and sorted. A missing directory
/// lists as empty.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    if !dir.exists() {
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .map(|entry| entry.unwrap())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| relative_path(dir, entry.path()))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_files_missing_dir_is_empty() {
        let tmp = TempDir::new().unwrap();
        assert!(list_files(&tmp.path().join("bin")).is_empty());
    }

    #[test]
    fn test_list_files_is_relative_and_sorted() {
        let tmp = TempDir::new().unwrap();
        std::fs::create_dir_all(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("sub/b.so"), "b").unwrap();
        std::fs::write(tmp.path().join("a.dll"), "a").unwrap();

        assert_eq!(
            list_files(tmp.path()),
            vec![PathBuf::from("a.dll"), PathBuf::from("sub/b.so")]
        );
    }
}
