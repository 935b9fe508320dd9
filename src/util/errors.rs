//! Error types for the verification pipeline.
//!
//! Every variant is terminal: the pipeline never retries or recovers locally.

use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Error raised by a verification step.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The dependency's package folder (or a file inside it) could not be read,
    /// or the staging directory could not be written.
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// CMake configure or build reported failure.
    #[error("`{command}` failed with exit code {code:?}\n{output}")]
    Build {
        command: String,
        code: Option<i32>,
        output: String,
    },

    /// The example binary could not be launched or exited non-zero.
    #[error("example `{command}` {}", describe_test_failure(.code, .message))]
    TestExecution {
        command: String,
        code: Option<i32>,
        message: String,
    },

    /// Settings or options could not be resolved.
    #[error("invalid configuration: {0}")]
    Config(String),
}

fn describe_test_failure(code: &Option<i32>, message: &str) -> String {
    match *code {
        Some(code) if message.is_empty() => format!("exited with status {}", code),
        Some(code) => format!("exited with status {}\n{}", code, message),
        None => format!("could not be run: {}", message),
    }
}

/// Discriminant of [`VerifyError`], used in serialized results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyErrorKind {
    Filesystem,
    Build,
    TestExecution,
    Config,
}

impl VerifyError {
    /// Wrap an I/O error with the path it occurred at.
    pub fn filesystem(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VerifyError::Filesystem {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> VerifyErrorKind {
        match self {
            VerifyError::Filesystem { .. } => VerifyErrorKind::Filesystem,
            VerifyError::Build { .. } => VerifyErrorKind::Build,
            VerifyError::TestExecution { .. } => VerifyErrorKind::TestExecution,
            VerifyError::Config(_) => VerifyErrorKind::Config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_message_includes_status() {
        let err = VerifyError::TestExecution {
            command: "./example".to_string(),
            code: Some(1),
            message: String::new(),
        };
        assert_eq!(err.to_string(), "example `./example` exited with status 1");
        assert_eq!(err.kind(), VerifyErrorKind::TestExecution);
    }

    #[test]
    fn test_launch_failure_message() {
        let err = VerifyError::TestExecution {
            command: "./example".to_string(),
            code: None,
            message: "No such file or directory".to_string(),
        };
        assert!(err.to_string().contains("could not be run"));
    }

    #[test]
    fn test_filesystem_error_names_path() {
        let err = VerifyError::filesystem(
            "/missing/pkg",
            io::Error::new(io::ErrorKind::NotFound, "not found"),
        );
        assert!(err.to_string().contains("/missing/pkg"));
        assert_eq!(err.kind(), VerifyErrorKind::Filesystem);
    }
}
