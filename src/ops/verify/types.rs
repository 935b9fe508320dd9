//! Public types and enums for the verify module.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use crate::core::copy_rule::{default_rules, CopyRule, RUNTIME_DIR};
use crate::core::settings::Settings;
use crate::util::errors::{VerifyError, VerifyErrorKind};

/// Name of the consumer example binary (without platform extension).
pub const EXAMPLE_NAME: &str = "example";

/// Output format for verification results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// Machine-readable JSON output
    Json,
    /// GitHub Actions annotations with job summary
    Github,
}

impl std::str::FromStr for OutputFormat {
    type Err = OutputFormatParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(OutputFormat::Human),
            "json" => Ok(OutputFormat::Json),
            "github" | "github-actions" | "gha" => Ok(OutputFormat::Github),
            _ => Err(OutputFormatParseError(s.to_string())),
        }
    }
}

/// Error parsing output format option.
#[derive(Debug, Clone)]
pub struct OutputFormatParseError(pub String);

impl std::fmt::Display for OutputFormatParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "invalid output format '{}', valid values: human, json, github",
            self.0
        )
    }
}

impl std::error::Error for OutputFormatParseError {}

/// Outcome of one pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Passed,
    /// Deliberately not run; counts as success
    Skipped,
    Failed,
}

impl StepStatus {
    pub fn is_success(&self) -> bool {
        !matches!(self, StepStatus::Failed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            StepStatus::Passed => "[OK]",
            StepStatus::Skipped => "[SKIP]",
            StepStatus::Failed => "[FAIL]",
        }
    }
}

/// Result of a verification step.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyStep {
    /// Step name
    pub name: String,

    pub status: StepStatus,

    /// Status message
    pub message: String,

    /// How long the step took (in milliseconds for JSON)
    #[serde(serialize_with = "serialize_duration_ms")]
    pub duration: Duration,

    /// Error category for failed steps
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<VerifyErrorKind>,
}

fn serialize_duration_ms<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

impl VerifyStep {
    /// Create a passing step.
    pub fn pass(name: impl Into<String>, message: impl Into<String>, duration: Duration) -> Self {
        VerifyStep {
            name: name.into(),
            status: StepStatus::Passed,
            message: message.into(),
            duration,
            error_kind: None,
        }
    }

    /// Create a skipped step.
    pub fn skip(name: impl Into<String>, message: impl Into<String>, duration: Duration) -> Self {
        VerifyStep {
            name: name.into(),
            status: StepStatus::Skipped,
            message: message.into(),
            duration,
            error_kind: None,
        }
    }

    /// Create a failing step from the error that ended it.
    pub fn fail(name: impl Into<String>, error: &VerifyError, duration: Duration) -> Self {
        VerifyStep {
            name: name.into(),
            status: StepStatus::Failed,
            message: error.to_string(),
            duration,
            error_kind: Some(error.kind()),
        }
    }
}

/// Complete verification result.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyResult {
    pub settings: Settings,

    /// Whether the settings describe a cross build
    pub cross_building: bool,

    /// Individual step results, in execution order
    pub steps: Vec<VerifyStep>,

    /// Total verification time (in milliseconds for JSON)
    #[serde(serialize_with = "serialize_duration_ms")]
    pub total_duration: Duration,

    /// Runtime artifacts staged into the run directory
    pub artifacts: Vec<PathBuf>,

    /// Whether verification passed overall
    pub passed: bool,
}

impl VerifyResult {
    pub fn new(settings: Settings) -> Self {
        VerifyResult {
            cross_building: settings.is_cross_building(),
            settings,
            steps: Vec::new(),
            total_duration: Duration::ZERO,
            artifacts: Vec::new(),
            passed: true,
        }
    }

    /// Add a step result.
    pub fn add_step(&mut self, step: VerifyStep) {
        if !step.status.is_success() {
            self.passed = false;
        }
        self.steps.push(step);
    }

    /// Find a step by name.
    pub fn step(&self, name: &str) -> Option<&VerifyStep> {
        self.steps.iter().find(|s| s.name == name)
    }

    /// Error category of the step that ended verification, if any.
    pub fn failure_kind(&self) -> Option<VerifyErrorKind> {
        self.steps.iter().find_map(|s| s.error_kind)
    }

    /// Get count of passed steps.
    pub fn passed_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Passed)
            .count()
    }

    /// Get count of skipped steps.
    pub fn skipped_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| s.status == StepStatus::Skipped)
            .count()
    }
}

/// Options for the imports step.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// The dependency's package folder
    pub package_folder: PathBuf,

    /// Root of the local run layout; rule destinations are joined onto it
    pub dest_root: PathBuf,

    pub rules: Vec<CopyRule>,

    /// Only run rules whose platform matches the target `os`
    pub filter_host_platform: bool,
}

impl ImportOptions {
    /// Standard rules, unfiltered.
    pub fn new(package_folder: impl Into<PathBuf>, dest_root: impl Into<PathBuf>) -> Self {
        ImportOptions {
            package_folder: package_folder.into(),
            dest_root: dest_root.into(),
            rules: default_rules(),
            filter_host_platform: false,
        }
    }
}

/// Files staged by the imports step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Destination paths, relative to the run layout root
    pub copied: Vec<PathBuf>,

    /// Patterns that were not run because of platform filtering
    pub filtered_out: Vec<String>,
}

/// Options for the build step.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory holding the example's CMakeLists.txt
    pub source_dir: PathBuf,

    /// CMake binary directory; the example binary lands here
    pub build_dir: PathBuf,

    /// CMake generator override
    pub generator: Option<String>,

    /// Extra `-D` cache definitions
    pub definitions: Vec<(String, String)>,

    /// Path to cmake (defaults to the one found in PATH)
    pub cmake: Option<PathBuf>,
}

impl BuildOptions {
    pub fn new(source_dir: impl Into<PathBuf>, build_dir: impl Into<PathBuf>) -> Self {
        BuildOptions {
            source_dir: source_dir.into(),
            build_dir: build_dir.into(),
            generator: None,
            definitions: Vec::new(),
            cmake: None,
        }
    }
}

/// Commands run by the build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildResult {
    pub configure_command: String,
    pub build_command: String,
}

/// Options for the test step.
#[derive(Debug, Clone)]
pub struct TestOptions {
    /// Working directory the example is run from
    pub build_dir: PathBuf,

    /// Binary name without extension
    pub example_name: String,

    /// Directory of imported shared libraries, added to the loader path
    pub runtime_dir: PathBuf,
}

impl TestOptions {
    pub fn new(build_dir: impl Into<PathBuf>) -> Self {
        let build_dir = build_dir.into();
        TestOptions {
            runtime_dir: build_dir.join(RUNTIME_DIR),
            build_dir,
            example_name: EXAMPLE_NAME.to_string(),
        }
    }
}

/// Outcome of a smoke test that did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TestResult {
    /// The example ran and exited 0
    Passed { command: String },
    /// The example was not run
    Skipped { reason: String },
}

impl TestResult {
    pub fn is_skipped(&self) -> bool {
        matches!(self, TestResult::Skipped { .. })
    }
}

/// Options for the full pipeline.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    pub settings: Settings,
    pub imports: ImportOptions,
    pub build: BuildOptions,
    pub test: TestOptions,
}

impl VerifyOptions {
    /// Standard layout: the run directory is `build_dir`, and the example's
    /// sources live in `source_dir`.
    pub fn new(
        settings: Settings,
        package_folder: &Path,
        source_dir: &Path,
        build_dir: &Path,
    ) -> Self {
        VerifyOptions {
            settings,
            imports: ImportOptions::new(package_folder, build_dir),
            build: BuildOptions::new(source_dir, build_dir),
            test: TestOptions::new(build_dir),
        }
    }
}
