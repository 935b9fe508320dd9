//! Output formatting for verification results (human/JSON/GitHub).

use std::fmt::Write as _;

use super::types::{OutputFormat, StepStatus, VerifyResult};

/// Format verification result for display (human-readable).
pub fn format_result(result: &VerifyResult, verbose: bool) -> String {
    let mut output = String::new();

    writeln!(output, "Verify: {}", result.settings).unwrap();
    if result.cross_building {
        writeln!(output, "(cross building)").unwrap();
    }
    writeln!(output, "{}", "=".repeat(50)).unwrap();
    writeln!(output).unwrap();

    for step in &result.steps {
        writeln!(
            output,
            "  {} {} ({:.2?})",
            step.status.label(),
            step.name,
            step.duration
        )
        .unwrap();

        if verbose || step.status != StepStatus::Passed {
            for line in step.message.lines() {
                writeln!(output, "      {}", line).unwrap();
            }
        }
    }

    writeln!(output).unwrap();

    let status = if result.passed { "PASSED" } else { "FAILED" };
    write!(
        output,
        "Result: {} ({}/{} steps passed",
        status,
        result.passed_count(),
        result.steps.len()
    )
    .unwrap();
    if result.skipped_count() > 0 {
        write!(output, ", {} skipped", result.skipped_count()).unwrap();
    }
    writeln!(output, ")").unwrap();
    writeln!(output, "Total time: {:.2?}", result.total_duration).unwrap();

    if !result.artifacts.is_empty() {
        writeln!(output, "\nImported:").unwrap();
        for artifact in &result.artifacts {
            writeln!(output, "  - {}", artifact.display()).unwrap();
        }
    }

    output
}

/// Format verification result as JSON.
pub fn format_result_json(result: &VerifyResult) -> String {
    serde_json::to_string_pretty(result)
        .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize result: {}"}}"#, e))
}

/// Format verification result for GitHub Actions.
///
/// Outputs:
/// - `::error::` annotations for failed steps, `::notice::` for skipped ones
/// - Job summary in markdown format
pub fn format_result_github_actions(result: &VerifyResult) -> String {
    let mut output = String::new();

    for step in &result.steps {
        // Escape newlines for GitHub Actions annotation format
        let escaped_msg = step.message.replace('\n', "%0A").replace('\r', "");
        match step.status {
            StepStatus::Failed => {
                writeln!(output, "::error title={}::{}", step.name, escaped_msg).unwrap();
            }
            StepStatus::Skipped => {
                writeln!(output, "::notice title={}::{}", step.name, escaped_msg).unwrap();
            }
            StepStatus::Passed => {}
        }
    }

    writeln!(output, "::group::Verification Summary").unwrap();
    writeln!(output).unwrap();
    writeln!(output, "## {}", result.settings).unwrap();
    writeln!(output).unwrap();

    writeln!(output, "| Step | Status | Duration |").unwrap();
    writeln!(output, "|------|--------|----------|").unwrap();
    for step in &result.steps {
        let status = match step.status {
            StepStatus::Passed => ":white_check_mark:",
            StepStatus::Skipped => ":fast_forward:",
            StepStatus::Failed => ":x:",
        };
        writeln!(output, "| {} | {} | {:.2?} |", step.name, status, step.duration).unwrap();
    }
    writeln!(output).unwrap();

    let overall_status = if result.passed { "PASSED" } else { "FAILED" };
    let overall_emoji = if result.passed {
        ":heavy_check_mark:"
    } else {
        ":x:"
    };
    writeln!(
        output,
        "**Result:** {} {} ({}/{} steps passed)",
        overall_emoji,
        overall_status,
        result.passed_count(),
        result.steps.len()
    )
    .unwrap();
    writeln!(output, "**Total time:** {:.2?}", result.total_duration).unwrap();

    let failed_steps: Vec<_> = result
        .steps
        .iter()
        .filter(|s| s.status == StepStatus::Failed)
        .collect();
    if !failed_steps.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "### Failed Steps").unwrap();
        for step in failed_steps {
            writeln!(output).unwrap();
            writeln!(output, "<details>").unwrap();
            writeln!(output, "<summary>{}</summary>", step.name).unwrap();
            writeln!(output).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output, "{}", step.message).unwrap();
            writeln!(output, "```").unwrap();
            writeln!(output).unwrap();
            writeln!(output, "</details>").unwrap();
        }
    }

    writeln!(output, "::endgroup::").unwrap();

    output
}

/// Format the result according to the specified output format.
pub fn format_result_for_output(
    result: &VerifyResult,
    format: OutputFormat,
    verbose: bool,
) -> String {
    match format {
        OutputFormat::Human => format_result(result, verbose),
        OutputFormat::Json => format_result_json(result),
        OutputFormat::Github => format_result_github_actions(result),
    }
}
