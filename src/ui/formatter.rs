//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic. Functions here only
//! print; they never read input.

use console::style;

use crate::verify::VerificationReport;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Display an advisory warning.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Print a `PASS:` line.
pub fn display_pass(message: &str) {
    println!("{} {}", style("PASS:").green().bold(), message);
}

/// One line of `verify` output, before styling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportLine {
    Pass(String),
    Error(String),
    Warning(String),
}

/// Lines describing a verification run, in print order.
///
/// Failing checks yield one error per finding, passing checks a pass line,
/// and warnings follow the checks.
pub fn report_lines(report: &VerificationReport) -> Vec<ReportLine> {
    let mut lines = Vec::new();

    for outcome in &report.outcomes {
        if outcome.passed() {
            lines.push(ReportLine::Pass(outcome.check.pass_message().to_string()));
        } else {
            for error in &outcome.errors {
                lines.push(ReportLine::Error(format!(
                    "{} check failed: {}",
                    outcome.check, error
                )));
            }
        }
    }

    for warning in &report.warnings {
        lines.push(ReportLine::Warning(warning.to_string()));
    }

    if report.passed() {
        lines.push(ReportLine::Pass(
            "Module sets successfully verified.".to_string(),
        ));
    }

    lines
}

/// Print every diagnostic of a verification run.
pub fn display_verification_report(report: &VerificationReport) {
    for line in report_lines(report) {
        match line {
            ReportLine::Pass(message) => display_pass(&message),
            ReportLine::Error(message) => display_error(&message),
            ReportLine::Warning(message) => display_warning(&message),
        }
    }
}

/// Print the follow-up steps after a successful prerelease.
pub fn display_prerelease_next_steps(base_branch: &str, branch: &str) {
    println!(
        "\n{}",
        style("Prerelease finished successfully. Now run the following to verify the changes:")
            .bold()
    );
    println!("\n  {}\n", style(format!("git diff {}", base_branch)).cyan());
    println!("Then, push the branch {} to upstream.", style(branch).cyan());
}
