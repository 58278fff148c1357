//! User interface module - console output for the release commands.
//!
//! Diagnostic logging goes through `tracing`; this module is for what the
//! person running the release reads.

pub mod formatter;

// Re-export formatter functions for convenience
pub use formatter::{
    display_error, display_pass, display_prerelease_next_steps, display_status, display_success,
    display_verification_report, display_warning, report_lines, ReportLine,
};
