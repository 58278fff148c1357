//! External command invocation (build checks, `git` CLI fallbacks).

use std::fmt;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{ReleaseError, Result};

/// A program plus arguments, run to completion in a working directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    argv: Vec<String>,
}

impl ExternalCommand {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ExternalCommand {
            argv: argv.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a whitespace-separated command line ("make lint")
    pub fn parse(line: &str) -> Self {
        Self::new(line.split_whitespace())
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    /// Run the command in `dir`, returning its stdout.
    ///
    /// Any spawn failure or non-zero exit becomes an `ExternalCommand` error
    /// carrying the combined stdout and stderr.
    pub fn run_in(&self, dir: &Path) -> Result<String> {
        let (program, args) = self
            .argv
            .split_first()
            .ok_or_else(|| ReleaseError::external("<empty>", "no program given"))?;

        debug!(command = %self, dir = %dir.display(), "running external command");

        let output = Command::new(program)
            .args(args)
            .current_dir(dir)
            .output()
            .map_err(|e| ReleaseError::external(self.to_string(), e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReleaseError::external(
                self.to_string(),
                format!(
                    "exit code {}\nStdout: {}\nStderr: {}",
                    output.status.code().unwrap_or(-1),
                    stdout,
                    stderr
                ),
            ));
        }

        Ok(stdout)
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}
