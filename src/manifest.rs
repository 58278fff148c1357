//! Module manifest (go.mod-style) parsing and version rewriting.
//!
//! A manifest declares the module's identity with a `module <path>` line and
//! its dependencies with `require <path> <version>` lines or `require ( ... )`
//! blocks. Other directives are ignored.

use regex::{Captures, Regex};
use std::fs;
use std::path::Path;

use crate::domain::ModulePath;
use crate::error::{ReleaseError, Result};

/// Default manifest file name looked for during discovery
pub const DEFAULT_MANIFEST_FILE_NAME: &str = "go.mod";

/// A single declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub path: ModulePath,
    pub version: String,
}

/// Parsed manifest contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub module_path: ModulePath,
    pub requires: Vec<Requirement>,
}

impl Manifest {
    /// Reads and parses the manifest at `path`
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
            .map_err(|e| ReleaseError::discovery(format!("{}: {}", path.display(), e)))
    }

    /// Parses manifest text.
    ///
    /// Exactly one `module` directive is required.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut module_path: Option<ModulePath> = None;
        let mut requires = Vec::new();
        let mut block: Option<String> = None;

        for raw_line in contents.lines() {
            let line = strip_comment(raw_line).trim();
            if line.is_empty() {
                continue;
            }

            let tokens: Vec<&str> = line.split_whitespace().collect();

            if let Some(directive) = block.as_deref() {
                if line == ")" {
                    block = None;
                } else if directive == "require" {
                    if let Some(req) = requirement_from_tokens(&tokens) {
                        requires.push(req);
                    }
                }
                continue;
            }

            match tokens.as_slice() {
                [directive, "("] => block = Some((*directive).to_string()),
                ["module", path] => {
                    if module_path.is_some() {
                        return Err(ReleaseError::discovery("multiple module directives"));
                    }
                    module_path = Some(ModulePath::new(unquote(path)));
                }
                ["require", rest @ ..] => {
                    if let Some(req) = requirement_from_tokens(rest) {
                        requires.push(req);
                    }
                }
                _ => {}
            }
        }

        let module_path =
            module_path.ok_or_else(|| ReleaseError::discovery("missing module directive"))?;

        Ok(Manifest {
            module_path,
            requires,
        })
    }
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn unquote(token: &str) -> &str {
    token.trim_matches('"')
}

fn requirement_from_tokens(tokens: &[&str]) -> Option<Requirement> {
    match tokens {
        [path, version, ..] => Some(Requirement {
            path: ModulePath::new(unquote(path)),
            version: (*version).to_string(),
        }),
        _ => None,
    }
}

/// Rewrites `<module path> v<semver>` declarations to a new version.
///
/// The path must be preceded by start of line or whitespace and the version
/// followed by whitespace or end of line, so `example.com/a` never matches
/// `example.com/a/b`. Rewriting already-updated text is a no-op.
pub struct VersionRewriter {
    patterns: Vec<(Regex, String)>,
}

impl VersionRewriter {
    pub fn new(module_paths: &[ModulePath], new_version: &str) -> Result<Self> {
        let patterns = module_paths
            .iter()
            .map(|path| {
                let pattern = format!(
                    r"(?m)(^|\s){} v\d+\.\d+\.\d+(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?(\s|$)",
                    regex::escape(path.as_str())
                );
                let re = Regex::new(&pattern).map_err(|e| {
                    ReleaseError::config(format!("error compiling regex for {}: {}", path, e))
                })?;
                Ok((re, format!("{} {}", path, new_version)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(VersionRewriter { patterns })
    }

    /// Returns `contents` with every matching declaration updated
    pub fn rewrite(&self, contents: &str) -> String {
        let mut updated = contents.to_string();
        for (re, replacement) in &self.patterns {
            updated = re
                .replace_all(&updated, |caps: &Captures| {
                    format!("{}{}{}", &caps[1], replacement, &caps[2])
                })
                .into_owned();
        }
        updated
    }

    /// Rewrites a manifest file in place.
    ///
    /// Files without matching lines are not written. Returns whether the file changed.
    pub fn rewrite_file(&self, path: &Path) -> Result<bool> {
        let contents = fs::read_to_string(path)?;
        let updated = self.rewrite(&contents);
        if updated == contents {
            return Ok(false);
        }

        fs::write(path, updated)?;
        Ok(true)
    }
}
