use std::fmt;
use std::path::{Path, PathBuf};

/// Unique identifier of a module (its import path)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModulePath(String);

impl ModulePath {
    pub fn new(path: impl Into<String>) -> Self {
        ModulePath(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(path: &str) -> Self {
        ModulePath(path.to_string())
    }
}

/// Location of a module's manifest file on disk
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleFilePath(PathBuf);

impl ModuleFilePath {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ModuleFilePath(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ModuleFilePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Set membership and version of a single declared module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    pub module_set_name: String,
    pub version: String,
}

/// Named group of modules released together under one version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSet {
    pub name: String,
    pub version: String,
    pub modules: Vec<ModulePath>,
}
