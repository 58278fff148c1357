//! Loader for the module set versioning file (`versions.yaml`).

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::error::{ReleaseError, Result};

/// Default versioning file name, resolved against the repository root
pub const DEFAULT_VERSIONING_FILE: &str = "versions.yaml";

/// One module set as declared in the versioning file
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ModuleSetConfig {
    pub version: String,
    #[serde(default)]
    pub modules: Vec<String>,
}

/// Raw contents of the versioning file: set name -> set definition
#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct VersioningConfig {
    pub module_sets: BTreeMap<String, ModuleSetConfig>,
}

impl VersioningConfig {
    /// Reads and parses the versioning file at `path`.
    ///
    /// # Returns
    /// * `Ok(VersioningConfig)` - Parsed module sets
    /// * `Err(ConfigParse)` - If the file is absent, empty or malformed
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            ReleaseError::config(format!(
                "could not read versioning file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&contents).map_err(|e| match e {
            ReleaseError::ConfigParse(msg) => {
                ReleaseError::config(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    /// Parses versioning file contents
    pub fn parse(contents: &str) -> Result<Self> {
        if contents.trim().is_empty() {
            return Err(ReleaseError::config("versioning file is empty"));
        }

        serde_yaml::from_str(contents)
            .map_err(|e| ReleaseError::config(format!("invalid versioning file: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
stable-v1:
  version: v1.2.0
  modules:
    - example.com/repo
    - example.com/repo/sdk
experimental:
  version: v0.5.0
  modules:
    - example.com/repo/contrib/x
"#;

    #[test]
    fn test_parse_sets() {
        let config = VersioningConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.module_sets.len(), 2);

        let stable = &config.module_sets["stable-v1"];
        assert_eq!(stable.version, "v1.2.0");
        assert_eq!(
            stable.modules,
            vec!["example.com/repo", "example.com/repo/sdk"]
        );
    }

    #[test]
    fn test_empty_file_is_error() {
        let err = VersioningConfig::parse("   \n").unwrap_err();
        assert!(matches!(err, ReleaseError::ConfigParse(_)));
    }

    #[test]
    fn test_unknown_field_is_error() {
        let yaml = "set:\n  version: v1.0.0\n  modules: []\n  owner: me\n";
        assert!(VersioningConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_missing_version_is_error() {
        let yaml = "set:\n  modules:\n    - example.com/a\n";
        assert!(VersioningConfig::parse(yaml).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = VersioningConfig::load(Path::new("/nonexistent/versions.yaml")).unwrap_err();
        assert!(matches!(err, ReleaseError::ConfigParse(_)));
        assert!(err.to_string().contains("/nonexistent/versions.yaml"));
    }
}
