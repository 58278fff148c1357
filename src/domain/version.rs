use crate::error::{ReleaseError, Result};
use std::fmt;

/// Module set version as written in the versioning file (e.g. "v1.2.0")
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ModuleVersion {
    inner: semver::Version,
}

impl ModuleVersion {
    /// Parse a version string, requiring the leading 'v'
    pub fn parse(raw: &str) -> Result<Self> {
        let stripped = raw.strip_prefix('v').ok_or_else(|| {
            ReleaseError::version(format!("'{}' must start with 'v' (e.g. v1.2.3)", raw))
        })?;

        let inner = semver::Version::parse(stripped).map_err(|e| {
            ReleaseError::version(format!("'{}' is not a semantic version: {}", raw, e))
        })?;

        Ok(ModuleVersion { inner })
    }

    /// Major version in the "v<major>" form used to group stable sets
    pub fn major_label(&self) -> String {
        format!("v{}", self.inner.major)
    }

    /// Stable means major >= 1 with no pre-release or build metadata
    pub fn is_stable(&self) -> bool {
        self.inner.major >= 1 && self.inner.pre.is_empty() && self.inner.build.is_empty()
    }
}

impl fmt::Display for ModuleVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.inner)
    }
}

/// Returns true if `raw` parses and is a stable version.
///
/// Unparsable versions are never stable.
pub fn is_stable_version(raw: &str) -> bool {
    ModuleVersion::parse(raw)
        .map(|v| v.is_stable())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parse() {
        let v = ModuleVersion::parse("v1.2.3").unwrap();
        assert_eq!(v.major_label(), "v1");
        assert_eq!(v.to_string(), "v1.2.3");
    }

    #[test]
    fn test_version_requires_v_prefix() {
        let err = ModuleVersion::parse("1.2.3").unwrap_err();
        assert!(matches!(err, ReleaseError::InvalidVersion(_)));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(ModuleVersion::parse("v1.2").is_err());
        assert!(ModuleVersion::parse("v1.2.3.4").is_err());
        assert!(ModuleVersion::parse("vfoo").is_err());
        assert!(ModuleVersion::parse("").is_err());
    }

    #[test]
    fn test_prerelease_and_build_are_unstable() {
        assert!(is_stable_version("v1.0.0"));
        assert!(is_stable_version("v2.4.1"));
        assert!(!is_stable_version("v0.9.0"));
        assert!(!is_stable_version("v1.0.0-rc.1"));
        assert!(!is_stable_version("v1.0.0+build.5"));
        assert!(!is_stable_version("not-a-version"));
    }

    #[test]
    fn test_major_label() {
        let v = ModuleVersion::parse("v3.1.0-beta").unwrap();
        assert_eq!(v.major_label(), "v3");
    }
}
