use std::fmt;

/// Advisory findings reported by `verify`.
/// These are non-fatal issues that never fail the command.
#[derive(Debug, Clone, PartialEq)]
pub enum VerificationWarning {
    /// A module in a stable set requires a tracked module whose set is unstable
    UnstableDependency {
        module: String,
        module_version: String,
        dependency: String,
        dependency_version: String,
    },
    /// A stable module's manifest could not be read for the dependency check
    UnreadableManifest { module: String, reason: String },
}

impl fmt::Display for VerificationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VerificationWarning::UnstableDependency {
                module,
                module_version,
                dependency,
                dependency_version,
            } => write!(
                f,
                "Stable module {} ({}) depends on unstable module {} ({}).",
                module, module_version, dependency, dependency_version
            ),
            VerificationWarning::UnreadableManifest { module, reason } => {
                write!(
                    f,
                    "Could not check dependencies of module {}: {}",
                    module, reason
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unstable_dependency_names_both_modules() {
        let warning = VerificationWarning::UnstableDependency {
            module: "example.com/repo/sdk".to_string(),
            module_version: "v1.2.0".to_string(),
            dependency: "example.com/repo/contrib/x".to_string(),
            dependency_version: "v0.5.0".to_string(),
        };

        assert_eq!(
            warning.to_string(),
            "Stable module example.com/repo/sdk (v1.2.0) depends on unstable module \
             example.com/repo/contrib/x (v0.5.0)."
        );
    }

    #[test]
    fn test_unreadable_manifest_display() {
        let warning = VerificationWarning::UnreadableManifest {
            module: "example.com/a".to_string(),
            reason: "missing module directive".to_string(),
        };
        let msg = warning.to_string();
        assert!(msg.contains("example.com/a"));
        assert!(msg.contains("missing module directive"));
    }
}
