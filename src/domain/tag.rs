use std::fmt;

/// Git tag prefix for a module: its manifest directory relative to the repo root.
///
/// The root module has an empty tag name, so its tags are bare versions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleTagName(String);

impl ModuleTagName {
    pub fn new(name: impl Into<String>) -> Self {
        ModuleTagName(name.into())
    }

    /// Tag name of the module living at the repository root
    pub fn repo_root() -> Self {
        ModuleTagName(String::new())
    }

    pub fn is_repo_root(&self) -> bool {
        self.0.is_empty()
    }

    /// Full tag for a version: "<name>/<version>", or "<version>" at the root
    pub fn full_tag(&self, version: &str) -> String {
        if self.is_repo_root() {
            version.to_string()
        } else {
            format!("{}/{}", self.0, version)
        }
    }
}

impl fmt::Display for ModuleTagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Combine every tag name with the version, preserving order
pub fn combine_tag_names_and_version(tag_names: &[ModuleTagName], version: &str) -> Vec<String> {
    tag_names.iter().map(|t| t.full_tag(version)).collect()
}
