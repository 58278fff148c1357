//! Read-only consistency checks over [`ModuleVersioningInfo`].
//!
//! The three checks are independent: all of them run and every finding is
//! collected, so one invocation reports everything that is wrong.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::domain::{is_stable_version, ModuleVersion};
use crate::error::ReleaseError;
use crate::manifest::Manifest;
use crate::module_info::ModuleVersioningInfo;
use crate::warning::VerificationWarning;

/// Identifies one of the verifier's checks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    SetCompleteness,
    VersionValidity,
    DependencyStability,
}

impl Check {
    /// Line printed when the check passes
    pub fn pass_message(&self) -> &'static str {
        match self {
            Check::SetCompleteness => "All modules exist in exactly one set.",
            Check::VersionValidity => {
                "All module versions are valid, and no module sets have same non-zero major version."
            }
            Check::DependencyStability => "Finished checking all stable modules' dependencies.",
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Check::SetCompleteness => "set completeness",
            Check::VersionValidity => "version validity",
            Check::DependencyStability => "dependency stability",
        };
        f.write_str(name)
    }
}

/// Result of a single check; it passed when `errors` is empty
#[derive(Debug)]
pub struct CheckOutcome {
    pub check: Check,
    pub errors: Vec<ReleaseError>,
}

impl CheckOutcome {
    pub fn passed(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Everything `verify` found
#[derive(Debug)]
pub struct VerificationReport {
    pub outcomes: Vec<CheckOutcome>,
    pub warnings: Vec<VerificationWarning>,
}

impl VerificationReport {
    /// True when no check produced an error; warnings never fail verification
    pub fn passed(&self) -> bool {
        self.outcomes.iter().all(CheckOutcome::passed)
    }
}

pub struct Verifier<'a> {
    info: &'a ModuleVersioningInfo,
}

impl<'a> Verifier<'a> {
    pub fn new(info: &'a ModuleVersioningInfo) -> Self {
        Verifier { info }
    }

    /// Runs all three checks
    pub fn run(&self) -> VerificationReport {
        let completeness = self.verify_all_modules_in_set();
        let versions = self.verify_versions();
        let warnings = self.verify_dependencies();

        VerificationReport {
            outcomes: vec![
                completeness,
                versions,
                CheckOutcome {
                    check: Check::DependencyStability,
                    errors: Vec::new(),
                },
            ],
            warnings,
        }
    }

    /// Every module on disk is declared in a set and every declared module exists on disk.
    pub fn verify_all_modules_in_set(&self) -> CheckOutcome {
        let mut errors = Vec::new();

        for (mod_path, mod_file) in &self.info.mod_path_map {
            if !self.info.mod_info_map.contains_key(mod_path) {
                errors.push(ReleaseError::inconsistent(format!(
                    "Module {} (defined in {}) is not contained in any module set.",
                    mod_path, mod_file
                )));
            }
        }

        for (mod_path, mod_info) in &self.info.mod_info_map {
            if !self.info.mod_path_map.contains_key(mod_path) {
                errors.push(ReleaseError::inconsistent(format!(
                    "Module {} in module set {} does not exist in the repository.",
                    mod_path, mod_info.module_set_name
                )));
            }
        }

        CheckOutcome {
            check: Check::SetCompleteness,
            errors,
        }
    }

    /// Set versions are valid semver and no two stable sets share a major version.
    pub fn verify_versions(&self) -> CheckOutcome {
        let mut errors = Vec::new();
        // major label ("v1") -> first set seen with that stable major
        let mut set_major_versions: BTreeMap<String, &str> = BTreeMap::new();

        for (set_name, module_set) in &self.info.mod_set_map {
            let version = match ModuleVersion::parse(&module_set.version) {
                Ok(version) => version,
                Err(e) => {
                    errors.push(ReleaseError::version(format!(
                        "Module set {} has invalid version string: {} ({})",
                        set_name, module_set.version, e
                    )));
                    continue;
                }
            };

            if !version.is_stable() {
                continue;
            }

            let major = version.major_label();
            match set_major_versions.get(&major) {
                Some(prev_set_name) => {
                    let prev_version = self
                        .info
                        .mod_set_map
                        .get(*prev_set_name)
                        .map(|s| s.version.as_str())
                        .unwrap_or_default();
                    errors.push(ReleaseError::version(format!(
                        "Multiple module sets have the same major version ({}): \
                         {} (version {}) and {} (version {})",
                        major, prev_set_name, prev_version, set_name, module_set.version
                    )));
                }
                None => {
                    set_major_versions.insert(major, set_name.as_str());
                }
            }
        }

        CheckOutcome {
            check: Check::VersionValidity,
            errors,
        }
    }

    /// Warns when a stable module requires a tracked module at an unstable version.
    ///
    /// Only direct requirements are inspected.
    pub fn verify_dependencies(&self) -> Vec<VerificationWarning> {
        let mut warnings = Vec::new();

        for (mod_path, mod_info) in &self.info.mod_info_map {
            if !is_stable_version(&mod_info.version) {
                continue;
            }

            // Missing manifests are reported by the completeness check.
            let Some(mod_file) = self.info.mod_path_map.get(mod_path) else {
                continue;
            };

            let manifest = match Manifest::load(mod_file.as_path()) {
                Ok(manifest) => manifest,
                Err(e) => {
                    warnings.push(VerificationWarning::UnreadableManifest {
                        module: mod_path.to_string(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            for requirement in &manifest.requires {
                let Some(dep_info) = self.info.mod_info_map.get(&requirement.path) else {
                    continue;
                };

                if !is_stable_version(&dep_info.version) {
                    debug!(module = %mod_path, dependency = %requirement.path, "unstable dependency");
                    warnings.push(VerificationWarning::UnstableDependency {
                        module: mod_path.to_string(),
                        module_version: mod_info.version.clone(),
                        dependency: requirement.path.to_string(),
                        dependency_version: dep_info.version.clone(),
                    });
                }
            }
        }

        warnings
    }
}
