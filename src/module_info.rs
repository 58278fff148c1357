//! Derived module indices built from the versioning file and a disk scan.
//!
//! Two maps are kept apart on purpose: [`ModInfoMap`] comes from what the
//! versioning file declares, [`ModPathMap`] from what manifests exist on
//! disk. The verifier reconciles them.

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::domain::{
    combine_tag_names_and_version, ModuleFilePath, ModuleInfo, ModulePath, ModuleSet,
    ModuleTagName,
};
use crate::error::{ReleaseError, Result};
use crate::manifest::Manifest;
use crate::versions::VersioningConfig;

/// Module path -> containing set name and version
pub type ModInfoMap = BTreeMap<ModulePath, ModuleInfo>;
/// Module path -> manifest file on disk
pub type ModPathMap = BTreeMap<ModulePath, ModuleFilePath>;
/// Set name -> module set
pub type ModSetMap = BTreeMap<String, ModuleSet>;

/// Everything known about the repository's versioned modules
#[derive(Debug, Clone)]
pub struct ModuleVersioningInfo {
    pub mod_set_map: ModSetMap,
    pub mod_info_map: ModInfoMap,
    pub mod_path_map: ModPathMap,
    repo_root: PathBuf,
}

/// Version, modules and tag names affected by releasing one module set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePlan {
    pub module_set_name: String,
    pub version: String,
    pub module_paths: Vec<ModulePath>,
    pub tag_names: Vec<ModuleTagName>,
}

impl ReleasePlan {
    /// Full tag names ("<tag name>/<version>") in declared member order
    pub fn full_tags(&self) -> Vec<String> {
        combine_tag_names_and_version(&self.tag_names, &self.version)
    }

    /// Name of the branch the prerelease workflow creates
    pub fn branch_name(&self) -> String {
        format!("pre_release_{}_{}", self.module_set_name, self.version)
    }

    /// Message of the commit the prerelease workflow creates
    pub fn commit_message(&self) -> String {
        format!("Prepare for releasing {}", self.version)
    }
}

impl ModuleVersioningInfo {
    /// Loads the versioning file and scans `repo_root` for manifests.
    ///
    /// # Returns
    /// * `Err(ConfigParse)` - If the versioning file is absent or malformed
    /// * `Err(InconsistentModuleSet)` - If a module is listed in more than one set
    /// * `Err(ModuleDiscovery)` - If manifests cannot be enumerated or parsed
    pub fn load(versioning_file: &Path, repo_root: &Path, manifest_file_name: &str) -> Result<Self> {
        let config = VersioningConfig::load(versioning_file)?;
        Self::from_config(&config, repo_root, manifest_file_name)
    }

    /// Builds the indices from an already-parsed versioning file
    pub fn from_config(
        config: &VersioningConfig,
        repo_root: &Path,
        manifest_file_name: &str,
    ) -> Result<Self> {
        let (mod_set_map, mod_info_map) = build_set_indices(config)?;
        let mod_path_map = discover_modules(repo_root, manifest_file_name)?;

        debug!(
            sets = mod_set_map.len(),
            declared = mod_info_map.len(),
            discovered = mod_path_map.len(),
            "built module versioning info"
        );

        Ok(ModuleVersioningInfo {
            mod_set_map,
            mod_info_map,
            mod_path_map,
            repo_root: repo_root.to_path_buf(),
        })
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }

    /// Tag name of the module whose manifest lives at `file`
    pub fn tag_name_for(&self, file: &ModuleFilePath) -> Result<ModuleTagName> {
        tag_name_for(&self.repo_root, file)
    }

    /// Resolves the version, members and tag names for releasing `module_set_name`
    pub fn release_plan(&self, module_set_name: &str) -> Result<ReleasePlan> {
        let module_set = self
            .mod_set_map
            .get(module_set_name)
            .ok_or_else(|| ReleaseError::UnknownModuleSet(module_set_name.to_string()))?;

        let mut tag_names = Vec::with_capacity(module_set.modules.len());
        for module_path in &module_set.modules {
            let file = self.mod_path_map.get(module_path).ok_or_else(|| {
                ReleaseError::inconsistent(format!(
                    "module {} in module set {} was not found in the repository",
                    module_path, module_set_name
                ))
            })?;
            tag_names.push(self.tag_name_for(file)?);
        }

        Ok(ReleasePlan {
            module_set_name: module_set_name.to_string(),
            version: module_set.version.clone(),
            module_paths: module_set.modules.clone(),
            tag_names,
        })
    }
}

fn build_set_indices(config: &VersioningConfig) -> Result<(ModSetMap, ModInfoMap)> {
    let mut mod_set_map = ModSetMap::new();
    let mut mod_info_map = ModInfoMap::new();

    for (set_name, set_config) in &config.module_sets {
        let modules: Vec<ModulePath> = set_config
            .modules
            .iter()
            .map(|m| ModulePath::new(m.as_str()))
            .collect();

        for module_path in &modules {
            if let Some(existing) = mod_info_map.get(module_path) {
                return Err(ReleaseError::inconsistent(format!(
                    "module {} is listed in both {} and {}",
                    module_path, existing.module_set_name, set_name
                )));
            }
            mod_info_map.insert(
                module_path.clone(),
                ModuleInfo {
                    module_set_name: set_name.clone(),
                    version: set_config.version.clone(),
                },
            );
        }

        mod_set_map.insert(
            set_name.clone(),
            ModuleSet {
                name: set_name.clone(),
                version: set_config.version.clone(),
                modules,
            },
        );
    }

    Ok((mod_set_map, mod_info_map))
}

/// Walks `repo_root` and maps every manifest's module path to its file.
///
/// Hidden directories such as `.git` are skipped.
pub fn discover_modules(repo_root: &Path, manifest_file_name: &str) -> Result<ModPathMap> {
    let mut mod_path_map = ModPathMap::new();

    let walker = WalkDir::new(repo_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| {
            ReleaseError::discovery(format!(
                "could not walk {}: {}",
                repo_root.display(),
                e
            ))
        })?;

        if !entry.file_type().is_file() || entry.file_name() != manifest_file_name {
            continue;
        }

        let manifest = Manifest::load(entry.path()).map_err(|e| match e {
            ReleaseError::Io(io) => ReleaseError::discovery(format!(
                "could not read {}: {}",
                entry.path().display(),
                io
            )),
            other => other,
        })?;

        let file = ModuleFilePath::new(entry.path());
        if let Some(previous) = mod_path_map.get(&manifest.module_path) {
            return Err(ReleaseError::discovery(format!(
                "module {} is declared by both {} and {}",
                manifest.module_path, previous, file
            )));
        }

        debug!(module = %manifest.module_path, file = %file, "discovered module");
        mod_path_map.insert(manifest.module_path, file);
    }

    Ok(mod_path_map)
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

fn tag_name_for(repo_root: &Path, file: &ModuleFilePath) -> Result<ModuleTagName> {
    let dir = file.as_path().parent().unwrap_or_else(|| Path::new(""));
    let relative = dir.strip_prefix(repo_root).map_err(|_| {
        ReleaseError::discovery(format!(
            "manifest {} is outside the repository root {}",
            file,
            repo_root.display()
        ))
    })?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();

    if parts.is_empty() {
        Ok(ModuleTagName::repo_root())
    } else {
        Ok(ModuleTagName::new(parts.join("/")))
    }
}
