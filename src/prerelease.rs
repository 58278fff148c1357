//! Steps of the prerelease workflow.
//!
//! Each step either succeeds or returns the error that aborts the command;
//! nothing here retries or undoes earlier steps. The sequencing lives in
//! [`crate::cli::orchestration::run_prerelease`].

use git2::Oid;
use tracing::{debug, info};

use crate::config::Settings;
use crate::domain::ModuleFilePath;
use crate::error::{ReleaseError, Result};
use crate::exec::ExternalCommand;
use crate::git::Repository;
use crate::manifest::VersionRewriter;
use crate::module_info::{ModuleVersioningInfo, ReleasePlan};
use crate::ui;

/// Prepares manifests and a commit on a fresh branch for releasing one module set
pub struct Prerelease<'a, R: Repository> {
    repo: &'a R,
    info: &'a ModuleVersioningInfo,
    settings: &'a Settings,
    plan: ReleasePlan,
}

impl<'a, R: Repository> Prerelease<'a, R> {
    /// Resolves the target version, modules and tag names for the requested set
    pub fn new(repo: &'a R, info: &'a ModuleVersioningInfo, settings: &'a Settings) -> Result<Self> {
        let plan = info.release_plan(&settings.module_set_name)?;
        debug!(set = %plan.module_set_name, version = %plan.version, "resolved release plan");

        Ok(Prerelease {
            repo,
            info,
            settings,
            plan,
        })
    }

    pub fn plan(&self) -> &ReleasePlan {
        &self.plan
    }

    /// Fails if any tag for the new version already exists
    pub fn verify_git_tags_do_not_already_exist(&self) -> Result<()> {
        for full_tag in self.plan.full_tags() {
            if self.repo.tag_exists(&full_tag)? {
                return Err(ReleaseError::TagAlreadyExists(full_tag));
            }
        }
        Ok(())
    }

    /// Fails if the working tree has changes not in the index
    pub fn verify_working_tree_clean(&self) -> Result<()> {
        let changes = self.repo.unstaged_changes()?;
        if changes.is_empty() {
            return Ok(());
        }

        Err(ReleaseError::DirtyWorkingTree(changes.join("\n")))
    }

    /// Creates and switches to `pre_release_<set>_<version>` based on `from_branch`
    pub fn create_prerelease_branch(&self, from_branch: &str) -> Result<String> {
        let branch_name = self.plan.branch_name();
        ui::display_status(&format!(
            "Creating branch {} from {}",
            branch_name, from_branch
        ));

        self.repo
            .create_branch_and_checkout(&branch_name, from_branch)?;
        Ok(branch_name)
    }

    /// Rewrites requirements on the set's modules in every manifest in the repository.
    ///
    /// Returns the manifests that changed.
    pub fn update_all_manifests(&self) -> Result<Vec<ModuleFilePath>> {
        ui::display_status("Updating all module versions in manifest files...");
        let rewriter = VersionRewriter::new(&self.plan.module_paths, &self.plan.version)?;

        let mut updated = Vec::new();
        for mod_file in self.info.mod_path_map.values() {
            let changed = rewriter.rewrite_file(mod_file.as_path()).map_err(|e| {
                ReleaseError::discovery(format!(
                    "could not update module versions in file {}: {}",
                    mod_file, e
                ))
            })?;
            if changed {
                debug!(file = %mod_file, "rewrote manifest");
                updated.push(mod_file.clone());
            }
        }

        info!(count = updated.len(), "manifests updated");
        Ok(updated)
    }

    /// Runs the configured build-consistency command
    pub fn run_lint(&self) -> Result<()> {
        let command = ExternalCommand::new(self.settings.config.lint_command.iter().cloned());
        ui::display_status(&format!("Running '{}'...", command));
        command.run_in(self.info.repo_root())?;
        Ok(())
    }

    /// Stages everything, optionally runs the full verification command, then commits
    pub fn commit_changes(&self, skip_make: bool) -> Result<Oid> {
        self.repo.stage_all()?;

        if skip_make {
            ui::display_status("Skipping full verification command...");
        } else {
            let command = ExternalCommand::new(self.settings.config.ci_command.iter().cloned());
            ui::display_status(&format!("Running '{}'...", command));
            command.run_in(self.info.repo_root())?;
        }

        let message = self.plan.commit_message();
        ui::display_status(&format!(
            "Commit changes to git with message '{}'...",
            message
        ));
        let oid = self.repo.commit(&message)?;

        ui::display_success(&format!("Commit successful. Hash of commit: {}", oid));
        Ok(oid)
    }
}
