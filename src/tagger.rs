//! Applies or deletes the Git tags of every module in a set.

use git2::Oid;
use tracing::{info, warn};

use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use crate::module_info::{ModuleVersioningInfo, ReleasePlan};
use crate::saga::TagSaga;
use crate::ui;

pub struct Tagger<'a, R: Repository> {
    repo: &'a R,
    plan: ReleasePlan,
}

impl<'a, R: Repository> Tagger<'a, R> {
    /// The version comes from the versioning file, never from the caller
    pub fn new(repo: &'a R, info: &ModuleVersioningInfo, module_set_name: &str) -> Result<Self> {
        let plan = info.release_plan(module_set_name)?;
        Ok(Tagger { repo, plan })
    }

    /// Resolves `revision` to a full commit id reachable from the current branch.
    ///
    /// # Returns
    /// * `Err(CommitNotFound)` - If it cannot be resolved or is not an ancestor of HEAD
    pub fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        let oid = self.repo.resolve_commit(revision)?;

        if !self.repo.is_ancestor_of_head(oid)? {
            return Err(ReleaseError::commit_not_found(format!(
                "commit {} (complete SHA: {}) not found on this branch",
                revision, oid
            )));
        }

        Ok(oid)
    }

    /// Tags `commit` for every module in the set, in declared order.
    ///
    /// All or nothing: if one tag fails, tags created so far are deleted.
    pub fn tag_all_modules(&self, commit: Oid) -> Result<Vec<String>> {
        ui::display_status(&format!("Tagging commit {}:", commit));
        let mut saga = TagSaga::new(self.repo);

        for full_tag in self.plan.full_tags() {
            ui::display_status(&full_tag);
            let message = format!("Version {}", full_tag);

            if let Err(failure) = saga.create_tag(&full_tag, commit, &message) {
                warn!(tag = %full_tag, error = %failure, "tag creation failed, rolling back");
                ui::display_error("error creating a tag, removing all newly created tags...");

                return match saga.rollback() {
                    Ok(()) => Err(failure),
                    Err(compensation) => Err(ReleaseError::TagRollback {
                        failure: Box::new(failure),
                        compensation: Box::new(compensation),
                    }),
                };
            }
        }

        let created = saga.finish();
        info!(count = created.len(), "created module tags");
        Ok(created)
    }

    /// Deletes the set's tags for its current version, stopping at the first failure
    pub fn delete_module_set_tags(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();

        for full_tag in self.plan.full_tags() {
            ui::display_status(&format!("Deleting tag {}", full_tag));
            self.repo.delete_tag(&full_tag)?;
            deleted.push(full_tag);
        }

        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;
    use crate::versions::VersioningConfig;
    use std::fs;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, ModuleVersioningInfo) {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("go.mod"), "module example.com/root\n").unwrap();
        fs::create_dir_all(dir.path().join("sub/x")).unwrap();
        fs::write(dir.path().join("sub/x/go.mod"), "module example.com/root/sub/x\n").unwrap();

        let config = VersioningConfig::parse(
            "main:\n  version: v1.1.0\n  modules: [example.com/root, example.com/root/sub/x]\n",
        )
        .unwrap();
        let info = ModuleVersioningInfo::from_config(&config, dir.path(), "go.mod").unwrap();
        (dir, info)
    }

    #[test]
    fn test_root_module_is_tagged_with_bare_version() {
        let (_dir, info) = fixture();
        let git = MockRepository::new();
        let tagger = Tagger::new(&git, &info, "main").unwrap();

        let tags = tagger.tag_all_modules(MockRepository::oid(1)).unwrap();

        assert_eq!(tags, vec!["v1.1.0", "sub/x/v1.1.0"]);
        assert_eq!(git.tags(), vec!["sub/x/v1.1.0", "v1.1.0"]);
    }

    #[test]
    fn test_existing_tag_triggers_rollback() {
        let (_dir, info) = fixture();
        let git = MockRepository::new();
        git.add_tag("sub/x/v1.1.0", MockRepository::oid(3));
        let tagger = Tagger::new(&git, &info, "main").unwrap();

        assert!(tagger.tag_all_modules(MockRepository::oid(1)).is_err());
        assert_eq!(git.tags(), vec!["sub/x/v1.1.0"]);
    }

    #[test]
    fn test_resolve_commit_requires_ancestry() {
        let (_dir, info) = fixture();
        let git = MockRepository::new();
        git.add_commit("dangling", MockRepository::oid(5), false);
        let tagger = Tagger::new(&git, &info, "main").unwrap();

        assert_eq!(
            tagger.resolve_commit(&MockRepository::oid(1).to_string()).unwrap(),
            MockRepository::oid(1)
        );
        assert!(matches!(
            tagger.resolve_commit("dangling"),
            Err(ReleaseError::CommitNotFound(_))
        ));
    }
}
