use crate::error::{ReleaseError, Result};
use crate::exec::ExternalCommand;
use git2::build::CheckoutBuilder;
use git2::{BranchType, DiffOptions, ErrorCode, IndexAddOption, Oid, Repository as Git2Repo};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    sign_tags: bool,
}

impl Git2Repository {
    /// Open or discover a git repository containing `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository {
            repo,
            sign_tags: false,
        })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository {
            repo,
            sign_tags: false,
        }
    }

    /// Sign created tags with the user's key.
    ///
    /// libgit2 cannot sign tags, so signed tags are created through the git CLI.
    pub fn with_tag_signing(mut self, sign_tags: bool) -> Self {
        self.sign_tags = sign_tags;
        self
    }

    /// Root of the working tree
    pub fn workdir(&self) -> Result<PathBuf> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ReleaseError::discovery("repository has no working tree (bare)"))
    }

    fn head_oid(&self) -> Result<Oid> {
        Ok(self.repo.head()?.peel_to_commit()?.id())
    }
}

impl super::Repository for Git2Repository {
    fn current_branch(&self) -> Result<String> {
        let head = self.repo.head()?;
        if !head.is_branch() {
            return Err(ReleaseError::config(
                "HEAD is detached; pass an explicit base branch",
            ));
        }

        head.shorthand()
            .map(str::to_string)
            .ok_or_else(|| ReleaseError::config("current branch name is not valid UTF-8"))
    }

    fn tag_exists(&self, tag_name: &str) -> Result<bool> {
        let reference_name = format!("refs/tags/{}", tag_name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) if e.code() == ErrorCode::InvalidSpec => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn unstaged_changes(&self) -> Result<Vec<String>> {
        let mut opts = DiffOptions::new();
        opts.include_untracked(false);

        let diff = self.repo.diff_index_to_workdir(None, Some(&mut opts))?;

        Ok(diff
            .deltas()
            .filter_map(|delta| {
                delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .map(|p| p.display().to_string())
            })
            .collect())
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        match self.repo.find_branch(branch_name, BranchType::Local) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_branch_and_checkout(&self, branch_name: &str, base_branch: &str) -> Result<()> {
        if self.branch_exists(branch_name)? {
            return Err(ReleaseError::BranchExists(branch_name.to_string()));
        }

        // Any revision naming a commit is accepted, including remote-tracking branches.
        let base_commit = self
            .repo
            .revparse_single(base_branch)
            .and_then(|object| object.peel_to_commit())
            .map_err(|e| ReleaseError::BranchNotFound(format!("{}: {}", base_branch, e)))?;

        debug!(branch = branch_name, base = base_branch, "creating branch");
        self.repo.branch(branch_name, &base_commit, false)?;

        self.repo
            .checkout_tree(base_commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head(&format!("refs/heads/{}", branch_name))?;

        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        let mut index = self.repo.index()?;
        index.add_all(["*"].iter(), IndexAddOption::DEFAULT, None)?;
        index.update_all(["*"].iter(), None)?;
        index.write()?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<Oid> {
        let mut index = self.repo.index()?;
        let tree_id = index.write_tree()?;
        let tree = self.repo.find_tree(tree_id)?;
        let signature = self.repo.signature()?;
        let parent = self.repo.head()?.peel_to_commit()?;

        if parent.tree_id() == tree_id {
            let branch = self.repo.head()?.shorthand().unwrap_or("HEAD").to_string();
            return Err(ReleaseError::NothingToCommit(branch));
        }

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &[&parent],
        )?;

        debug!(commit = %oid, "created commit");
        Ok(oid)
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        self.repo
            .revparse_single(revision)
            .and_then(|object| object.peel_to_commit())
            .map(|commit| commit.id())
            .map_err(|e| {
                ReleaseError::commit_not_found(format!(
                    "could not retrieve commit hash {}: {}",
                    revision, e
                ))
            })
    }

    fn is_ancestor_of_head(&self, oid: Oid) -> Result<bool> {
        let head = self.head_oid()?;

        match self.repo.merge_base(oid, head) {
            Ok(base) => Ok(base == oid),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_annotated_tag(&self, tag_name: &str, oid: Oid, message: &str) -> Result<()> {
        if self.sign_tags {
            let oid_str = oid.to_string();
            let argv = [
                "git",
                "tag",
                "-a",
                tag_name,
                "-s",
                "-m",
                message,
                oid_str.as_str(),
            ];
            ExternalCommand::new(argv).run_in(&self.workdir()?)?;
            return Ok(());
        }

        let object = self.repo.find_object(oid, None)?;
        let signature = self.repo.signature()?;
        self.repo.tag(tag_name, &object, &signature, message, false)?;

        Ok(())
    }

    fn delete_tag(&self, tag_name: &str) -> Result<()> {
        self.repo.tag_delete(tag_name)?;
        Ok(())
    }
}
