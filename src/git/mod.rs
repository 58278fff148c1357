//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the Git operations the
//! release workflows need, allowing for both a real repository and an
//! in-memory mock for testing.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Workflows depend on the [Repository] trait rather than a concrete
//! implementation.
//!
//! ```rust
//! # use releasing::git::Repository;
//! # fn example<R: Repository>(repo: &R) -> releasing::Result<()> {
//! if !repo.tag_exists("sdk/v1.3.0")? {
//!     let commit = repo.resolve_commit("HEAD")?;
//!     repo.create_annotated_tag("sdk/v1.3.0", commit, "Version sdk/v1.3.0")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying failures to the matching [crate::error::ReleaseError] variant
/// (for example `CommitNotFound` or `BranchExists`).
pub trait Repository {
    /// Name of the currently checked out branch
    fn current_branch(&self) -> Result<String>;

    /// Whether a tag with exactly this name exists
    fn tag_exists(&self, tag_name: &str) -> Result<bool>;

    /// Paths with unstaged changes (working tree vs. index); empty when clean
    fn unstaged_changes(&self) -> Result<Vec<String>>;

    /// Whether a local branch with this name exists
    fn branch_exists(&self, branch_name: &str) -> Result<bool>;

    /// Create `branch_name` at the tip of `base_branch` and switch to it
    ///
    /// # Returns
    /// * `Err(BranchExists)` - If `branch_name` already exists
    /// * `Err(BranchNotFound)` - If `base_branch` does not name a commit
    fn create_branch_and_checkout(&self, branch_name: &str, base_branch: &str) -> Result<()>;

    /// Stage every change in the working tree
    fn stage_all(&self) -> Result<()>;

    /// Commit the index on top of HEAD and return the new commit id.
    ///
    /// Fails with `NothingToCommit` when the index matches HEAD's tree.
    fn commit(&self, message: &str) -> Result<Oid>;

    /// Resolve a revision (full or abbreviated hash, ref name) to a commit id
    ///
    /// # Returns
    /// * `Err(CommitNotFound)` - If the revision does not name a commit
    fn resolve_commit(&self, revision: &str) -> Result<Oid>;

    /// Whether `oid` is reachable from the current HEAD (merge-base(oid, HEAD) == oid)
    fn is_ancestor_of_head(&self, oid: Oid) -> Result<bool>;

    /// Create an annotated tag named `tag_name` at `oid`; fails if it exists
    fn create_annotated_tag(&self, tag_name: &str, oid: Oid, message: &str) -> Result<()>;

    /// Delete the tag named `tag_name`
    fn delete_tag(&self, tag_name: &str) -> Result<()>;
}
