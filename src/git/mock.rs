use crate::error::{ReleaseError, Result};
use crate::git::Repository;
use git2::Oid;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

/// Mock repository for testing without actual git operations.
///
/// Every trait call is appended to an event log so tests can assert on
/// ordering, and tag creation/deletion can be made to fail by name.
pub struct MockRepository {
    state: RefCell<MockState>,
}

#[derive(Default)]
struct MockState {
    current_branch: String,
    branches: BTreeMap<String, Oid>,
    tags: BTreeMap<String, Oid>,
    revisions: BTreeMap<String, Oid>,
    reachable: BTreeSet<Oid>,
    commit_messages: Vec<String>,
    unstaged: Vec<String>,
    failing_tag_creates: BTreeSet<String>,
    failing_tag_deletes: BTreeSet<String>,
    events: Vec<String>,
}

impl MockRepository {
    /// Create a mock repository with one commit on branch `main`
    pub fn new() -> Self {
        let root = Self::oid(1);
        let mut state = MockState {
            current_branch: "main".to_string(),
            ..MockState::default()
        };
        state.branches.insert("main".to_string(), root);
        state.revisions.insert(root.to_string(), root);
        state.reachable.insert(root);

        MockRepository {
            state: RefCell::new(state),
        }
    }

    /// Deterministic object id built from a single byte
    pub fn oid(byte: u8) -> Oid {
        Oid::from_bytes(&[byte; 20]).unwrap_or_else(|_| Oid::zero())
    }

    /// Register a commit resolvable by `revision`; `reachable` controls the HEAD ancestry check
    pub fn add_commit(&self, revision: impl Into<String>, oid: Oid, reachable: bool) {
        let mut state = self.state.borrow_mut();
        state.revisions.insert(revision.into(), oid);
        state.revisions.insert(oid.to_string(), oid);
        if reachable {
            state.reachable.insert(oid);
        }
    }

    /// Add a tag pointing to an OID
    pub fn add_tag(&self, name: impl Into<String>, oid: Oid) {
        self.state.borrow_mut().tags.insert(name.into(), oid);
    }

    /// Add a local branch pointing to an OID
    pub fn add_branch(&self, name: impl Into<String>, oid: Oid) {
        self.state.borrow_mut().branches.insert(name.into(), oid);
    }

    /// Pretend these paths have unstaged modifications
    pub fn set_unstaged_changes(&self, paths: Vec<String>) {
        self.state.borrow_mut().unstaged = paths;
    }

    /// Make creation of `tag_name` fail
    pub fn fail_tag_creation(&self, tag_name: impl Into<String>) {
        self.state
            .borrow_mut()
            .failing_tag_creates
            .insert(tag_name.into());
    }

    /// Make deletion of `tag_name` fail
    pub fn fail_tag_deletion(&self, tag_name: impl Into<String>) {
        self.state
            .borrow_mut()
            .failing_tag_deletes
            .insert(tag_name.into());
    }

    pub fn tags(&self) -> Vec<String> {
        self.state.borrow().tags.keys().cloned().collect()
    }

    pub fn has_branch(&self, name: &str) -> bool {
        self.state.borrow().branches.contains_key(name)
    }

    pub fn commit_messages(&self) -> Vec<String> {
        self.state.borrow().commit_messages.clone()
    }

    /// Log of trait calls, e.g. "tag_exists:v1.0.0" or "create_branch:x"
    pub fn events(&self) -> Vec<String> {
        self.state.borrow().events.clone()
    }

    fn record(&self, event: String) {
        self.state.borrow_mut().events.push(event);
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn current_branch(&self) -> Result<String> {
        self.record("current_branch".to_string());
        Ok(self.state.borrow().current_branch.clone())
    }

    fn tag_exists(&self, tag_name: &str) -> Result<bool> {
        self.record(format!("tag_exists:{}", tag_name));
        Ok(self.state.borrow().tags.contains_key(tag_name))
    }

    fn unstaged_changes(&self) -> Result<Vec<String>> {
        self.record("unstaged_changes".to_string());
        Ok(self.state.borrow().unstaged.clone())
    }

    fn branch_exists(&self, branch_name: &str) -> Result<bool> {
        Ok(self.state.borrow().branches.contains_key(branch_name))
    }

    fn create_branch_and_checkout(&self, branch_name: &str, base_branch: &str) -> Result<()> {
        self.record(format!("create_branch:{}", branch_name));
        let mut state = self.state.borrow_mut();

        if state.branches.contains_key(branch_name) {
            return Err(ReleaseError::BranchExists(branch_name.to_string()));
        }
        let base = *state
            .branches
            .get(base_branch)
            .ok_or_else(|| ReleaseError::BranchNotFound(base_branch.to_string()))?;

        state.branches.insert(branch_name.to_string(), base);
        state.current_branch = branch_name.to_string();
        Ok(())
    }

    fn stage_all(&self) -> Result<()> {
        self.record("stage_all".to_string());
        self.state.borrow_mut().unstaged.clear();
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<Oid> {
        self.record(format!("commit:{}", message));
        let mut state = self.state.borrow_mut();

        let next = u8::try_from(100 + state.commit_messages.len()).unwrap_or(u8::MAX);
        let oid = Self::oid(next);
        let branch = state.current_branch.clone();

        state.branches.insert(branch, oid);
        state.revisions.insert(oid.to_string(), oid);
        state.reachable.insert(oid);
        state.commit_messages.push(message.to_string());
        Ok(oid)
    }

    fn resolve_commit(&self, revision: &str) -> Result<Oid> {
        self.state
            .borrow()
            .revisions
            .get(revision)
            .copied()
            .ok_or_else(|| {
                ReleaseError::commit_not_found(format!(
                    "could not retrieve commit hash {}",
                    revision
                ))
            })
    }

    fn is_ancestor_of_head(&self, oid: Oid) -> Result<bool> {
        Ok(self.state.borrow().reachable.contains(&oid))
    }

    fn create_annotated_tag(&self, tag_name: &str, oid: Oid, _message: &str) -> Result<()> {
        self.record(format!("create_tag:{}", tag_name));
        let mut state = self.state.borrow_mut();

        if state.failing_tag_creates.contains(tag_name) {
            return Err(ReleaseError::external(
                format!("git tag -a {}", tag_name),
                "injected failure",
            ));
        }
        if state.tags.contains_key(tag_name) {
            return Err(git2::Error::from_str("tag already exists").into());
        }

        state.tags.insert(tag_name.to_string(), oid);
        Ok(())
    }

    fn delete_tag(&self, tag_name: &str) -> Result<()> {
        self.record(format!("delete_tag:{}", tag_name));
        let mut state = self.state.borrow_mut();

        if state.failing_tag_deletes.contains(tag_name) {
            return Err(ReleaseError::external(
                format!("git tag -d {}", tag_name),
                "injected failure",
            ));
        }
        if state.tags.remove(tag_name).is_none() {
            return Err(git2::Error::from_str("tag not found").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_tags() {
        let repo = MockRepository::new();
        let oid = MockRepository::oid(2);

        repo.add_tag("v1.0.0", oid);

        assert!(repo.tag_exists("v1.0.0").unwrap());
        assert!(!repo.tag_exists("v2.0.0").unwrap());
    }

    #[test]
    fn test_mock_repository_commit_moves_branch() {
        let repo = MockRepository::new();
        let oid = repo.commit("first").unwrap();

        assert_eq!(repo.resolve_commit(&oid.to_string()).unwrap(), oid);
        assert!(repo.is_ancestor_of_head(oid).unwrap());
        assert_eq!(repo.commit_messages(), vec!["first".to_string()]);
    }

    #[test]
    fn test_mock_repository_injected_tag_failure() {
        let repo = MockRepository::new();
        repo.fail_tag_creation("bad/v1.0.0");

        let result = repo.create_annotated_tag("bad/v1.0.0", MockRepository::oid(1), "m");
        assert!(result.is_err());
        assert!(repo.tags().is_empty());
    }

    #[test]
    fn test_mock_repository_missing_base_branch() {
        let repo = MockRepository::new();
        let err = repo.create_branch_and_checkout("x", "nope").unwrap_err();

        assert!(matches!(err, ReleaseError::BranchNotFound(ref b) if b == "nope"));
        assert!(!repo.has_branch("x"));
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert_eq!(repo.current_branch().unwrap(), "main");
        assert!(repo.tags().is_empty());
    }
}
