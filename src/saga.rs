//! Compensating rollback for multi-tag creation.
//!
//! Git has no transaction spanning several tags, so each completed action is
//! recorded and undone in reverse order when a later step fails.

use git2::Oid;
use tracing::{debug, warn};

use crate::error::{ReleaseError, Result};
use crate::git::Repository;

/// A completed mutation and the knowledge needed to reverse it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagAction {
    Created { tag: String },
}

impl TagAction {
    /// Undo this action
    pub fn compensate<R: Repository>(&self, repo: &R) -> Result<()> {
        match self {
            TagAction::Created { tag } => {
                debug!(tag = %tag, "compensating tag creation");
                repo.delete_tag(tag)
            }
        }
    }
}

/// Ordered log of completed tag actions against one repository
pub struct TagSaga<'a, R: Repository> {
    repo: &'a R,
    completed: Vec<TagAction>,
}

impl<'a, R: Repository> TagSaga<'a, R> {
    pub fn new(repo: &'a R) -> Self {
        TagSaga {
            repo,
            completed: Vec::new(),
        }
    }

    /// Create an annotated tag and record it on success
    pub fn create_tag(&mut self, tag: &str, oid: Oid, message: &str) -> Result<()> {
        self.repo.create_annotated_tag(tag, oid, message)?;
        self.completed.push(TagAction::Created {
            tag: tag.to_string(),
        });
        Ok(())
    }

    pub fn completed(&self) -> &[TagAction] {
        &self.completed
    }

    /// Compensate every completed action, newest first.
    ///
    /// All compensations are attempted; the first failure is returned.
    pub fn rollback(self) -> Result<()> {
        let mut first_failure: Option<ReleaseError> = None;

        for action in self.completed.iter().rev() {
            if let Err(e) = action.compensate(self.repo) {
                warn!(action = ?action, error = %e, "compensation failed");
                first_failure.get_or_insert(e);
            }
        }

        match first_failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Keep every completed action and return the created tag names
    pub fn finish(self) -> Vec<String> {
        self.completed
            .into_iter()
            .map(|action| match action {
                TagAction::Created { tag } => tag,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockRepository;

    #[test]
    fn test_rollback_deletes_in_reverse_order() {
        let repo = MockRepository::new();
        let oid = MockRepository::oid(1);

        let mut saga = TagSaga::new(&repo);
        saga.create_tag("a/v1.0.0", oid, "Version a/v1.0.0").unwrap();
        saga.create_tag("b/v1.0.0", oid, "Version b/v1.0.0").unwrap();
        saga.rollback().unwrap();

        assert!(repo.tags().is_empty());
        let deletes: Vec<String> = repo
            .events()
            .into_iter()
            .filter(|e| e.starts_with("delete_tag:"))
            .collect();
        assert_eq!(deletes, vec!["delete_tag:b/v1.0.0", "delete_tag:a/v1.0.0"]);
    }

    #[test]
    fn test_failed_create_is_not_recorded() {
        let repo = MockRepository::new();
        repo.fail_tag_creation("bad/v1.0.0");

        let mut saga = TagSaga::new(&repo);
        assert!(saga
            .create_tag("bad/v1.0.0", MockRepository::oid(1), "m")
            .is_err());
        assert!(saga.completed().is_empty());
    }

    #[test]
    fn test_rollback_continues_past_failed_compensation() {
        let repo = MockRepository::new();
        let oid = MockRepository::oid(1);
        repo.fail_tag_deletion("b/v1.0.0");

        let mut saga = TagSaga::new(&repo);
        saga.create_tag("a/v1.0.0", oid, "m").unwrap();
        saga.create_tag("b/v1.0.0", oid, "m").unwrap();

        assert!(saga.rollback().is_err());
        assert_eq!(repo.tags(), vec!["b/v1.0.0".to_string()]);
    }

    #[test]
    fn test_finish_returns_created_tags() {
        let repo = MockRepository::new();
        let mut saga = TagSaga::new(&repo);
        saga.create_tag("v1.0.0", MockRepository::oid(1), "m").unwrap();

        assert_eq!(saga.finish(), vec!["v1.0.0".to_string()]);
    }
}
