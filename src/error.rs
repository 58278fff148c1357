use thiserror::Error;

/// Unified error type for releasing operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Configuration error: {0}")]
    ConfigParse(String),

    #[error("Inconsistent module sets: {0}")]
    InconsistentModuleSet(String),

    #[error("Module discovery failed: {0}")]
    ModuleDiscovery(String),

    #[error("Invalid version: {0}")]
    InvalidVersion(String),

    #[error("Unknown module set: {0}")]
    UnknownModuleSet(String),

    #[error("Git tag already exists: {0}")]
    TagAlreadyExists(String),

    #[error("Working tree is not clean, can't proceed with the release process:\n{0}")]
    DirtyWorkingTree(String),

    #[error("Branch already exists: {0}")]
    BranchExists(String),

    #[error("Branch not found: {0}")]
    BranchNotFound(String),

    #[error("Nothing to commit on {0}, working tree matches the last commit")]
    NothingToCommit(String),

    #[error("Command '{command}' failed:\n{output}")]
    ExternalCommand { command: String, output: String },

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("{failure}\nCould not remove all newly created tags: {compensation}")]
    TagRollback {
        failure: Box<ReleaseError>,
        compensation: Box<ReleaseError>,
    },

    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in releasing
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::ConfigParse(msg.into())
    }

    /// Create a module set consistency error with context
    pub fn inconsistent(msg: impl Into<String>) -> Self {
        ReleaseError::InconsistentModuleSet(msg.into())
    }

    /// Create a module discovery error with context
    pub fn discovery(msg: impl Into<String>) -> Self {
        ReleaseError::ModuleDiscovery(msg.into())
    }

    /// Create a version error with context
    pub fn version(msg: impl Into<String>) -> Self {
        ReleaseError::InvalidVersion(msg.into())
    }

    /// Create a commit lookup error with context
    pub fn commit_not_found(msg: impl Into<String>) -> Self {
        ReleaseError::CommitNotFound(msg.into())
    }

    /// Wrap a failed external invocation together with its captured output
    pub fn external(command: impl Into<String>, output: impl Into<String>) -> Self {
        ReleaseError::ExternalCommand {
            command: command.into(),
            output: output.into(),
        }
    }
}
