pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod exec;
pub mod git;
pub mod manifest;
pub mod module_info;
pub mod prerelease;
pub mod saga;
pub mod tagger;
pub mod ui;
pub mod verify;
pub mod versions;
pub mod warning;

pub use error::{ReleaseError, Result};
