//! Domain types - module identities, tag names and versions

pub mod module;
pub mod tag;
pub mod version;

pub use module::{ModuleFilePath, ModuleInfo, ModulePath, ModuleSet};
pub use tag::{combine_tag_names_and_version, ModuleTagName};
pub use version::{is_stable_version, ModuleVersion};
