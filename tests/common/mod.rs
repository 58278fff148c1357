#![allow(dead_code)]

use std::fs;
use std::path::Path;

use releasing::config::{Config, Settings};
use tempfile::TempDir;

/// Versioning file used by most tests: stable set already bumped to v1.3.0
pub const VERSIONS_YAML: &str = r#"stable:
  version: v1.3.0
  modules:
    - example.com/repo/a
    - example.com/repo/b
experimental:
  version: v0.5.0
  modules:
    - example.com/repo/c
"#;

pub const MANIFEST_A: &str = "module example.com/repo/a\n\ngo 1.16\n";

pub const MANIFEST_B: &str = r#"module example.com/repo/b

go 1.16

require (
	example.com/repo/a v1.2.0
	github.com/google/go-cmp v0.5.6
)
"#;

pub const MANIFEST_C: &str = r#"module example.com/repo/c

go 1.16

require example.com/repo/a v1.2.0
require example.com/repo/b v1.2.0 // indirect
"#;

pub fn write_file(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Could not create directory");
    }
    fs::write(path, contents).expect("Could not write file");
}

/// Lay out a three-module repository (without initialising git)
pub fn write_sample_modules(root: &Path, versions_yaml: &str) {
    write_file(root, "versions.yaml", versions_yaml);
    write_file(root, "a/go.mod", MANIFEST_A);
    write_file(root, "b/go.mod", MANIFEST_B);
    write_file(root, "c/go.mod", MANIFEST_C);
}

pub fn sample_dir() -> TempDir {
    let dir = TempDir::new().expect("Could not create temp dir");
    write_sample_modules(dir.path(), VERSIONS_YAML);
    dir
}

pub fn settings_for(root: &Path, module_set_name: &str) -> Settings {
    let config = Config {
        sign_tags: false,
        ..Config::default()
    };
    Settings::resolve(config, module_set_name, None, root)
}

pub fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("Could not read file")
}
