mod common;

use git2::{Repository as Git2Repo, Signature};
use releasing::cli::orchestration::{
    run_prerelease, run_tag, run_verify, PrereleaseArgs, TagMode,
};
use releasing::git::{Git2Repository, Repository};
use releasing::ReleaseError;
use std::process::Command;
use tempfile::TempDir;

use common::{read, settings_for, write_sample_modules, VERSIONS_YAML};

/// Real repository with the sample modules committed on the initial branch
fn init_repo() -> (TempDir, Git2Repository) {
    let dir = TempDir::new().unwrap();
    let repo = Git2Repo::init(dir.path()).unwrap();
    {
        let mut config = repo.config().unwrap();
        config.set_str("user.name", "Test User").unwrap();
        config.set_str("user.email", "test@example.com").unwrap();
    }

    write_sample_modules(dir.path(), VERSIONS_YAML);

    {
        let mut index = repo.index().unwrap();
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .unwrap();
        index.write().unwrap();
        let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
        let sig = Signature::now("Test User", "test@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "Initial commit", &tree, &[])
            .unwrap();
    }

    (dir, Git2Repository::from_git2(repo))
}

fn head_message(dir: &TempDir) -> String {
    let repo = Git2Repo::open(dir.path()).unwrap();
    let head = repo.head().unwrap().peel_to_commit().unwrap();
    head.message().unwrap_or_default().to_string()
}

fn commit_count(dir: &TempDir) -> usize {
    let repo = Git2Repo::open(dir.path()).unwrap();
    let mut walk = repo.revwalk().unwrap();
    walk.push_head().unwrap();
    walk.count()
}

#[test]
fn test_verify_passes_on_sample_repository() {
    let (dir, _repo) = init_repo();
    let settings = settings_for(dir.path(), "stable");

    let report = run_verify(&settings).unwrap();

    assert!(report.passed());
}

#[test]
fn test_prerelease_then_tag_then_delete() {
    let (dir, repo) = init_repo();
    let settings = settings_for(dir.path(), "stable");
    let base = repo.current_branch().unwrap();

    let args = PrereleaseArgs {
        from_existing_branch: None,
        skip_make: true,
    };
    let result = run_prerelease(&repo, &settings, &args).unwrap();

    assert_eq!(result.branch, "pre_release_stable_v1.3.0");
    assert_eq!(result.base_branch, base);
    assert_eq!(repo.current_branch().unwrap(), "pre_release_stable_v1.3.0");
    assert_eq!(commit_count(&dir), 2);
    assert_eq!(head_message(&dir), "Prepare for releasing v1.3.0");
    assert!(read(dir.path(), "b/go.mod").contains("example.com/repo/a v1.3.0"));
    assert!(repo.unstaged_changes().unwrap().is_empty());

    let tagged = run_tag(
        &repo,
        &settings,
        &TagMode::Create {
            commit_hash: result.commit_hash[..10].to_string(),
        },
    )
    .unwrap();
    assert_eq!(tagged.tags, vec!["a/v1.3.0", "b/v1.3.0"]);
    assert!(repo.tag_exists("a/v1.3.0").unwrap());
    assert!(repo.tag_exists("b/v1.3.0").unwrap());

    let raw = Git2Repo::open(dir.path()).unwrap();
    let tag = raw
        .find_reference("refs/tags/b/v1.3.0")
        .unwrap()
        .peel_to_tag()
        .unwrap();
    assert_eq!(tag.message().map(str::trim), Some("Version b/v1.3.0"));

    let deleted = run_tag(&repo, &settings, &TagMode::Delete).unwrap();
    assert!(deleted.deleted);
    assert!(!repo.tag_exists("a/v1.3.0").unwrap());
    assert!(!repo.tag_exists("b/v1.3.0").unwrap());
}

#[test]
fn test_prerelease_with_nothing_to_update_does_not_commit() {
    let (dir, repo) = init_repo();
    let settings = settings_for(dir.path(), "experimental");

    let args = PrereleaseArgs {
        from_existing_branch: None,
        skip_make: true,
    };
    let err = run_prerelease(&repo, &settings, &args).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ReleaseError>(),
        Some(ReleaseError::NothingToCommit(_))
    ));
    assert!(format!("{:#}", err).contains("committing changes failed"));
    assert_eq!(
        repo.current_branch().unwrap(),
        "pre_release_experimental_v0.5.0"
    );
    assert_eq!(commit_count(&dir), 1);
    assert_eq!(head_message(&dir), "Initial commit");
    assert_eq!(read(dir.path(), "c/go.mod"), common::MANIFEST_C);
}

#[test]
fn test_prerelease_based_on_remote_tracking_branch() {
    let (dir, repo) = init_repo();
    let settings = settings_for(dir.path(), "stable");
    {
        let raw = Git2Repo::open(dir.path()).unwrap();
        let head = raw.head().unwrap().peel_to_commit().unwrap().id();
        raw.reference("refs/remotes/origin/main", head, false, "fetch")
            .unwrap();
    }

    let args = PrereleaseArgs {
        from_existing_branch: Some("origin/main".to_string()),
        skip_make: true,
    };
    let result = run_prerelease(&repo, &settings, &args).unwrap();

    assert_eq!(result.base_branch, "origin/main");
    assert_eq!(result.branch, "pre_release_stable_v1.3.0");
    assert_eq!(commit_count(&dir), 2);
    assert_eq!(head_message(&dir), "Prepare for releasing v1.3.0");
}

#[test]
fn test_second_prerelease_is_refused_once_tags_exist() {
    let (dir, repo) = init_repo();
    let settings = settings_for(dir.path(), "stable");
    let head = repo.resolve_commit("HEAD").unwrap();

    run_tag(
        &repo,
        &settings,
        &TagMode::Create {
            commit_hash: head.to_string(),
        },
    )
    .unwrap();

    let args = PrereleaseArgs {
        from_existing_branch: None,
        skip_make: true,
    };
    let err = run_prerelease(&repo, &settings, &args).unwrap_err();

    assert!(format!("{:#}", err).contains("a/v1.3.0"));
    assert!(!repo.branch_exists("pre_release_stable_v1.3.0").unwrap());
}

#[test]
fn test_binary_help_lists_subcommands() {
    let output = Command::new(env!("CARGO_BIN_EXE_releasing"))
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("verify"));
    assert!(stdout.contains("prerelease"));
    assert!(stdout.contains("tag"));
}
