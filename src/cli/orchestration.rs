//! Workflow orchestration for the `verify`, `prerelease` and `tag` commands
//!
//! This module holds the command sequencing that would otherwise live in
//! main.rs. Workflows take an explicit [`Settings`] and a [`Repository`],
//! so they can be driven programmatically and against a mock repository.

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::git::Repository;
use crate::module_info::ModuleVersioningInfo;
use crate::prerelease::Prerelease;
use crate::tagger::Tagger;
use crate::ui;
use crate::verify::{VerificationReport, Verifier};

/// Arguments for the prerelease workflow
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PrereleaseArgs {
    /// Branch to base the prerelease branch on; defaults to the current branch
    pub from_existing_branch: Option<String>,

    /// Skip the lint and full verification commands
    pub skip_make: bool,
}

/// Result of a successful prerelease workflow
#[derive(Debug, Clone, PartialEq)]
pub struct PrereleaseResult {
    pub branch: String,
    pub base_branch: String,
    pub version: String,
    pub commit_hash: String,
    pub updated_manifests: usize,
}

/// What the tag workflow should do
#[derive(Debug, Clone, PartialEq)]
pub enum TagMode {
    /// Tag every module of the set at this commit
    Create { commit_hash: String },
    /// Delete the set's tags for the version in the versioning file
    Delete,
}

/// Result of a successful tag workflow
#[derive(Debug, Clone, PartialEq)]
pub struct TagResult {
    pub tags: Vec<String>,
    pub deleted: bool,
}

/// Builds the module indices described by `settings`
pub fn load_versioning_info(settings: &Settings) -> Result<ModuleVersioningInfo> {
    ModuleVersioningInfo::load(
        &settings.versioning_file,
        &settings.repo_root,
        &settings.config.manifest_file_name,
    )
    .with_context(|| {
        format!(
            "unable to load module versioning info from {}",
            settings.versioning_file.display()
        )
    })
}

/// Runs every verification check and returns the report; printing is left to the caller
pub fn run_verify(settings: &Settings) -> Result<VerificationReport> {
    let info = load_versioning_info(settings)?;
    Ok(Verifier::new(&info).run())
}

/// Prerelease workflow
///
/// Runs, in order and stopping at the first failure:
/// 1. Resolve version, modules and tag names for the set
/// 2. Check that none of the new tags exist
/// 3. Check that the working tree is clean
/// 4. Create `pre_release_<set>_<version>` from the base branch
/// 5. Rewrite every manifest's requirements on the set's modules
/// 6. Run the lint command (unless skipped)
/// 7. Stage, run the full verification command (unless skipped) and commit
pub fn run_prerelease<R: Repository>(
    repo: &R,
    settings: &Settings,
    args: &PrereleaseArgs,
) -> Result<PrereleaseResult> {
    let base_branch = match &args.from_existing_branch {
        Some(branch) => branch.clone(),
        None => repo
            .current_branch()
            .context("could not get current branch")?,
    };

    let info = load_versioning_info(settings)?;
    let prerelease =
        Prerelease::new(repo, &info, settings).context("unable to get modules to update")?;

    prerelease
        .verify_git_tags_do_not_already_exist()
        .context("tag pre-check failed")?;

    prerelease
        .verify_working_tree_clean()
        .context("clean working tree check failed")?;

    let branch = prerelease
        .create_prerelease_branch(&base_branch)
        .context("creating prerelease branch failed")?;

    let updated = prerelease
        .update_all_manifests()
        .context("updating manifest files failed")?;

    if args.skip_make {
        ui::display_status("Skipping lint command...");
    } else {
        prerelease.run_lint().context("lint command failed")?;
    }

    let commit = prerelease
        .commit_changes(args.skip_make)
        .context("committing changes failed")?;

    Ok(PrereleaseResult {
        branch,
        base_branch,
        version: prerelease.plan().version.clone(),
        commit_hash: commit.to_string(),
        updated_manifests: updated.len(),
    })
}

/// Tag workflow: create all of a set's tags at a commit, or delete them
pub fn run_tag<R: Repository>(repo: &R, settings: &Settings, mode: &TagMode) -> Result<TagResult> {
    let info = load_versioning_info(settings)?;
    let tagger = Tagger::new(repo, &info, &settings.module_set_name)
        .context("unable to get modules to tag")?;

    match mode {
        TagMode::Create { commit_hash } => {
            let commit = tagger.resolve_commit(commit_hash).with_context(|| {
                format!("could not get full commit hash of given hash {}", commit_hash)
            })?;
            let tags = tagger
                .tag_all_modules(commit)
                .context("unable to tag modules")?;
            Ok(TagResult {
                tags,
                deleted: false,
            })
        }
        TagMode::Delete => {
            let tags = tagger
                .delete_module_set_tags()
                .context("error deleting tags for the specified module set")?;
            Ok(TagResult {
                tags,
                deleted: true,
            })
        }
    }
}
