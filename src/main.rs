use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use releasing::cli::orchestration::{
    run_prerelease, run_tag, run_verify, PrereleaseArgs, TagMode,
};
use releasing::config::{load_config, Settings};
use releasing::git::Git2Repository;
use releasing::ui;

#[derive(Parser)]
#[command(
    name = "releasing",
    version,
    about = "Version and tag module sets in a multi-module repository"
)]
struct Cli {
    /// Name of module set whose version is being changed. Must be listed in the versioning file.
    #[arg(short, long, global = true, env = "RELEASING_MODULE_SET_NAME")]
    module_set_name: Option<String>,

    /// Path to versioning file that contains definitions of all module sets.
    /// Defaults to versions.yaml in the Git repo root.
    #[arg(short, long, global = true)]
    versioning_file: Option<PathBuf>,

    /// Custom configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verifies that the versioning file is valid
    Verify,
    /// Prepares files for new version release on a new branch
    Prerelease {
        /// Existing branch to base the pre-release branch on. Defaults to the current branch.
        #[arg(short, long)]
        from_existing_branch: Option<String>,

        /// Skip the lint and full verification commands. Should not be skipped during an actual release.
        #[arg(short, long)]
        skip_make: bool,
    },
    /// Applies Git tags for every module in the set to a commit
    Tag {
        /// Git commit hash to tag
        #[arg(
            short,
            long,
            required_unless_present = "delete_module_set_tags",
            conflicts_with = "delete_module_set_tags"
        )]
        commit_hash: Option<String>,

        /// Delete all module tags for the set's version in the versioning file.
        /// Only meant to undo recent tagging mistakes.
        #[arg(short, long)]
        delete_module_set_tags: bool,
    },
}

/// Initialize tracing on stderr so stdout stays readable release output
fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "releasing=debug" } else { "releasing=info" };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let module_set_name = cli
        .module_set_name
        .context("--module-set-name is required")?;

    let config = load_config(cli.config.as_deref()).context("Error loading config")?;
    let sign_tags = config.sign_tags;

    let repo = Git2Repository::open(".")
        .context("Could not find repo root")?
        .with_tag_signing(sign_tags);
    let repo_root = repo.workdir()?;

    let settings = Settings::resolve(config, module_set_name, cli.versioning_file, repo_root);
    ui::display_status(&format!(
        "Using versioning file {}",
        settings.versioning_file.display()
    ));

    match cli.command {
        Commands::Verify => {
            let report = run_verify(&settings)?;
            ui::display_verification_report(&report);
            if !report.passed() {
                bail!("module set verification failed");
            }
        }
        Commands::Prerelease {
            from_existing_branch,
            skip_make,
        } => {
            let args = PrereleaseArgs {
                from_existing_branch,
                skip_make,
            };
            let result = run_prerelease(&repo, &settings, &args)?;
            ui::display_success(&format!(
                "Prepared {} for releasing {} ({} manifest files updated)",
                result.branch, result.version, result.updated_manifests
            ));
            ui::display_prerelease_next_steps(&result.base_branch, &result.branch);
        }
        Commands::Tag {
            commit_hash,
            delete_module_set_tags,
        } => {
            let mode = match (delete_module_set_tags, commit_hash) {
                (true, _) => TagMode::Delete,
                (false, Some(commit_hash)) => TagMode::Create { commit_hash },
                (false, None) => bail!("--commit-hash is required unless deleting tags"),
            };

            let result = run_tag(&repo, &settings, &mode)?;
            if result.deleted {
                ui::display_success("Successfully deleted module tags");
            } else {
                ui::display_success(&format!(
                    "Successfully created {} module tags",
                    result.tags.len()
                ));
            }
        }
    }

    Ok(())
}
