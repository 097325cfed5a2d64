use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkg_release::cli::{ReleaseArgs, ReleaseWorkflow};
use pkg_release::config::{self, Config};
use pkg_release::publish::UploadTarget;
use pkg_release::runner::SystemRunner;
use pkg_release::ui::{self, ConsolePrompter};
use pkg_release::version_file;

/// Exit status for every fatal error.
const EXIT_FAILURE: i32 = 2;

#[derive(clap::Parser)]
#[command(
    name = "pkg-release",
    about = "Bump the version, update the changelog, tag and publish a package release",
    disable_version_flag = true
)]
struct Args {
    #[arg(short = 'V', long = "version", help = "Print the current version and exit")]
    version: bool,

    #[arg(short = 'n', long, help = "Preview what would happen without making changes")]
    dry_run: bool,

    #[arg(
        short = 'T',
        long = "test-pypi",
        conflicts_with_all = ["repository", "repository_url"],
        help = "Upload to the configured test repository"
    )]
    test_pypi: bool,

    #[arg(
        long,
        value_name = "NAME",
        conflicts_with = "repository_url",
        help = "Upload to a named repository"
    )]
    repository: Option<String>,

    #[arg(long, value_name = "URL", help = "Upload to an explicit repository URL")]
    repository_url: Option<String>,

    #[arg(long, value_name = "VERSION", help = "Release this version without prompting")]
    new_version: Option<String>,

    #[arg(short, long, value_name = "PATH", help = "Custom configuration file path")]
    config: Option<PathBuf>,

    #[arg(short, long, help = "Show debug logging")]
    verbose: bool,
}

impl Args {
    fn upload_target(&self, config: &Config) -> UploadTarget {
        if self.test_pypi {
            UploadTarget::Repository(config.test_repository.clone())
        } else if let Some(name) = &self.repository {
            UploadTarget::Repository(name.clone())
        } else if let Some(url) = &self.repository_url {
            UploadTarget::RepositoryUrl(url.clone())
        } else {
            UploadTarget::DefaultIndex
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(EXIT_FAILURE);
    }
}

fn run(args: Args) -> Result<()> {
    let config = config::load_config(args.config.as_deref()).context("Error loading config")?;

    if args.version {
        let current = version_file::read_current(&config.version_file, &config.version_identifier)?;
        println!("{}", current);
        return Ok(());
    }

    let release_args = ReleaseArgs {
        dry_run: args.dry_run,
        new_version: args.new_version.clone(),
        target: args.upload_target(&config),
    };

    let runner = SystemRunner::new();
    let mut prompter = ConsolePrompter;
    let mut workflow = ReleaseWorkflow::new(&runner, &mut prompter, &config, release_args);

    let result = workflow.run();
    if let Err(e) = &result {
        tracing::error!(stage = %workflow.stage(), error = %e, "release failed");
    }
    result?;
    Ok(())
}
