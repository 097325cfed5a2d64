//! Main release workflow orchestration logic
//!
//! Drives the release strictly in order, with no way back to an earlier stage:
//!
//! `CheckBranch -> ResolveVersions -> UpdateVersionFile -> UpdateChangelog ->
//! TagAndPush -> BuildAndUpload -> Done`
//!
//! The workflow is decoupled from clap and from the terminal: commands go
//! through a [CommandRunner] and operator answers through a [Prompter].

use std::fmt;

use crate::changelog::{self, Section};
use crate::config::Config;
use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use crate::publish::{Publisher, ReleaseContext, UploadTarget};
use crate::runner::{args, CommandRunner, RunOptions};
use crate::ui::{self, Prompter};
use crate::version_file;

/// Arguments for the release workflow
///
/// Mirrors the CLI Args in a form that does not depend on clap.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReleaseArgs {
    /// Suppress every mutating side effect
    pub dry_run: bool,

    /// Explicit new version; skips the interactive prompt
    pub new_version: Option<String>,

    /// Where to upload the built package
    pub target: UploadTarget,
}

/// Result of a successful release workflow
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowResult {
    /// Version declared before the release
    pub previous: Version,

    /// Version that was released
    pub new: Version,

    /// Whether this was a dry run
    pub dry_run: bool,
}

/// Workflow stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    CheckBranch,
    ResolveVersions,
    UpdateVersionFile,
    UpdateChangelog,
    TagAndPush,
    BuildAndUpload,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::CheckBranch => "check branch",
            Stage::ResolveVersions => "resolve versions",
            Stage::UpdateVersionFile => "update version file",
            Stage::UpdateChangelog => "update changelog",
            Stage::TagAndPush => "tag and push",
            Stage::BuildAndUpload => "build and upload",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// The release workflow for one run
pub struct ReleaseWorkflow<'a, R: CommandRunner, P: Prompter> {
    runner: &'a R,
    prompter: &'a mut P,
    config: &'a Config,
    args: ReleaseArgs,
    stage: Stage,
}

impl<'a, R: CommandRunner, P: Prompter> ReleaseWorkflow<'a, R, P> {
    pub fn new(
        runner: &'a R,
        prompter: &'a mut P,
        config: &'a Config,
        args: ReleaseArgs,
    ) -> Self {
        ReleaseWorkflow {
            runner,
            prompter,
            config,
            args,
            stage: Stage::CheckBranch,
        }
    }

    /// Stage reached so far; on error, the stage that failed
    pub fn stage(&self) -> Stage {
        self.stage
    }

    fn enter(&mut self, stage: Stage) {
        debug_assert!(stage >= self.stage, "workflow never moves backwards");
        self.stage = stage;
        tracing::info!(%stage, dry_run = self.args.dry_run, "entering stage");
    }

    /// Run every stage in order
    ///
    /// # Returns
    /// * `Ok(WorkflowResult)` - Versions involved in the release
    /// * `Err` - The first fatal error; earlier stages are not rolled back
    pub fn run(&mut self) -> Result<WorkflowResult> {
        if self.args.dry_run {
            ui::display_status("Dry run: no files will be written and no mutating commands run");
        }

        self.enter(Stage::CheckBranch);
        self.check_branch()?;

        self.enter(Stage::ResolveVersions);
        let (previous, new) = self.resolve_versions()?;

        self.enter(Stage::UpdateVersionFile);
        version_file::write(
            &self.config.version_file,
            &self.config.version_identifier,
            &new,
            self.args.dry_run,
        )?;

        self.enter(Stage::UpdateChangelog);
        let section = self.update_changelog(&previous, &new)?;

        let ctx = ReleaseContext {
            previous: previous.clone(),
            new: new.clone(),
            dry_run: self.args.dry_run,
            target: self.args.target.clone(),
            changelog: section.body(),
        };
        let publisher = Publisher::new(self.runner, self.config);

        self.enter(Stage::TagAndPush);
        publisher.tag_and_push(&ctx)?;

        self.enter(Stage::BuildAndUpload);
        publisher.build_and_upload(&ctx)?;

        self.enter(Stage::Done);
        ui::display_success(&ui::marked(format!("Released {}", new), self.args.dry_run));

        Ok(WorkflowResult {
            previous,
            new,
            dry_run: self.args.dry_run,
        })
    }

    fn check_branch(&mut self) -> Result<()> {
        let output = self.runner.run(
            &args(["git", "rev-parse", "--abbrev-ref", "HEAD"]),
            RunOptions::query(),
        )?;
        let branch = output.trim();
        let main = self.config.main_branch.as_str();

        if branch == main {
            return Ok(());
        }

        ui::display_warning(&format!(
            "Current branch is '{}', not the main branch '{}'",
            branch, main
        ));
        if !self.prompter.confirm("Release from this branch anyway?")? {
            return Err(ReleaseError::aborted(format!(
                "not releasing from branch '{}'",
                branch
            )));
        }
        Ok(())
    }

    fn resolve_versions(&mut self) -> Result<(Version, Version)> {
        let current =
            version_file::read_current(&self.config.version_file, &self.config.version_identifier)?;

        let new = match self.args.new_version.clone() {
            Some(text) => Version::parse(&text)?,
            None => self.prompt_new_version(&current)?,
        };

        if new <= current {
            ui::display_warning(&format!(
                "New version {} is not newer than the current version {}",
                new, current
            ));
            if !self.prompter.confirm("Continue anyway?")? {
                return Err(ReleaseError::aborted(format!(
                    "{} does not follow {}",
                    new, current
                )));
            }
        }

        ui::display_version_change(&current, &new);
        Ok((current, new))
    }

    fn prompt_new_version(&mut self, current: &Version) -> Result<Version> {
        let default = current.increment()?.to_string();
        loop {
            let answer = self.prompter.input("New version", &default)?;
            match Version::parse(&answer) {
                Ok(version) => return Ok(version),
                Err(_) => ui::display_error(&format!(
                    "'{}' is not a valid version (examples: 1.2.4, 2.0rc1, 1.3.dev0); try again",
                    answer
                )),
            }
        }
    }

    fn update_changelog(&mut self, previous: &Version, new: &Version) -> Result<Section> {
        let section = changelog::build_section(self.runner, previous, new)?;
        ui::display_changelog(&section);
        changelog::splice(&self.config.changelog_file, &section, self.args.dry_run)?;
        Ok(section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::MockRunner;
    use crate::ui::ScriptedPrompter;
    use std::fs;
    use std::path::Path;

    fn config_in(dir: &Path) -> Config {
        fs::write(dir.join("version.py"), "__version__ = \"1.2.3\"\n").unwrap();
        fs::write(
            dir.join("CHANGELOG.rst"),
            "Changelog\n=========\n\n1.2.3\n-----\n\n- Old\n",
        )
        .unwrap();
        Config {
            version_file: dir.join("version.py"),
            changelog_file: dir.join("CHANGELOG.rst"),
            ..Config::default()
        }
    }

    #[test]
    fn test_stage_order() {
        assert!(Stage::CheckBranch < Stage::ResolveVersions);
        assert!(Stage::BuildAndUpload < Stage::Done);
        assert_eq!(Stage::TagAndPush.to_string(), "tag and push");
    }

    #[test]
    fn test_wrong_branch_declined_aborts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = MockRunner::new().respond(&["git", "rev-parse"], "feature/x\n");
        let mut prompter = ScriptedPrompter::new(["n"]);

        let mut workflow =
            ReleaseWorkflow::new(&runner, &mut prompter, &config, ReleaseArgs::default());
        let err = workflow.run().unwrap_err();

        assert!(matches!(err, ReleaseError::UserAborted(_)));
        assert_eq!(workflow.stage(), Stage::CheckBranch);
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn test_invalid_answer_reprompts() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = MockRunner::new().respond(&["git", "rev-parse"], "main\n");
        let mut prompter = ScriptedPrompter::new(["not-a-version", "1.3.0"]);

        let args = ReleaseArgs {
            dry_run: true,
            ..ReleaseArgs::default()
        };
        let result = ReleaseWorkflow::new(&runner, &mut prompter, &config, args)
            .run()
            .unwrap();

        assert_eq!(result.new.to_string(), "1.3.0");
        assert_eq!(prompter.prompts().len(), 2);
    }

    #[test]
    fn test_explicit_invalid_version_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = MockRunner::new().respond(&["git", "rev-parse"], "main\n");
        let mut prompter = ScriptedPrompter::default();

        let args = ReleaseArgs {
            new_version: Some("one.two".to_string()),
            ..ReleaseArgs::default()
        };
        let mut workflow = ReleaseWorkflow::new(&runner, &mut prompter, &config, args);
        let err = workflow.run().unwrap_err();

        assert!(matches!(err, ReleaseError::InvalidVersionFormat(_)));
        assert_eq!(workflow.stage(), Stage::ResolveVersions);
    }

    #[test]
    fn test_unincrementable_current_version_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        fs::write(&config.version_file, "__version__ = \"1.18446744073709551615\"\n").unwrap();
        let runner = MockRunner::new().respond(&["git", "rev-parse"], "main\n");
        let mut prompter = ScriptedPrompter::default();

        let mut workflow =
            ReleaseWorkflow::new(&runner, &mut prompter, &config, ReleaseArgs::default());
        let err = workflow.run().unwrap_err();

        assert!(matches!(err, ReleaseError::InvalidVersionFormat(_)));
        assert_eq!(workflow.stage(), Stage::ResolveVersions);
        assert!(prompter.prompts().is_empty());
    }

    #[test]
    fn test_non_increasing_version_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        let runner = MockRunner::new().respond(&["git", "rev-parse"], "main\n");
        let mut prompter = ScriptedPrompter::new([""]);

        let args = ReleaseArgs {
            new_version: Some("1.2.3".to_string()),
            ..ReleaseArgs::default()
        };
        let err = ReleaseWorkflow::new(&runner, &mut prompter, &config, args)
            .run()
            .unwrap_err();
        assert!(matches!(err, ReleaseError::UserAborted(_)));
    }
}
