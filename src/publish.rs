//! Committing, tagging, pushing, building and uploading a release.

use crate::config::Config;
use crate::domain::Version;
use crate::error::Result;
use crate::runner::{args, CommandRunner, RunOptions};
use crate::ui;

/// Where the built package is uploaded
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum UploadTarget {
    /// The upload tool's default public index
    #[default]
    DefaultIndex,
    /// A repository name known to the upload tool's configuration
    Repository(String),
    /// An explicit upload endpoint
    RepositoryUrl(String),
}

impl UploadTarget {
    /// Arguments selecting this target on the upload tool's command line
    pub fn upload_args(&self) -> Vec<String> {
        match self {
            UploadTarget::DefaultIndex => Vec::new(),
            UploadTarget::Repository(name) => args(["--repository", name.as_str()]),
            UploadTarget::RepositoryUrl(url) => args(["--repository-url", url.as_str()]),
        }
    }
}

/// Everything the publish sequence needs to know about one release.
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseContext {
    pub previous: Version,
    pub new: Version,
    pub dry_run: bool,
    pub target: UploadTarget,
    /// Changelog bullets for `new`, embedded in the tag message
    pub changelog: String,
}

impl ReleaseContext {
    pub fn tag_name(&self) -> String {
        self.new.to_string()
    }

    pub fn commit_message(&self) -> String {
        format!("Bump version to {}", self.new)
    }

    pub fn tag_message(&self) -> String {
        format!("{}\n\nChangelog:\n{}", self.new, self.changelog)
    }
}

/// Runs the commit / tag / push / build / upload sequence.
pub struct Publisher<'a, R: CommandRunner> {
    runner: &'a R,
    config: &'a Config,
}

impl<'a, R: CommandRunner> Publisher<'a, R> {
    pub fn new(runner: &'a R, config: &'a Config) -> Self {
        Publisher { runner, config }
    }

    /// Commit the bumped files, tag the commit and push both.
    ///
    /// Push failures are reported and ignored; the remote may already be up
    /// to date, and the operator can push by hand.
    pub fn tag_and_push(&self, ctx: &ReleaseContext) -> Result<()> {
        let tag = ctx.tag_name();
        let mutate = RunOptions::mutating(ctx.dry_run);

        self.runner.run(&args(["git", "add", "--all"]), mutate)?;
        self.runner
            .run(&args(["git", "commit", "-m", ctx.commit_message().as_str()]), mutate)?;
        self.runner.run(
            &args(["git", "tag", "-a", tag.as_str(), "-m", ctx.tag_message().as_str()]),
            mutate,
        )?;

        let remote = self.config.remote.as_str();
        let push_branch = args(["git", "push", remote]);
        let push_tag = args(["git", "push", remote, tag.as_str()]);
        self.push_ignoring_errors(&push_branch, ctx.dry_run)?;
        self.push_ignoring_errors(&push_tag, ctx.dry_run)?;

        ui::display_success(&ui::marked(
            format!("Tagged {} and pushed to {}", tag, remote),
            ctx.dry_run,
        ));
        Ok(())
    }

    fn push_ignoring_errors(&self, command: &[String], dry_run: bool) -> Result<()> {
        let options = RunOptions::mutating(dry_run).ignoring_errors();
        self.runner.run(command, options)?;
        Ok(())
    }

    /// Build the distributable package and upload it.
    ///
    /// Build and upload failures are fatal.
    pub fn build_and_upload(&self, ctx: &ReleaseContext) -> Result<()> {
        let mutate = RunOptions::mutating(ctx.dry_run);

        self.runner.run(&self.config.build_command, mutate)?;

        let mut upload = self.config.upload_command.clone();
        upload.extend(ctx.target.upload_args());
        upload.push(self.config.artifact_pattern(&ctx.tag_name()));
        self.runner.run(&upload, mutate)?;

        ui::display_success(&ui::marked(format!("Uploaded {}", ctx.new), ctx.dry_run));
        Ok(())
    }

    /// Full publish sequence: tag and push, then build and upload.
    pub fn publish(&self, ctx: &ReleaseContext) -> Result<()> {
        self.tag_and_push(ctx)?;
        self.build_and_upload(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReleaseError;
    use crate::runner::MockRunner;

    fn context(dry_run: bool, target: UploadTarget) -> ReleaseContext {
        ReleaseContext {
            previous: Version::parse("1.2.3").unwrap(),
            new: Version::parse("1.2.4").unwrap(),
            dry_run,
            target,
            changelog: "- Fix thing (#5)".to_string(),
        }
    }

    fn commands(runner: &MockRunner) -> Vec<String> {
        runner
            .calls()
            .iter()
            .map(|c| c.command.join(" "))
            .collect()
    }

    #[test]
    fn test_messages() {
        let ctx = context(false, UploadTarget::DefaultIndex);
        assert_eq!(ctx.commit_message(), "Bump version to 1.2.4");
        assert_eq!(ctx.tag_message(), "1.2.4\n\nChangelog:\n- Fix thing (#5)");
    }

    #[test]
    fn test_publish_sequence() {
        let runner = MockRunner::new();
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        publisher
            .publish(&context(false, UploadTarget::DefaultIndex))
            .unwrap();

        assert_eq!(
            commands(&runner),
            vec![
                "git add --all",
                "git commit -m Bump version to 1.2.4",
                "git tag -a 1.2.4 -m 1.2.4\n\nChangelog:\n- Fix thing (#5)",
                "git push origin",
                "git push origin 1.2.4",
                "python -m build",
                "twine upload dist/*-1.2.4*",
            ]
        );
    }

    #[test]
    fn test_push_failures_are_ignored() {
        let runner = MockRunner::new().fail(&["git", "push"], 1, "rejected");
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        publisher
            .publish(&context(false, UploadTarget::DefaultIndex))
            .unwrap();
        assert_eq!(runner.executed().len(), 7);
    }

    #[test]
    fn test_commit_failure_is_fatal() {
        let runner = MockRunner::new().fail(&["git", "commit"], 1, "nothing to commit");
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        let err = publisher
            .publish(&context(false, UploadTarget::DefaultIndex))
            .unwrap_err();
        assert!(matches!(err, ReleaseError::CommandFailed { .. }));
        assert_eq!(runner.calls().len(), 2);
    }

    #[test]
    fn test_upload_failure_is_fatal() {
        let runner = MockRunner::new().fail(&["twine"], 1, "403 Forbidden");
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        let err = publisher
            .publish(&context(false, UploadTarget::DefaultIndex))
            .unwrap_err();
        assert!(err.to_string().contains("403 Forbidden"));
    }

    #[test]
    fn test_upload_target_arguments() {
        let runner = MockRunner::new();
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        publisher
            .build_and_upload(&context(false, UploadTarget::Repository("testpypi".into())))
            .unwrap();
        publisher
            .build_and_upload(&context(
                false,
                UploadTarget::RepositoryUrl("https://upload.example/legacy/".into()),
            ))
            .unwrap();

        let cmds = commands(&runner);
        assert_eq!(cmds[1], "twine upload --repository testpypi dist/*-1.2.4*");
        assert_eq!(
            cmds[3],
            "twine upload --repository-url https://upload.example/legacy/ dist/*-1.2.4*"
        );
    }

    #[test]
    fn test_dry_run_executes_nothing() {
        let runner = MockRunner::new().fail(&["twine"], 1, "would fail");
        let config = Config::default();
        let publisher = Publisher::new(&runner, &config);

        publisher
            .publish(&context(true, UploadTarget::DefaultIndex))
            .unwrap();

        assert_eq!(runner.calls().len(), 7);
        assert!(runner.executed().is_empty());
    }
}
