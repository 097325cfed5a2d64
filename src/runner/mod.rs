//! External command execution
//!
//! Every collaborator the release workflow talks to (version control, the
//! package builder, the upload client) is an opaque subprocess. This module
//! provides a trait-based abstraction over running them so the workflow can be
//! exercised against a recording mock in tests.
//!
//! - [system::SystemRunner]: spawns real processes with `std::process`
//! - [mock::MockRunner]: records invocations and replays scripted output
//!
//! Commands are always a list of literal argument tokens and are never handed
//! to a shell.

pub mod mock;
pub mod system;

pub use mock::MockRunner;
pub use system::SystemRunner;

use crate::error::Result;

/// Per-invocation switches for [CommandRunner::run].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Return the captured stdout even when the process exits non-zero.
    pub ignore_errors: bool,
    /// Print the command before running it.
    pub log_command: bool,
    /// Print the command and return an empty string without running it.
    pub dry_run: bool,
}

impl RunOptions {
    /// Options for a read-only query: run it, fail loudly, stay quiet.
    pub fn query() -> Self {
        RunOptions::default()
    }

    /// Options for a mutating command: always logged, skipped under dry-run.
    pub fn mutating(dry_run: bool) -> Self {
        RunOptions {
            ignore_errors: false,
            log_command: true,
            dry_run,
        }
    }

    pub fn ignoring_errors(mut self) -> Self {
        self.ignore_errors = true;
        self
    }
}

/// Runs external commands on behalf of the release workflow.
pub trait CommandRunner {
    /// Run `command` and return its stdout.
    ///
    /// # Arguments
    /// * `command` - Program followed by its arguments, passed verbatim
    /// * `options` - Error, logging and dry-run behaviour
    ///
    /// # Returns
    /// * `Ok(String)` - Captured stdout, or an empty string under dry-run
    /// * `Err(ReleaseError::CommandFailed)` - Non-zero exit or spawn failure
    ///   when `ignore_errors` is not set
    fn run(&self, command: &[String], options: RunOptions) -> Result<String>;
}

impl<R: CommandRunner + ?Sized> CommandRunner for &R {
    fn run(&self, command: &[String], options: RunOptions) -> Result<String> {
        (**self).run(command, options)
    }
}

/// Render a command the way a shell user would type it.
pub fn quote_command(command: &[String]) -> String {
    shlex::try_join(command.iter().map(String::as_str)).unwrap_or_else(|_| command.join(" "))
}

/// Build an owned argument list from string slices.
pub fn args<I, S>(parts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    parts.into_iter().map(Into::into).collect()
}
