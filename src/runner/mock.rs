use std::cell::RefCell;

use crate::error::{ReleaseError, Result};
use crate::runner::{quote_command, CommandRunner, RunOptions};

/// A single invocation seen by [MockRunner].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub command: Vec<String>,
    pub options: RunOptions,
}

impl RecordedCall {
    /// Whether the command would actually have been executed.
    pub fn executed(&self) -> bool {
        !self.options.dry_run
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Stdout(String),
    Failure { code: i32, stderr: String },
}

/// Mock runner for testing without spawning processes
///
/// Replies are matched by command prefix; the most recently registered match
/// wins. Unmatched commands succeed with empty output.
#[derive(Debug, Default)]
pub struct MockRunner {
    replies: Vec<(Vec<String>, Reply)>,
    calls: RefCell<Vec<RecordedCall>>,
}

impl MockRunner {
    /// Create a mock runner with no scripted replies
    pub fn new() -> Self {
        Self::default()
    }

    /// Reply with `stdout` to any command starting with `prefix`
    pub fn respond(mut self, prefix: &[&str], stdout: impl Into<String>) -> Self {
        self.replies
            .push((to_owned(prefix), Reply::Stdout(stdout.into())));
        self
    }

    /// Fail any command starting with `prefix`
    pub fn fail(mut self, prefix: &[&str], code: i32, stderr: impl Into<String>) -> Self {
        self.replies.push((
            to_owned(prefix),
            Reply::Failure {
                code,
                stderr: stderr.into(),
            },
        ));
        self
    }

    /// Every invocation in order, dry-run ones included
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.borrow().clone()
    }

    /// Commands that were actually executed (not dry-run)
    pub fn executed(&self) -> Vec<Vec<String>> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.executed())
            .map(|c| c.command.clone())
            .collect()
    }

    fn reply_for(&self, command: &[String]) -> Option<&Reply> {
        self.replies
            .iter()
            .rev()
            .find(|(prefix, _)| command.starts_with(prefix))
            .map(|(_, reply)| reply)
    }
}

fn to_owned(prefix: &[&str]) -> Vec<String> {
    prefix.iter().map(|s| s.to_string()).collect()
}

impl CommandRunner for MockRunner {
    fn run(&self, command: &[String], options: RunOptions) -> Result<String> {
        self.calls.borrow_mut().push(RecordedCall {
            command: command.to_vec(),
            options,
        });

        if options.dry_run {
            return Ok(String::new());
        }

        match self.reply_for(command) {
            None => Ok(String::new()),
            Some(Reply::Stdout(out)) => Ok(out.clone()),
            Some(Reply::Failure { .. }) if options.ignore_errors => Ok(String::new()),
            Some(Reply::Failure { code, stderr }) => Err(ReleaseError::CommandFailed {
                command: quote_command(command),
                code: *code,
                stderr: stderr.clone(),
            }),
        }
    }
}
