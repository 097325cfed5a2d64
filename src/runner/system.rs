use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{ReleaseError, Result};
use crate::runner::{quote_command, CommandRunner, RunOptions};
use crate::ui;

/// Locale forced onto every child so tool output is parsed as UTF-8.
const FORCED_LOCALE: &str = "C.UTF-8";

/// Runs commands as real child processes.
#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    work_dir: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        SystemRunner { work_dir: None }
    }

    /// Run every command from `dir` instead of the current directory.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        SystemRunner {
            work_dir: Some(dir.as_ref().to_path_buf()),
        }
    }

    fn build(&self, command: &[String]) -> Command {
        let mut cmd = Command::new(&command[0]);
        cmd.args(&command[1..])
            .env("LC_ALL", FORCED_LOCALE)
            .env("LANG", FORCED_LOCALE);
        if let Some(dir) = &self.work_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, command: &[String], options: RunOptions) -> Result<String> {
        if command.is_empty() {
            return Err(ReleaseError::config("empty command"));
        }

        let quoted = quote_command(command);

        if options.log_command || options.dry_run {
            ui::display_command(&quoted, options.dry_run);
        }
        tracing::debug!(command = %quoted, dry_run = options.dry_run, "running");
        if options.dry_run {
            return Ok(String::new());
        }

        let output = match self.build(command).output() {
            Ok(output) => output,
            Err(e) if options.ignore_errors => {
                tracing::warn!(command = %quoted, error = %e, "spawn failed, ignoring");
                return Ok(String::new());
            }
            Err(e) => {
                return Err(ReleaseError::CommandFailed {
                    command: quoted,
                    code: -1,
                    stderr: e.to_string(),
                })
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let code = output.status.code().unwrap_or(-1);

            if options.ignore_errors {
                tracing::warn!(command = %quoted, code, %stderr, "command failed, ignoring");
                return Ok(stdout);
            }

            return Err(ReleaseError::CommandFailed {
                command: quoted,
                code,
                stderr,
            });
        }

        Ok(stdout)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::runner::args;

    #[test]
    fn test_captures_stdout() {
        let runner = SystemRunner::new();
        let out = runner
            .run(&args(["echo", "hello"]), RunOptions::query())
            .unwrap();
        assert_eq!(out.trim(), "hello");
    }

    #[test]
    fn test_forces_utf8_locale() {
        let runner = SystemRunner::new();
        let out = runner
            .run(&args(["sh", "-c", "echo $LC_ALL"]), RunOptions::query())
            .unwrap();
        assert_eq!(out.trim(), FORCED_LOCALE);
    }

    #[test]
    fn test_nonzero_exit_is_error() {
        let runner = SystemRunner::new();
        let err = runner
            .run(
                &args(["sh", "-c", "echo oops >&2; exit 3"]),
                RunOptions::query(),
            )
            .unwrap_err();
        match err {
            ReleaseError::CommandFailed { code, stderr, .. } => {
                assert_eq!(code, 3);
                assert_eq!(stderr, "oops");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_ignore_errors_returns_output() {
        let runner = SystemRunner::new();
        let out = runner
            .run(
                &args(["sh", "-c", "echo partial; exit 1"]),
                RunOptions::query().ignoring_errors(),
            )
            .unwrap();
        assert_eq!(out.trim(), "partial");
    }

    #[test]
    fn test_dry_run_does_not_execute() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("marker");
        let runner = SystemRunner::new();
        let out = runner
            .run(
                &args(["touch", marker.to_str().unwrap()]),
                RunOptions::mutating(true),
            )
            .unwrap();
        assert!(out.is_empty());
        assert!(!marker.exists());
    }

    #[test]
    fn test_missing_program_is_error() {
        let runner = SystemRunner::new();
        let result = runner.run(
            &args(["pkg-release-definitely-missing-binary"]),
            RunOptions::query(),
        );
        assert!(matches!(result, Err(ReleaseError::CommandFailed { .. })));
    }

    #[test]
    fn test_runs_in_configured_dir() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::in_dir(dir.path());
        let out = runner.run(&args(["pwd"]), RunOptions::query()).unwrap();
        let reported = std::fs::canonicalize(out.trim()).unwrap();
        assert_eq!(reported, std::fs::canonicalize(dir.path()).unwrap());
    }
}
