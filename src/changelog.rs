//! Changelog generation from merge history.
//!
//! The changelog is expected to list releases newest first, each as a
//! version header line followed by an underline of dashes:
//!
//! ```text
//! Changelog
//! =========
//!
//! 1.2.3
//! -----
//!
//! - Fix crash on empty input (#41)
//! ```
//!
//! New sections are inserted just above the first existing header.

use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;

use crate::atomic::write_atomic;
use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use crate::runner::{args, CommandRunner, RunOptions};
use crate::ui;

const FIELD_SEP: char = '\x1f';
const RECORD_SEP: char = '\x1e';

fn pull_request_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\(merge pull request (#\d+)[^)]*\)")
            .expect("pull request pattern compiles")
    })
}

fn underline_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-{3,}\s*$").expect("underline pattern compiles"))
}

/// A changelog section for one release
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub version: String,
    pub entries: Vec<String>,
}

impl Section {
    pub fn new(version: &Version, entries: Vec<String>) -> Self {
        Section {
            version: version.to_string(),
            entries,
        }
    }

    /// Bullet lines only, as embedded in the tag message
    pub fn body(&self) -> String {
        self.entries.join("\n")
    }

    fn lines(&self) -> Vec<String> {
        let mut lines = vec![
            String::new(),
            self.version.clone(),
            "-".repeat(self.version.chars().count()),
            String::new(),
        ];
        lines.extend(self.entries.iter().cloned());
        lines
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

/// Shorten `(Merge pull request #N from ...)` to `(#N)`.
pub fn rewrite_pull_request_refs(line: &str) -> String {
    pull_request_regex().replace_all(line, "($1)").into_owned()
}

/// Format one merge commit as a changelog bullet.
///
/// The body's lines are joined with spaces; a merge without a body falls back
/// to its subject alone.
pub fn format_merge_entry(subject: &str, body: &str) -> String {
    let body = body
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let subject = subject.trim();

    let entry = if body.is_empty() {
        format!("- {}", subject)
    } else {
        format!("- {} ({})", body, subject)
    };
    rewrite_pull_request_refs(&entry)
}

fn parse_merge_log(output: &str) -> Vec<String> {
    output
        .split(RECORD_SEP)
        .map(|record| record.trim_start_matches(['\n', '\r']))
        .filter(|record| !record.trim().is_empty())
        .map(|record| match record.split_once(FIELD_SEP) {
            Some((subject, body)) => format_merge_entry(subject, body),
            None => format_merge_entry(record, ""),
        })
        .collect()
}

/// Merge commits between the `previous` release tag and `HEAD`, as bullets.
///
/// This is a read-only query and runs under dry-run as well.
pub fn collect_merge_entries<R: CommandRunner>(
    runner: &R,
    previous: &Version,
) -> Result<Vec<String>> {
    let range = format!("{}..HEAD", previous);
    let command = args([
        "git".to_string(),
        "log".to_string(),
        "--merges".to_string(),
        format!("--pretty=format:%s{}%b{}", FIELD_SEP, RECORD_SEP),
        range,
    ]);
    let output = runner.run(&command, RunOptions::query())?;
    let entries = parse_merge_log(&output);
    tracing::debug!(count = entries.len(), %previous, "collected merge entries");
    Ok(entries)
}

/// Build the section documenting `new`, from merges since `previous`.
pub fn build_section<R: CommandRunner>(
    runner: &R,
    previous: &Version,
    new: &Version,
) -> Result<Section> {
    let entries = collect_merge_entries(runner, previous)?;
    Ok(Section::new(new, entries))
}

fn strip_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Produce the changelog `contents` with `section` inserted.
///
/// # Returns
/// * `Err(DuplicateTag)` - A line already equals the section's version
/// * `Err(ChangelogLayout)` - No underline, or one too close to the top to
///   have a header and blank line above it
pub fn render_splice(contents: &str, path: &Path, section: &Section) -> Result<String> {
    let mut lines: Vec<String> = contents.split_inclusive('\n').map(str::to_string).collect();

    if lines.iter().any(|line| strip_ending(line) == section.version) {
        return Err(ReleaseError::DuplicateTag(section.version.clone()));
    }

    let underline = lines
        .iter()
        .position(|line| underline_regex().is_match(strip_ending(line)))
        .ok_or_else(|| ReleaseError::ChangelogLayout {
            path: path.to_path_buf(),
            reason: "no section underline (---) found".to_string(),
        })?;

    if underline < 2 {
        return Err(ReleaseError::ChangelogLayout {
            path: path.to_path_buf(),
            reason: format!(
                "first underline on line {} leaves no room for a header and blank line",
                underline + 1
            ),
        });
    }

    // new lines follow the file's own line ending
    let ending = if lines[underline].ends_with("\r\n") {
        "\r\n"
    } else {
        "\n"
    };
    let insert_at = underline - 2;
    let new_lines = section.lines().into_iter().map(|line| line + ending);
    let tail = lines.split_off(insert_at);
    lines.extend(new_lines);
    lines.extend(tail);
    Ok(lines.concat())
}

/// Insert `section` into the changelog at `path`.
///
/// Under `dry_run` the would-be file is printed and nothing is written. On
/// any error the file is left unmodified.
pub fn splice(path: &Path, section: &Section, dry_run: bool) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let updated = render_splice(&contents, path, section)?;

    ui::display_file_write(path, dry_run);
    if dry_run {
        ui::display_file_preview(&updated);
        return Ok(());
    }

    write_atomic(path, &updated)?;
    tracing::info!(path = %path.display(), version = %section.version, "changelog updated");
    Ok(())
}
