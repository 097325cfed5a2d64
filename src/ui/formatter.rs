//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from user interaction.
//! Functions here have no side effects beyond printing.

use std::path::Path;

use console::style;

use crate::changelog::Section;
use crate::domain::Version;

/// Format and print an error message in red.
pub fn display_error(message: &str) {
    eprintln!("{} {}", style("ERROR:").red().bold(), message);
}

/// Format and print a warning message in yellow.
pub fn display_warning(message: &str) {
    eprintln!("{} {}", style("⚠ WARNING:").yellow(), message);
}

/// Format and print a success message with green checkmark.
pub fn display_success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Format and print a status message with yellow arrow.
pub fn display_status(message: &str) {
    println!("{} {}", style("→").yellow(), message);
}

/// Prefix marking output lines whose action was skipped by dry-run.
pub const DRY_RUN_MARKER: &str = "[dry-run]";

/// `line` as printed in the given mode.
pub fn marked(line: String, dry_run: bool) -> String {
    if dry_run {
        format!("{} {}", DRY_RUN_MARKER, line)
    } else {
        line
    }
}

/// Echo line for a command; the same in both modes apart from the marker.
pub fn command_line(quoted: &str, dry_run: bool) -> String {
    marked(format!("$ {}", quoted), dry_run)
}

/// Echo line for a file rewrite; the same in both modes apart from the marker.
pub fn file_write_line(path: &Path, dry_run: bool) -> String {
    marked(format!("write {}", path.display()), dry_run)
}

/// Print a command line about to run, or one skipped by dry-run.
pub fn display_command(quoted: &str, dry_run: bool) {
    println!("{}", style(command_line(quoted, dry_run)).cyan());
}

/// Print a file about to be rewritten, or one skipped by dry-run.
pub fn display_file_write(path: &Path, dry_run: bool) {
    println!("{}", style(file_write_line(path, dry_run)).cyan());
}

/// Print the full contents a file would have after a dry-run edit.
pub fn display_file_preview(contents: &str) {
    for line in contents.lines() {
        println!("  {}", style(line).dim());
    }
}

/// Display the version change about to be released.
///
/// # Arguments
/// * `current` - Version declared before the release
/// * `new` - Version being released
pub fn display_version_change(current: &Version, new: &Version) {
    println!("\n{}", style("Proposed Version Change:").bold());
    println!("  From: {}", style(current).red());
    println!("  To:   {}", style(new).green());
}

/// Display the changelog section generated for a release.
///
/// Shows at most 10 entries, followed by a count of the remainder.
pub fn display_changelog(section: &Section) {
    println!(
        "\n{}",
        style(format!("Changelog for {}", section.version)).bold()
    );
    if section.entries.is_empty() {
        println!("  (no merge commits since the previous release)");
        return;
    }

    for entry in section.entries.iter().take(10) {
        println!("  {}", entry);
    }

    if section.entries.len() > 10 {
        println!("  ... and {} more entries", section.entries.len() - 10);
    }
}
