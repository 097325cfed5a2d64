//! Reading and rewriting the version declaration in a source file.
//!
//! The declaration is a single line of the form `<identifier> = "<version>"`
//! (single quotes accepted), e.g. `__version__ = "1.2.3"`.

use std::fs;
use std::path::Path;

use regex::Regex;

use crate::atomic::write_atomic;
use crate::domain::Version;
use crate::error::{ReleaseError, Result};
use crate::ui;

fn declaration_regex(identifier: &str) -> Result<Regex> {
    let pattern = format!(
        r#"^(?P<indent>\s*){}\s*=\s*["'](?P<value>[^"']*)["']"#,
        regex::escape(identifier)
    );
    Regex::new(&pattern).map_err(|e| ReleaseError::config(format!("bad identifier: {e}")))
}

/// Read the version currently declared in `path`.
///
/// The first line declaring `identifier` wins.
///
/// # Returns
/// * `Ok(Version)` - The parsed declared version
/// * `Err(VersionNotFound)` - No line declares `identifier`
/// * `Err(InvalidVersionFormat)` - The declared value is not a valid version
pub fn read_current(path: &Path, identifier: &str) -> Result<Version> {
    let contents = fs::read_to_string(path)?;
    let re = declaration_regex(identifier)?;

    contents
        .lines()
        .find_map(|line| re.captures(line))
        .map(|caps| Version::parse(&caps["value"]))
        .unwrap_or_else(|| {
            Err(ReleaseError::VersionNotFound {
                path: path.to_path_buf(),
                identifier: identifier.to_string(),
            })
        })
}

/// Produce the contents of `path` with the declaration set to `version`.
///
/// Only the declaration line changes; its indentation and line ending are
/// kept, every other byte is returned untouched.
pub fn render_update(
    contents: &str,
    path: &Path,
    identifier: &str,
    version: &Version,
) -> Result<String> {
    let re = declaration_regex(identifier)?;
    let mut lines: Vec<String> = contents.split_inclusive('\n').map(str::to_string).collect();

    let matches: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, line)| re.is_match(line))
        .map(|(i, _)| i)
        .collect();

    let index = match matches.as_slice() {
        [index] => *index,
        [] => {
            return Err(ReleaseError::VersionNotFound {
                path: path.to_path_buf(),
                identifier: identifier.to_string(),
            })
        }
        _ => {
            return Err(ReleaseError::AmbiguousVersion {
                path: path.to_path_buf(),
                identifier: identifier.to_string(),
            })
        }
    };

    let line = &lines[index];
    let ending = if line.ends_with("\r\n") {
        "\r\n"
    } else if line.ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let indent = re
        .captures(line)
        .and_then(|caps| caps.name("indent"))
        .map_or("", |m| m.as_str());

    let replacement = format!("{indent}{identifier} = \"{version}\"{ending}");
    lines[index] = replacement;
    Ok(lines.concat())
}

/// Set the declared version in `path` to `version`.
///
/// Under `dry_run` the would-be file is printed and nothing is written.
pub fn write(path: &Path, identifier: &str, version: &Version, dry_run: bool) -> Result<()> {
    let contents = fs::read_to_string(path)?;
    let updated = render_update(&contents, path, identifier, version)?;

    ui::display_file_write(path, dry_run);
    if dry_run {
        ui::display_file_preview(&updated);
        return Ok(());
    }

    write_atomic(path, &updated)?;
    tracing::info!(path = %path.display(), %version, "version file updated");
    Ok(())
}
