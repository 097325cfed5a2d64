//! Pre-release qualifiers
//!
//! A pre-release is a phase letter (alpha, beta, release candidate) followed by
//! a counter, written without a separator in canonical form: `a1`, `b2`, `rc3`.

use crate::error::{ReleaseError, Result};
use std::fmt;
use std::str::FromStr;

/// Pre-release phase, ordered alpha < beta < release candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PreReleaseKind {
    Alpha,
    Beta,
    ReleaseCandidate,
}

impl PreReleaseKind {
    /// Parse a phase spelling
    ///
    /// Accepts the canonical letters and their alternate spellings:
    /// "a"/"alpha", "b"/"beta", "rc"/"c"/"pre"/"preview" (case-insensitive).
    pub fn parse(s: &str) -> Result<Self> {
        s.parse()
    }

    /// Canonical spelling
    pub fn as_str(&self) -> &'static str {
        match self {
            PreReleaseKind::Alpha => "a",
            PreReleaseKind::Beta => "b",
            PreReleaseKind::ReleaseCandidate => "rc",
        }
    }
}

impl FromStr for PreReleaseKind {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "a" | "alpha" => Ok(PreReleaseKind::Alpha),
            "b" | "beta" => Ok(PreReleaseKind::Beta),
            "rc" | "c" | "pre" | "preview" => Ok(PreReleaseKind::ReleaseCandidate),
            _ => Err(ReleaseError::invalid_version(s)),
        }
    }
}

impl fmt::Display for PreReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pre-release qualifier: phase plus counter
///
/// Field order gives the derived ordering: phase first, then counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PreRelease {
    pub kind: PreReleaseKind,
    pub number: u64,
}

impl PreRelease {
    pub fn new(kind: PreReleaseKind, number: u64) -> Self {
        PreRelease { kind, number }
    }

    /// Same phase, next counter; `None` once the counter is exhausted
    pub fn increment(&self) -> Option<Self> {
        Some(PreRelease {
            kind: self.kind,
            number: self.number.checked_add(1)?,
        })
    }
}

impl fmt::Display for PreRelease {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parse_canonical() {
        assert_eq!(PreReleaseKind::parse("a").unwrap(), PreReleaseKind::Alpha);
        assert_eq!(PreReleaseKind::parse("b").unwrap(), PreReleaseKind::Beta);
        assert_eq!(
            PreReleaseKind::parse("rc").unwrap(),
            PreReleaseKind::ReleaseCandidate
        );
    }

    #[test]
    fn test_kind_parse_alternate_spellings() {
        assert_eq!(PreReleaseKind::parse("Alpha").unwrap(), PreReleaseKind::Alpha);
        assert_eq!(PreReleaseKind::parse("BETA").unwrap(), PreReleaseKind::Beta);
        for spelling in ["c", "pre", "preview"] {
            assert_eq!(
                PreReleaseKind::parse(spelling).unwrap(),
                PreReleaseKind::ReleaseCandidate
            );
        }
    }

    #[test]
    fn test_kind_parse_invalid() {
        assert!(PreReleaseKind::parse("gamma").is_err());
        assert!(PreReleaseKind::parse("").is_err());
    }

    #[test]
    fn test_kind_ordering() {
        assert!(PreReleaseKind::Alpha < PreReleaseKind::Beta);
        assert!(PreReleaseKind::Beta < PreReleaseKind::ReleaseCandidate);
    }

    #[test]
    fn test_prerelease_display() {
        let pr = PreRelease::new(PreReleaseKind::ReleaseCandidate, 2);
        assert_eq!(pr.to_string(), "rc2");
        assert_eq!(PreRelease::new(PreReleaseKind::Alpha, 0).to_string(), "a0");
    }

    #[test]
    fn test_prerelease_increment() {
        let pr = PreRelease::new(PreReleaseKind::Beta, 99);
        let next = pr.increment().unwrap();
        assert_eq!(next.kind, PreReleaseKind::Beta);
        assert_eq!(next.number, 100);
        assert!(next > pr);
    }

    #[test]
    fn test_prerelease_increment_at_counter_limit() {
        let pr = PreRelease::new(PreReleaseKind::ReleaseCandidate, u64::MAX);
        assert_eq!(pr.increment(), None);
    }

    #[test]
    fn test_prerelease_ordering_phase_before_counter() {
        let a9 = PreRelease::new(PreReleaseKind::Alpha, 9);
        let b1 = PreRelease::new(PreReleaseKind::Beta, 1);
        assert!(a9 < b1);
    }
}
