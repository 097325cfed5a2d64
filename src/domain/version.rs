use crate::domain::prerelease::{PreRelease, PreReleaseKind};
use crate::error::{ReleaseError, Result};
use regex::{Captures, Regex};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

/// Python packaging version grammar (PEP 440), alternate spellings included.
const VERSION_PATTERN: &str = r"(?ix)
    ^\s*
    v?
    (?:(?P<epoch>[0-9]+)!)?
    (?P<release>[0-9]+(?:\.[0-9]+)*)
    (?P<pre>
        [-_.]?
        (?P<pre_l>alpha|a|beta|b|preview|pre|c|rc)
        [-_.]?
        (?P<pre_n>[0-9]+)?
    )?
    (?P<post>
        (?:-(?P<post_n1>[0-9]+))
        |
        (?:
            [-_.]?
            (?P<post_l>post|rev|r)
            [-_.]?
            (?P<post_n2>[0-9]+)?
        )
    )?
    (?P<dev>
        [-_.]?
        dev
        [-_.]?
        (?P<dev_n>[0-9]+)?
    )?
    (?:\+(?P<local>[a-z0-9]+(?:[-_.][a-z0-9]+)*))?
    \s*$
";

fn version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(VERSION_PATTERN).expect("version pattern compiles"))
}

/// A package version following the Python packaging versioning rules
///
/// Equality and ordering follow the versioning rules rather than the fields:
/// `1.0` and `1.0.0` are equal.
#[derive(Debug, Clone)]
pub struct Version {
    pub epoch: u64,
    pub release: Vec<u64>,
    pub pre: Option<PreRelease>,
    pub post: Option<u64>,
    pub dev: Option<u64>,
    pub local: Option<String>,
}

impl Version {
    /// Create a final release from its numeric segments
    pub fn new(release: Vec<u64>) -> Self {
        Version {
            epoch: 0,
            release,
            pre: None,
            post: None,
            dev: None,
            local: None,
        }
    }

    /// Parse a version string (e.g., "1.2.3", "2!1.0rc1.post2.dev3+local.7")
    ///
    /// Alternate spellings are normalized: `1.0-alpha.1` parses as `1.0a1`,
    /// `1.0-1` as `1.0.post1`, `1.0.dev` as `1.0.dev0`.
    pub fn parse(text: &str) -> Result<Self> {
        let caps = version_regex()
            .captures(text)
            .ok_or_else(|| ReleaseError::invalid_version(text))?;

        let number = |name: &str| -> Result<Option<u64>> {
            caps.name(name)
                .map(|m| {
                    m.as_str()
                        .parse::<u64>()
                        .map_err(|_| ReleaseError::invalid_version(text))
                })
                .transpose()
        };

        let epoch = number("epoch")?.unwrap_or(0);

        let release = caps["release"]
            .split('.')
            .map(|part| {
                part.parse::<u64>()
                    .map_err(|_| ReleaseError::invalid_version(text))
            })
            .collect::<Result<Vec<_>>>()?;

        let pre = match caps.name("pre_l") {
            Some(label) => Some(PreRelease::new(
                PreReleaseKind::parse(label.as_str())?,
                number("pre_n")?.unwrap_or(0),
            )),
            None => None,
        };

        let post = if caps.name("post").is_some() {
            Some(number("post_n1")?.or(number("post_n2")?).unwrap_or(0))
        } else {
            None
        };

        let dev = if caps.name("dev").is_some() {
            Some(number("dev_n")?.unwrap_or(0))
        } else {
            None
        };

        Ok(Version {
            epoch,
            release,
            pre,
            post,
            dev,
            local: normalize_local(&caps),
        })
    }

    /// The smallest sensible successor of this version
    ///
    /// Bumps the most specific component present: dev, else post, else the
    /// pre-release counter, else the last release segment. Epoch and local
    /// label are carried over unchanged.
    ///
    /// Fails with `InvalidVersionFormat` when the component to bump is
    /// already `u64::MAX`.
    pub fn increment(&self) -> Result<Self> {
        let overflow = || ReleaseError::invalid_version(format!("{} has no successor", self));

        let mut next = self.clone();
        if let Some(dev) = next.dev.as_mut() {
            *dev = dev.checked_add(1).ok_or_else(overflow)?;
        } else if let Some(post) = next.post.as_mut() {
            *post = post.checked_add(1).ok_or_else(overflow)?;
        } else if let Some(pre) = next.pre.as_mut() {
            *pre = pre.increment().ok_or_else(overflow)?;
        } else if let Some(last) = next.release.last_mut() {
            *last = last.checked_add(1).ok_or_else(overflow)?;
        } else {
            next.release.push(1);
        }
        Ok(next)
    }

    /// Whether this is a pre-release or development snapshot
    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (None, None, Some(_)) => PreKey::DevOnly,
            (Some(pre), _, _) => PreKey::Pre(pre),
            _ => PreKey::Final,
        }
    }

    fn dev_key(&self) -> (bool, u64) {
        match self.dev {
            Some(n) => (false, n),
            None => (true, 0),
        }
    }
}

/// Sort position of the pre-release part relative to other versions of the
/// same release. Variant order is the sort order.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum PreKey {
    DevOnly,
    Pre(PreRelease),
    Final,
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum LocalSegment {
    Text(String),
    Number(u64),
}

fn normalize_local(caps: &Captures<'_>) -> Option<String> {
    caps.name("local").map(|m| {
        m.as_str()
            .to_ascii_lowercase()
            .replace(['-', '_'], ".")
    })
}

fn local_segments(local: &str) -> Vec<LocalSegment> {
    local
        .split('.')
        .map(|seg| match seg.parse::<u64>() {
            Ok(n) if seg.bytes().all(|b| b.is_ascii_digit()) => LocalSegment::Number(n),
            _ => LocalSegment::Text(seg.to_ascii_lowercase()),
        })
        .collect()
}

fn cmp_release(a: &[u64], b: &[u64]) -> Ordering {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let x = a.get(i).copied().unwrap_or(0);
            let y = b.get(i).copied().unwrap_or(0);
            x.cmp(&y)
        })
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

fn cmp_local(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => local_segments(x).cmp(&local_segments(y)),
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| cmp_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            .then_with(|| self.dev_key().cmp(&other.dev_key()))
            .then_with(|| cmp_local(self.local.as_deref(), other.local.as_deref()))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl FromStr for Version {
    type Err = ReleaseError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.epoch != 0 {
            write!(f, "{}!", self.epoch)?;
        }
        let release: Vec<String> = self.release.iter().map(u64::to_string).collect();
        f.write_str(&release.join("."))?;
        if let Some(pre) = &self.pre {
            write!(f, "{}", pre)?;
        }
        if let Some(post) = self.post {
            write!(f, ".post{}", post)?;
        }
        if let Some(dev) = self.dev {
            write!(f, ".dev{}", dev)?;
        }
        if let Some(local) = &self.local {
            write!(f, "+{}", local)?;
        }
        Ok(())
    }
}
