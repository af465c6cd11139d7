//! # Candidate Endpoint Model
//!
//! A [`Candidate`] is a `host` or `host:port` string whose host has the shape of
//! an IPv4 dotted quad. Octets are **not** range checked: `999.1.1.1` is a valid
//! candidate. The probe simply fails to reach it.

use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// ASCII-only rendition of `^(\d{1,3}\.){3}\d{1,3}(:\d+)?$`.
pub const ENDPOINT_PATTERN: &str = r"^([0-9]{1,3}\.){3}[0-9]{1,3}(:[0-9]+)?$";

static ENDPOINT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ENDPOINT_PATTERN).expect("endpoint pattern is a valid regex"));

/// Returns `true` when `s` is exactly one endpoint, with no surrounding whitespace.
pub fn is_endpoint(s: &str) -> bool {
    ENDPOINT_RE.is_match(s)
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Candidate(String);

impl Candidate {
    /// The address part, without the port.
    pub fn host(&self) -> &str {
        match self.0.split_once(':') {
            Some((host, _)) => host,
            None => &self.0,
        }
    }

    /// The explicit port digits, if the candidate carries one.
    pub fn explicit_port(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, port)| port)
    }

    /// Resolves the port to probe, falling back to `default` when none was given.
    ///
    /// Fails when the explicit port does not fit in 16 bits.
    pub fn port_or(&self, default: u16) -> Result<u16, ParseIntError> {
        match self.explicit_port() {
            Some(port) => port.parse::<u16>(),
            None => Ok(default),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Candidate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if is_endpoint(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(format!("invalid endpoint: {s}"))
        }
    }
}

// Ordering and equality are the inner string's, so set lookups by `&str` agree.
impl Borrow<str> for Candidate {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Candidate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deduplicated candidates merged from every source.
///
/// Uniqueness is by exact string, so `1.1.1.1` and `1.1.1.1:443` are two
/// different candidates. Iteration is in lexicographic order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateSet {
    inner: BTreeSet<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one candidate, returning `false` if it was already present.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        self.inner.insert(candidate)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.inner.contains(candidate)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.inner.iter()
    }
}

impl Extend<Candidate> for CandidateSet {
    fn extend<T: IntoIterator<Item = Candidate>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<T: IntoIterator<Item = Candidate>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = std::collections::btree_set::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
