//! Version ordering and requirement strings
//!
//! Versions are opaque strings; the index's format is looser than semver, so
//! they are never parsed into structured form. All comparison goes through
//! the segment-wise order defined here.

use std::cmp::Ordering;
use std::fmt;

/// Compare two version strings segment by segment.
///
/// Segments are split on `.` and `-`. Two segments compare numerically when
/// both parse as non-negative integers, otherwise lexicographically. A
/// version that is a strict prefix of another sorts below it.
pub fn compare(a: &str, b: &str) -> Ordering {
    let left: Vec<&str> = split(a);
    let right: Vec<&str> = split(b);
    for (x, y) in left.iter().zip(right.iter()) {
        let ord = match (x.parse::<u64>(), y.parse::<u64>()) {
            (Ok(m), Ok(n)) => m.cmp(&n),
            _ => x.cmp(y),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    left.len().cmp(&right.len())
}

fn split(version: &str) -> Vec<&str> {
    version.split(['.', '-']).collect()
}

/// A dependency constraint from the index or a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Empty requirement: any version.
    Any,
    /// `=X` or bare `X`: exactly that version string.
    Exact(String),
    /// `>X`.
    Greater(String),
    /// `>=X`.
    AtLeast(String),
}

impl Requirement {
    /// Parse a requirement string. Every input is valid: empty means any
    /// version, a bare version means exactly that version.
    pub fn parse(raw: &str) -> Requirement {
        let raw = raw.trim();
        if raw.is_empty() {
            Requirement::Any
        } else if let Some(version) = raw.strip_prefix(">=") {
            Requirement::AtLeast(version.trim().to_string())
        } else if let Some(version) = raw.strip_prefix('>') {
            Requirement::Greater(version.trim().to_string())
        } else if let Some(version) = raw.strip_prefix('=') {
            Requirement::Exact(version.trim().to_string())
        } else {
            Requirement::Exact(raw.to_string())
        }
    }

    /// Whether `version` satisfies this requirement. Exact requirements use
    /// string equality; ordered ones use [`compare`].
    pub fn matches(&self, version: &str) -> bool {
        match self {
            Requirement::Any => true,
            Requirement::Exact(wanted) => version == wanted,
            Requirement::Greater(floor) => compare(version, floor) == Ordering::Greater,
            Requirement::AtLeast(floor) => compare(version, floor) != Ordering::Less,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Requirement::Any => write!(f, "*"),
            Requirement::Exact(v) => write!(f, "={v}"),
            Requirement::Greater(v) => write!(f, ">{v}"),
            Requirement::AtLeast(v) => write!(f, ">={v}"),
        }
    }
}
