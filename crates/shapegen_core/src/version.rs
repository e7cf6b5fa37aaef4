//! Parse and order semantic versions with optional non-numeric prefixes.
//!
//! Dependency floors in the generator are written the way package ecosystems spell them (`v1.4.0`, `go1.21.0`,
//! `1.0.0-alpha.1`). This module parses those spellings into a [`SemanticVersion`] and defines the precedence order
//! used by minimum version selection.
//!
//! ## Notes
//! - A leading run of non-digit characters is kept as the `prefix` and reproduced by `Display`.
//! - The remainder must match `MAJOR.MINOR.PATCH[-prerelease][+build]`. Numeric components are either `0` or have no
//!   leading zero.
//! - Ordering ignores the prefix (unless [`SemanticVersion::compare_with_prefix`] is used) and always ignores build
//!   metadata. `PartialEq`, `Ord` and `Hash` all agree with that ordering.
//!
//! ## Examples
//! ```rust
//! use shapegen_core::version::SemanticVersion;
//!
//! let older: SemanticVersion = "1.2.0".parse().unwrap();
//! let newer: SemanticVersion = "v1.10.0".parse().unwrap();
//! assert!(older < newer);
//! assert_eq!(newer.to_string(), "v1.10.0");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use thiserror::Error;

/// Error produced when a version string does not match the semantic-version grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("invalid version `{input}`: {reason}")]
    InvalidVersion { input: String, reason: &'static str },
}

/// A parsed semantic version.
///
/// Construct with [`SemanticVersion::parse`] (or `str::parse`) or [`SemanticVersion::new`].
#[derive(Debug, Clone)]
pub struct SemanticVersion {
    prefix: Option<String>,
    major: u64,
    minor: u64,
    patch: u64,
    prerelease: Option<String>,
    build: Option<String>,
}

impl SemanticVersion {
    /// Create a plain `MAJOR.MINOR.PATCH` release version with no prefix.
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            prefix: None,
            major,
            minor,
            patch,
            prerelease: None,
            build: None,
        }
    }

    /// Parse a version string.
    ///
    /// ## Errors
    /// - [`VersionError::InvalidVersion`] if the text after the prefix is not a valid semantic version.
    pub fn parse(input: &str) -> Result<Self, VersionError> {
        let invalid = |reason: &'static str| VersionError::InvalidVersion {
            input: input.to_string(),
            reason,
        };

        let core_start = input
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(|| invalid("missing numeric version core"))?;
        let (prefix, rest) = input.split_at(core_start);

        // `+` can only introduce build metadata, and the version core never contains `-`, so splitting in this order
        // keeps hyphens inside prerelease and build identifiers intact.
        let (rest, build) = match rest.split_once('+') {
            Some((rest, build)) => (rest, Some(build)),
            None => (rest, None),
        };
        let (core, prerelease) = match rest.split_once('-') {
            Some((core, pre)) => (core, Some(pre)),
            None => (rest, None),
        };

        let mut parts = core.split('.');
        let (Some(major), Some(minor), Some(patch), None) = (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(invalid("expected MAJOR.MINOR.PATCH"));
        };

        let major = parse_numeric(major).map_err(invalid)?;
        let minor = parse_numeric(minor).map_err(invalid)?;
        let patch = parse_numeric(patch).map_err(invalid)?;

        if let Some(pre) = prerelease {
            validate_identifiers(pre, true).map_err(invalid)?;
        }
        if let Some(build) = build {
            validate_identifiers(build, false).map_err(invalid)?;
        }

        Ok(Self {
            prefix: (!prefix.is_empty()).then(|| prefix.to_string()),
            major,
            minor,
            patch,
            prerelease: prerelease.map(str::to_string),
            build: build.map(str::to_string),
        })
    }

    /// Return a copy of this version carrying the given prefix (e.g. `v`).
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn prerelease(&self) -> Option<&str> {
        self.prerelease.as_deref()
    }

    pub fn build_metadata(&self) -> Option<&str> {
        self.build.as_deref()
    }

    /// Whether this is a prerelease (`1.0.0-rc.1`).
    pub fn is_prerelease(&self) -> bool {
        self.prerelease.is_some()
    }

    /// Compare by semantic-version precedence, ignoring prefix and build metadata.
    ///
    /// ## Notes
    /// - Major, minor and patch compare numerically.
    /// - A release sorts after any prerelease of the same core.
    /// - Prerelease identifiers compare left to right: numeric identifiers numerically, numeric below alphanumeric,
    ///   alphanumeric lexically; a shorter identifier list sorts first when all shared identifiers are equal.
    pub fn compare(&self, other: &Self) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_prerelease(self.prerelease.as_deref(), other.prerelease.as_deref()))
    }

    /// Compare with a caller-supplied prefix ordering applied first.
    ///
    /// Falls back to [`SemanticVersion::compare`] when the prefixes are considered equal.
    pub fn compare_with_prefix<F>(&self, other: &Self, prefix_cmp: F) -> Ordering
    where
        F: Fn(Option<&str>, Option<&str>) -> Ordering,
    {
        prefix_cmp(self.prefix(), other.prefix()).then_with(|| self.compare(other))
    }
}

fn parse_numeric(text: &str) -> Result<u64, &'static str> {
    if text.is_empty() {
        return Err("empty numeric component");
    }
    if !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err("numeric component contains a non-digit");
    }
    if text.len() > 1 && text.starts_with('0') {
        return Err("numeric component has a leading zero");
    }
    text.parse().map_err(|_| "numeric component is too large")
}

fn validate_identifiers(text: &str, reject_leading_zero: bool) -> Result<(), &'static str> {
    for ident in text.split('.') {
        if ident.is_empty() {
            return Err("empty prerelease or build identifier");
        }
        if !ident.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'-') {
            return Err("identifier contains a character outside [0-9A-Za-z-]");
        }
        if reject_leading_zero && is_numeric(ident) && ident.len() > 1 && ident.starts_with('0') {
            return Err("numeric prerelease identifier has a leading zero");
        }
    }
    Ok(())
}

fn is_numeric(ident: &str) -> bool {
    !ident.is_empty() && ident.bytes().all(|b| b.is_ascii_digit())
}

fn compare_prerelease(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let mut left = a.split('.');
            let mut right = b.split('.');
            loop {
                match (left.next(), right.next()) {
                    (Some(l), Some(r)) => match compare_identifier(l, r) {
                        Ordering::Equal => continue,
                        other => return other,
                    },
                    (None, Some(_)) => return Ordering::Less,
                    (Some(_), None) => return Ordering::Greater,
                    (None, None) => return Ordering::Equal,
                }
            }
        }
    }
}

fn compare_identifier(a: &str, b: &str) -> Ordering {
    match (is_numeric(a), is_numeric(b)) {
        // No leading zeros, so length-then-lexical is numeric order without overflow.
        (true, true) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => a.cmp(b),
    }
}

impl PartialEq for SemanticVersion {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for SemanticVersion {}

impl PartialOrd for SemanticVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemanticVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl Hash for SemanticVersion {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.major.hash(state);
        self.minor.hash(state);
        self.patch.hash(state);
        self.prerelease.hash(state);
    }
}

impl FromStr for SemanticVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for SemanticVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = &self.prefix {
            f.write_str(prefix)?;
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if let Some(pre) = &self.prerelease {
            write!(f, "-{pre}")?;
        }
        if let Some(build) = &self.build {
            write!(f, "+{build}")?;
        }
        Ok(())
    }
}
