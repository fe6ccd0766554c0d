//! Declared schema version parsing and comparison.
//!
//! Every configuration document may declare the schema version it was
//! written against in its `_format_version` key, as `"major"` or
//! `"major.minor"`. Minor versions are additive and assumed backward
//! compatible; only the major component participates in compatibility
//! decisions (see [`crate::compat`]).
//!
//! An absent `_format_version` is not an error here or in the
//! compatibility checks; a present-but-malformed one always is.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::document::{value_type_name, Document};
use crate::VERSION_KEY;

/// Accepted syntax for a declared version: base-10 digits only, one
/// optional minor component. No sign, no whitespace, no extra segments.
const VERSION_SYNTAX: &str = r"^[0-9]+(\.[0-9]+)?$";

/// Error parsing a document's declared format version.
///
/// These are validation errors: the fix is in the source document, not in
/// the calling code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// The document does not declare `_format_version` at all.
    #[error("field '_format_version' is missing")]
    Missing,
    /// The key is present but does not hold a string.
    #[error("expected field '_format_version' to be a string in 'x.y' format, got {found}")]
    NotAString {
        /// The type actually stored under the key.
        found: &'static str,
    },
    /// The string is not of the form `"major"` or `"major.minor"`.
    #[error("expected field '_format_version' to be a string in 'x.y' format, got '{value}'")]
    Malformed {
        /// The offending string.
        value: String,
    },
}

/// A parsed `_format_version` value.
///
/// Ordering is major-then-minor, so versions sort the way release numbers
/// read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    /// Major component. Documents with different majors never merge.
    pub major: u64,
    /// Minor component, 0 when the document omits it.
    pub minor: u64,
}

impl FormatVersion {
    /// Create a version from its components.
    pub fn new(major: u64, minor: u64) -> Self {
        Self { major, minor }
    }

    /// Whether two versions share a major component.
    ///
    /// Minor versions are assumed backward compatible within a major.
    pub fn same_major(&self, other: &Self) -> bool {
        self.major == other.major
    }
}

impl FromStr for FormatVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let syntax = regex_lite::Regex::new(VERSION_SYNTAX).unwrap();
        if !syntax.is_match(s) {
            return Err(VersionError::Malformed {
                value: s.to_string(),
            });
        }

        let (major, minor) = match s.split_once('.') {
            Some((major, minor)) => (major, Some(minor)),
            None => (s, None),
        };

        // Syntax is already checked; parse can only fail on overflow.
        let major = major.parse::<u64>().map_err(|_| VersionError::Malformed {
            value: s.to_string(),
        })?;
        let minor = match minor {
            Some(minor) => minor.parse::<u64>().map_err(|_| VersionError::Malformed {
                value: s.to_string(),
            })?,
            None => 0,
        };

        Ok(Self { major, minor })
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Parse the `_format_version` declared by a document.
///
/// Fails if the key is missing, is not a string, or is not `"major"` /
/// `"major.minor"` with non-negative base-10 components.
pub fn parse_format_version(doc: &Document) -> Result<FormatVersion, VersionError> {
    let value = doc.get(VERSION_KEY).ok_or(VersionError::Missing)?;
    let version = value.as_str().ok_or(VersionError::NotAString {
        found: value_type_name(value),
    })?;
    version.parse()
}
