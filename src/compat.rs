//! Document-pair compatibility checks.
//!
//! Two documents may be merged only when they agree on transform mode and
//! on the major component of their declared format versions. The transform
//! check runs first: a transform mismatch means the documents are
//! structurally different, which is the more fundamental disagreement.
//!
//! ```
//! use serde_json::json;
//!
//! let a = json!({"_format_version": "2.1"}).as_object().unwrap().clone();
//! let b = json!({"_format_version": "2.9"}).as_object().unwrap().clone();
//! assert!(conformat::check_documents(&a, &b).is_ok());
//! ```

use serde_json::Value;

use crate::document::{value_type_name, Document, FieldError};
use crate::version::{parse_format_version, FormatVersion, VersionError};
use crate::{TRANSFORM_KEY, VERSION_KEY};

/// A compatibility failure between two documents.
///
/// All variants are validation errors: the fix is in the source documents.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompatError {
    /// The resolved `_transform` flags differ.
    #[error("files with '_transform: true' (default) and '_transform: false' are not compatible")]
    TransformMismatch,
    /// A `_transform` key holds something other than a boolean.
    #[error(transparent)]
    Field(#[from] FieldError),
    /// A declared `_format_version` failed to parse.
    #[error(transparent)]
    Version(#[from] VersionError),
    /// Both documents declare versions with different majors.
    #[error("major versions are incompatible; {left} and {right}")]
    MajorVersionMismatch {
        /// Version declared by the first document.
        left: FormatVersion,
        /// Version declared by the second document.
        right: FormatVersion,
    },
    /// Wrapper produced by [`check_documents`] around the failing check.
    #[error("files are incompatible; {source}")]
    Incompatible {
        /// The first check that failed.
        #[source]
        source: Box<CompatError>,
    },
}

/// Resolve a document's `_transform` flag.
///
/// Absent (or JSON `null`) defaults to `true`: transforms are expected to
/// apply unless a document opts out explicitly.
pub fn transform_flag(doc: &Document) -> Result<bool, CompatError> {
    match doc.get(TRANSFORM_KEY) {
        None | Some(Value::Null) => Ok(true),
        Some(value) => value.as_bool().ok_or_else(|| {
            FieldError::WrongType {
                key: TRANSFORM_KEY.to_string(),
                expected: "boolean",
                found: value_type_name(value),
            }
            .into()
        }),
    }
}

/// Check two documents for transform-mode compatibility.
///
/// A document with transforms applied and one without cannot merge.
pub fn check_transform(a: &Document, b: &Document) -> Result<(), CompatError> {
    if transform_flag(a)? != transform_flag(b)? {
        return Err(CompatError::TransformMismatch);
    }
    Ok(())
}

/// Whether a document declares a format version at all.
///
/// JSON `null` counts as undeclared.
fn declares_version(doc: &Document) -> bool {
    matches!(doc.get(VERSION_KEY), Some(value) if !value.is_null())
}

/// Check two documents for format-version compatibility.
///
/// Neither declaring a version is compatible (nothing to compare). When
/// only one declares it, that one must still parse. When both declare it,
/// the majors must match; minors are assumed backward compatible.
pub fn check_version(a: &Document, b: &Document) -> Result<(), CompatError> {
    match (declares_version(a), declares_version(b)) {
        (false, false) => Ok(()),
        (false, true) => {
            parse_format_version(b)?;
            Ok(())
        }
        (true, false) => {
            parse_format_version(a)?;
            Ok(())
        }
        (true, true) => {
            let left = parse_format_version(a)?;
            let right = parse_format_version(b)?;
            if !left.same_major(&right) {
                return Err(CompatError::MajorVersionMismatch { left, right });
            }
            Ok(())
        }
    }
}

/// Check whether two documents are compatible for merging.
///
/// Runs [`check_transform`] first, then [`check_version`], and fails fast
/// on the first failing predicate, wrapped in
/// [`CompatError::Incompatible`].
pub fn check_documents(a: &Document, b: &Document) -> Result<(), CompatError> {
    check_transform(a, b)
        .and_then(|()| check_version(a, b))
        .map_err(|source| CompatError::Incompatible {
            source: Box::new(source),
        })
}
