//! # conformat
//!
//! Compatibility and provenance support for declarative configuration
//! documents.
//!
//! Before two configuration documents are merged or compared, the pipeline
//! asks one question:
//!
//! > Are these two documents structurally allowed to meet?
//!
//! ## Core Contract
//!
//! 1. Parse and compare the declared schema version (`_format_version`)
//! 2. Enforce the transform-mode compatibility rule (`_transform`)
//! 3. Maintain the provenance ledger (`_ignore`) stamped with the tool
//!    identity set once at process start
//!
//! ## Architecture
//!
//! ```text
//! Document pair → check_documents → transform check → version check
//!
//! ToolIdentity → HistoryLedger::new_entry → append → Document
//! ```
//!
//! The crate performs no file I/O: callers load documents into
//! [`Document`] maps, run the checks, append history entries, and write
//! the result back out themselves.
//!
//! ## Error Classes
//!
//! - [`IdentityError`] values are invariant violations (caller contract
//!   breaches such as setting the tool identity twice). Fail fast, do not
//!   retry.
//! - [`VersionError`], [`FieldError`] and [`CompatError`] are validation
//!   errors describing a problem in the input documents; surface them to
//!   the end user.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compat;
pub mod document;
pub mod history;
pub mod identity;
pub mod version;

// Re-exports
pub use compat::{check_documents, check_transform, check_version, transform_flag, CompatError};
pub use document::{Document, FieldError};
pub use history::{HistoryEntry, HistoryLedger};
pub use identity::{
    format_identity, identity, set_identity, IdentityError, IdentityRegistry, ToolIdentity,
};
pub use version::{parse_format_version, FormatVersion, VersionError};

/// Document key holding the declared schema version, as `"major.minor"`.
pub const VERSION_KEY: &str = "_format_version";

/// Document key holding the transform-mode flag. Absent means `true`.
pub const TRANSFORM_KEY: &str = "_transform";

/// Document key holding the provenance history array.
pub const HISTORY_KEY: &str = "_ignore";
