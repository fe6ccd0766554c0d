//! Tool identity for provenance stamping.
//!
//! Every history entry records which tool build produced it. The identity
//! is a name/version/commit triple set once at process start; a process
//! must never report two different identities, so the registry is
//! write-once and a second set attempt is an error rather than an
//! overwrite.
//!
//! [`IdentityRegistry`] is an ordinary value and can be constructed and
//! injected wherever an owned registry is preferable (or testable). The
//! module-level [`set_identity`] / [`identity`] / [`format_identity`]
//! functions operate on one process-global instance, which is what the
//! history ledger uses by default.

use parking_lot::RwLock;

/// Error in the identity lifecycle.
///
/// All variants are invariant violations: the embedding application broke
/// the set-once-read-after contract and should be fixed, not retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The identity was read before any set.
    #[error("the tool identity was not set; set it once at startup")]
    NotSet,
    /// A second set attempt in the same registry.
    #[error("the tool identity was already set to '{current}'")]
    AlreadySet {
        /// Formatted identity currently held by the registry.
        current: String,
    },
    /// The tool name may not be empty.
    #[error("the tool identity name cannot be empty")]
    EmptyName,
}

/// The name/version/commit triple identifying the running tool build.
///
/// `version` and `commit` are optional (empty string means omitted).
/// Omitting them keeps history entries lower-cardinality, which reads
/// better in GitOps diffs, at the cost of less detail.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToolIdentity {
    name: String,
    version: String,
    commit: String,
}

impl ToolIdentity {
    /// Create an identity. Fails if `name` is empty.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        commit: impl Into<String>,
    ) -> Result<Self, IdentityError> {
        let name = name.into();
        if name.is_empty() {
            return Err(IdentityError::EmptyName);
        }
        Ok(Self {
            name,
            version: version.into(),
            commit: commit.into(),
        })
    }

    /// Tool name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tool version, empty when omitted.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Source commit the tool was built from, empty when omitted.
    pub fn commit(&self) -> &str {
        &self.commit
    }

    /// Single display string, e.g. `"kced 1.0 (abc123)"`.
    ///
    /// The commit is included only when the version is also present;
    /// omitted parts shorten the string to `"name version"` or `"name"`.
    pub fn format(&self) -> String {
        if !self.version.is_empty() && !self.commit.is_empty() {
            return format!("{} {} ({})", self.name, self.version, self.commit);
        }
        if !self.version.is_empty() {
            return format!("{} {}", self.name, self.version);
        }
        self.name.clone()
    }
}

/// A write-once holder for a [`ToolIdentity`].
///
/// The lock serializes concurrent set attempts so exactly one wins and
/// every later one fails, rather than last-write-wins.
#[derive(Debug, Default)]
pub struct IdentityRegistry {
    slot: RwLock<Option<ToolIdentity>>,
}

impl IdentityRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the identity. Fails if one was already stored.
    pub fn set(&self, identity: ToolIdentity) -> Result<(), IdentityError> {
        let mut slot = self.slot.write();
        if let Some(current) = slot.as_ref() {
            return Err(IdentityError::AlreadySet {
                current: current.format(),
            });
        }
        *slot = Some(identity);
        Ok(())
    }

    /// Return the stored identity. Fails if none was set yet.
    pub fn get(&self) -> Result<ToolIdentity, IdentityError> {
        self.slot.read().clone().ok_or(IdentityError::NotSet)
    }

    /// Formatted identity string, see [`ToolIdentity::format`].
    pub fn format(&self) -> Result<String, IdentityError> {
        Ok(self.get()?.format())
    }
}

static GLOBAL_REGISTRY: IdentityRegistry = IdentityRegistry {
    slot: RwLock::new(None),
};

/// Set the process-wide tool identity, once, at startup.
///
/// Fails if `name` is empty or if an identity was already set in this
/// process.
pub fn set_identity(
    name: impl Into<String>,
    version: impl Into<String>,
    commit: impl Into<String>,
) -> Result<(), IdentityError> {
    GLOBAL_REGISTRY.set(ToolIdentity::new(name, version, commit)?)
}

/// Return the process-wide tool identity.
///
/// Fails if [`set_identity`] was never called.
pub fn identity() -> Result<ToolIdentity, IdentityError> {
    GLOBAL_REGISTRY.get()
}

/// Formatted process-wide identity string, e.g. `"kced 1.0 (abc123)"`.
pub fn format_identity() -> Result<String, IdentityError> {
    GLOBAL_REGISTRY.format()
}

#[cfg(test)]
mod tests {
    // The process-global registry is write-once per process, so its
    // lifecycle is exercised in tests/identity_lifecycle.rs (its own test
    // binary). Unit tests here use local registries.
    use super::*;

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(
            ToolIdentity::new("", "1.0", "abc"),
            Err(IdentityError::EmptyName)
        );
    }

    #[test]
    fn test_format_full_triple() {
        let id = ToolIdentity::new("kced", "1.0", "abc123").unwrap();
        assert_eq!(id.format(), "kced 1.0 (abc123)");
    }

    #[test]
    fn test_format_without_commit() {
        let id = ToolIdentity::new("kced", "1.0", "").unwrap();
        assert_eq!(id.format(), "kced 1.0");
    }

    #[test]
    fn test_format_name_only() {
        let id = ToolIdentity::new("kced", "", "").unwrap();
        assert_eq!(id.format(), "kced");

        // A commit without a version is not reported.
        let id = ToolIdentity::new("kced", "", "abc123").unwrap();
        assert_eq!(id.format(), "kced");
    }

    #[test]
    fn test_registry_is_write_once() {
        let registry = IdentityRegistry::new();
        assert_eq!(registry.get(), Err(IdentityError::NotSet));

        registry
            .set(ToolIdentity::new("kced", "1.0", "abc123").unwrap())
            .unwrap();
        assert_eq!(registry.format().unwrap(), "kced 1.0 (abc123)");

        let again = registry.set(ToolIdentity::new("other", "2.0", "").unwrap());
        assert_eq!(
            again,
            Err(IdentityError::AlreadySet {
                current: "kced 1.0 (abc123)".to_string()
            })
        );
        // The original identity survives the failed attempt.
        assert_eq!(registry.format().unwrap(), "kced 1.0 (abc123)");
    }

    #[test]
    fn test_concurrent_set_has_one_winner() {
        use std::sync::Arc;

        let registry = Arc::new(IdentityRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    registry.set(ToolIdentity::new(format!("tool-{i}"), "", "").unwrap())
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(Result::is_ok)
            .count();

        assert_eq!(successes, 1);
        assert!(registry.get().is_ok());
    }
}
