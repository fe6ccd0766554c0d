//! Provenance history ledger embedded in documents.
//!
//! Every tool run that produces or touches a document can append a
//! [`HistoryEntry`] describing itself to the `_ignore` array, giving an
//! auditable record of how the document came to be. Entries are ordered by
//! append time and carry no uniqueness constraint.
//!
//! Entries deliberately carry no timestamp: a history that changes on
//! every run would make GitOps diffs noisy for no audit value.
//!
//! ## Persistence caveat
//!
//! The downstream file format does not accept metadata fields yet, so by
//! default a [`HistoryLedger`] clears the `_ignore` key right after
//! writing it: history never survives on the document. Callers observe
//! the key as absent and must not rely on retention. The behavior is a
//! toggle ([`HistoryLedger::with_persistence`]) so it can be switched on
//! once the format catches up, rather than a silent change.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::document::Document;
use crate::identity::{self, IdentityError, ToolIdentity};
use crate::HISTORY_KEY;

/// One provenance record: which tool build ran which command.
///
/// Callers may attach arbitrary extra fields (input/output filenames,
/// run parameters) before appending; they serialize inline next to `tool`
/// and `command`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Formatted tool identity, e.g. `"kced 1.0 (abc123)"`.
    pub tool: String,
    /// Name of the operation performed, e.g. `"merge"`.
    pub command: String,
    /// Caller-supplied metadata, flattened into the entry object.
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl HistoryEntry {
    /// Build an entry stamped with the given identity.
    pub fn new(identity: &ToolIdentity, command: impl Into<String>) -> Self {
        Self {
            tool: identity.format(),
            command: command.into(),
            fields: Map::new(),
        }
    }

    /// Attach an extra field, e.g. an input filename.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Convert into the JSON object stored in the ledger.
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert("tool".to_string(), Value::String(self.tool));
        map.insert("command".to_string(), Value::String(self.command));
        map.extend(self.fields);
        Value::Object(map)
    }
}

impl From<HistoryEntry> for Value {
    fn from(entry: HistoryEntry) -> Self {
        entry.into_value()
    }
}

/// Stored shape of the `_ignore` key.
///
/// Old writers stored a single value instead of an array; normalization
/// to the sequence form happens here, at the read boundary, so the rest
/// of the crate only ever sees sequences.
enum StoredHistory {
    /// The current form: an array of entries.
    Entries(Vec<Value>),
    /// Legacy form: one bare value.
    Legacy(Value),
}

impl From<Value> for StoredHistory {
    fn from(value: Value) -> Self {
        match value {
            Value::Array(items) => Self::Entries(items),
            other => Self::Legacy(other),
        }
    }
}

impl StoredHistory {
    fn into_entries(self) -> Vec<Value> {
        match self {
            Self::Entries(items) => items,
            Self::Legacy(value) => {
                tracing::warn!(
                    key = HISTORY_KEY,
                    "history key held a single value, normalizing to a one-element array"
                );
                vec![value]
            }
        }
    }
}

/// Reads, writes and normalizes the provenance array of a document.
#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    persist_entries: bool,
}

impl HistoryLedger {
    /// A ledger with the default (non-persisting) behavior.
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle whether written history survives on the document.
    ///
    /// Off by default; see the module docs before enabling.
    pub fn with_persistence(mut self, persist: bool) -> Self {
        self.persist_entries = persist;
        self
    }

    /// Return the document's history as a deep copy.
    ///
    /// Absent key means an empty sequence; a legacy single value is
    /// wrapped into a one-element sequence. Mutating the returned vector
    /// never affects the document until it is written back with
    /// [`HistoryLedger::set`].
    pub fn get(&self, doc: &Document) -> Vec<Value> {
        match doc.get(HISTORY_KEY) {
            None => Vec::new(),
            Some(stored) => StoredHistory::from(stored.clone()).into_entries(),
        }
    }

    /// Store the history array on the document.
    ///
    /// Empty `entries` removes the key instead of persisting an empty
    /// array placeholder.
    pub fn set(&self, doc: &mut Document, entries: Vec<Value>) {
        if entries.is_empty() {
            self.clear(doc);
            return;
        }
        doc.insert(HISTORY_KEY.to_string(), Value::Array(entries));

        // TODO: drop this clear once the downstream format accepts
        // metadata fields.
        if !self.persist_entries {
            tracing::debug!(
                key = HISTORY_KEY,
                "history persistence disabled, clearing stored entries"
            );
            self.clear(doc);
        }
    }

    /// Append one entry to the document's history.
    ///
    /// A JSON `null` entry is skipped. Subject to the same persistence
    /// caveat as [`HistoryLedger::set`].
    pub fn append(&self, doc: &mut Document, entry: impl Into<Value>) {
        let entry = entry.into();
        let mut entries = self.get(doc);
        if !entry.is_null() {
            entries.push(entry);
        }
        self.set(doc, entries);
    }

    /// Remove the history key entirely. No error if already absent.
    pub fn clear(&self, doc: &mut Document) {
        doc.remove(HISTORY_KEY);
    }

    /// Build an entry stamped with the process-wide tool identity.
    ///
    /// Fails with the same invariant violation as [`crate::identity`]
    /// when no identity was set at startup.
    pub fn new_entry(&self, command: impl Into<String>) -> Result<HistoryEntry, IdentityError> {
        Ok(HistoryEntry::new(&identity::identity()?, command))
    }
}
