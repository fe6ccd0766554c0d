//! Lifecycle test for the process-global identity registry.
//!
//! The global registry is write-once per process, so the whole lifecycle
//! lives in a single test function in its own test binary: get before
//! set, the one successful set, stamping history entries, and the failed
//! second set.

use conformat::{
    format_identity, identity, set_identity, Document, HistoryLedger, IdentityError,
};
use serde_json::json;

#[test]
fn global_identity_is_write_once_and_stamps_history() {
    tracing_subscriber::fmt()
        .with_env_filter("conformat=debug")
        .try_init()
        .ok();

    // Reads before the first set are invariant violations.
    assert_eq!(identity().unwrap_err(), IdentityError::NotSet);
    assert_eq!(format_identity().unwrap_err(), IdentityError::NotSet);

    let ledger = HistoryLedger::new();
    assert_eq!(ledger.new_entry("merge").unwrap_err(), IdentityError::NotSet);

    // An empty name never reaches the registry.
    assert_eq!(set_identity("", "1.0", "abc123").unwrap_err(), IdentityError::EmptyName);
    assert_eq!(identity().unwrap_err(), IdentityError::NotSet);

    // The one successful set.
    set_identity("kced", "1.0", "abc123").unwrap();
    assert_eq!(format_identity().unwrap(), "kced 1.0 (abc123)");
    assert_eq!(identity().unwrap().name(), "kced");

    // History entries are stamped with the formatted identity.
    let entry = ledger
        .new_entry("convert")
        .unwrap()
        .with_field("input", "api.yaml");

    let mut document: Document = json!({}).as_object().unwrap().clone();
    let persisting = HistoryLedger::new().with_persistence(true);
    persisting.append(&mut document, entry);

    let entries = persisting.get(&document);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["tool"], "kced 1.0 (abc123)");
    assert_eq!(entries[0]["command"], "convert");
    assert_eq!(entries[0]["input"], "api.yaml");

    // Any later set fails and leaves the stored identity untouched.
    assert_eq!(
        set_identity("other", "9.9", "").unwrap_err(),
        IdentityError::AlreadySet {
            current: "kced 1.0 (abc123)".to_string()
        }
    );
    assert_eq!(format_identity().unwrap(), "kced 1.0 (abc123)");
}
