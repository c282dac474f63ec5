use chrono::NaiveDate;
use std::fs;
use subtrack_core::{Period, Subscription};
use subtrack_vault::{EncryptedFileStore, SubscriptionSource, VaultError};

/// Front-end style store: base64 of the CryptoJS string for
/// `[{"name":"Netflix",...,"period":"month"},{"name":"iCloud","price":"2.99",...}]`
/// encrypted with passphrase "correct-horse".
const FRONT_END_STORE: &str = "VTJGc2RHVmtYMS9lU0ZqNEVuenNGS3VxQXl5R2lRQ0ovTUgxd2dXZVhwemUyOEtaSHgyNlNhU0lBMFhBUlAxaXk5djdISGw4aW9FYjY4ZExjNVluNnFGa3cyUVhKSmlkTFR1VmhGK29jMFhIbi9GVmdLUlQ1RVVyMk1nSzhyYnZZN2VKNVl6V0xzOE5iY0hvb0lLRFByWkU3a05pZ2JDM3ErM21EMy9BNzl1UHJvRHAyM2kvcStQRDhSWGxNaFNEclgvNUFwT0c1QU93K1haNVRENE9QaElSSHRudEJlaUxmZms2dTRZcVBlQ3dvNk9UVGRtUTJ0ZitjY0E1bkF3bQ==";

/// Same plaintext as a single base64 layer (what `openssl enc -base64` writes).
const OPENSSL_STORE: &str = "U2FsdGVkX1/eSFj4EnzsFKuqAyyGiQCJ/MH1wgWeXpze28KZHx26SaSIA0XARP1iy9v7HHl8ioEb68dLc5Yn6qFkw2QXJJidLTuVhF+oc0XHn/FVgKRT5EUr2MgK8rbvY7eJ5YzWLs8NbcHooIKDPrZE7kNigbC3q+3mD3/A79uProDp23i/q+PD8RXlMhSDrX/5ApOG5AOw+XZ5TD4OPhIRHtntBeiLffk6u4YqPeCwo6OTTdmQ2tf+ccA5nAwm";

/// "definitely not json" under the same passphrase.
const NOT_JSON_STORE: &str = "U2FsdGVkX18lE4XZJkqbGrFYdjiKl8sw7asClRWkBF35cOT5FQXUrB8nFbbTO2M/";

fn write_store(dir: &tempfile::TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("subscriptions.json.enc");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_front_end_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::new(write_store(&dir, FRONT_END_STORE), "correct-horse").unwrap();

    let subs = store.load().unwrap();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[0].name, "Netflix");
    assert_eq!(subs[0].price, 15.49);
    assert_eq!(subs[0].period, Period::Month);
    assert_eq!(subs[1].name, "iCloud");
    assert_eq!(subs[1].price, 2.99);
    assert_eq!(subs[1].date, NaiveDate::from_ymd_opt(2023, 6, 1).unwrap());
}

#[test]
fn test_load_openssl_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::new(write_store(&dir, OPENSSL_STORE), "correct-horse").unwrap();
    assert_eq!(store.load().unwrap().len(), 2);
}

#[test]
fn test_missing_file_is_absent_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::new(dir.path().join("nope.enc"), "correct-horse").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, VaultError::PayloadAbsent(_)));
    assert!(!err.is_fatal());
}

#[test]
fn test_unreadable_path_is_io_not_absent() {
    // A regular file used as a directory: `exists()` says false, but the store is not missing.
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("data");
    fs::write(&blocker, "not a directory").unwrap();
    let store = EncryptedFileStore::new(blocker.join("subscriptions.json.enc"), "correct-horse").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, VaultError::Io { op: "read", .. }), "{err:?}");
    assert!(err.is_fatal());
}

#[test]
fn test_wrong_key_is_decryption_failure() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::new(write_store(&dir, FRONT_END_STORE), "battery-staple").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, VaultError::DecryptionFailed(_)), "got {err:?}");
    assert!(err.is_fatal());
}

#[test]
fn test_non_json_plaintext_is_malformed() {
    let dir = tempfile::tempdir().unwrap();
    let store = EncryptedFileStore::new(write_store(&dir, NOT_JSON_STORE), "correct-horse").unwrap();

    let err = store.load().unwrap_err();
    assert!(matches!(err, VaultError::MalformedPayload(_)), "got {err:?}");
}

#[test]
fn test_empty_key_is_missing_configuration() {
    let err = EncryptedFileStore::new("data/subscriptions.json.enc", "").unwrap_err();
    assert!(matches!(err, VaultError::MissingConfiguration("MASTER_KEY")));
}

#[test]
fn test_save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("subscriptions.json.enc");
    let store = EncryptedFileStore::new(&path, "pw").unwrap();

    let subs = vec![
        Subscription::new("GitHub", 4.0, "USD", NaiveDate::from_ymd_opt(2025, 2, 28).unwrap(), "month")
            .with_icon("https://github.com/favicon.ico"),
    ];
    store.save(&subs).unwrap();

    assert!(!fs::read_to_string(&path).unwrap().contains("GitHub"));
    assert_eq!(store.load().unwrap(), subs);
}

#[test]
fn test_debug_hides_passphrase() {
    let store = EncryptedFileStore::new("x.enc", "super-secret").unwrap();
    assert!(!format!("{store:?}").contains("super-secret"));
}
