//! Integration tests for the secret collection.

use std::fs;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use chrono::DateTime;
use tempfile::TempDir;
use totp::collection::Collection;
use totp::errors::TotpError;

/// Helper: a collection file path inside a fresh temp dir.
fn collection_path() -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("totp-config.json");
    (dir, path)
}

/// A `Write` sink whose bytes can be read back after it is boxed.
#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl SharedBuf {
    fn bytes(&self) -> Vec<u8> {
        self.0.lock().unwrap().clone()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Update / get / rename / delete
// ---------------------------------------------------------------------------

#[test]
fn new_secret_has_matching_timestamps() {
    let mut c = Collection::new();
    c.update("name", "SEED").unwrap();

    let s = c.get("name").unwrap();
    assert_eq!(s.name, "name");
    assert_eq!(s.value, "SEED");
    assert_eq!(s.date_added, s.date_modified);
    assert!(s.is_new());
}

#[test]
fn second_update_keeps_added_and_advances_modified() {
    let mut c = Collection::new();
    let first = c.update("name", "SEED").unwrap();
    let second = c.update("name", "OTHER").unwrap();

    assert_eq!(second.date_added, first.date_added);
    assert!(second.date_modified > first.date_modified);
    assert!(!second.is_new());
    assert_eq!(c.len(), 1);
}

#[test]
fn rename_moves_the_entry() {
    let mut c = Collection::new();
    let added = c.update("old", "SEED").unwrap();

    let renamed = c.rename("old", "new").unwrap();
    assert_eq!(renamed.name, "new");
    assert_eq!(renamed.value, "SEED");
    assert_eq!(renamed.date_added, added.date_added);
    assert!(renamed.date_modified > added.date_modified);

    assert!(matches!(c.get("old"), Err(TotpError::NotFound(_))));
    assert_eq!(c.get("new").unwrap(), renamed);
}

#[test]
fn delete_removes_only_the_named_entry() {
    let mut c = Collection::new();
    c.update("a", "AAAA").unwrap();
    c.update("b", "BBBB").unwrap();

    let deleted = c.delete("a").unwrap();
    assert_eq!(deleted.value, "AAAA");
    assert!(matches!(c.get("a"), Err(TotpError::NotFound(_))));

    assert!(matches!(c.delete("a"), Err(TotpError::NotFound(_))));
    assert_eq!(c.len(), 1);
}

#[test]
fn list_returns_every_secret() {
    let mut c = Collection::new();
    for name in ["a", "b", "c"] {
        c.update(name, "SEED").unwrap();
    }

    let mut names: Vec<_> = c.list().into_iter().map(|s| s.name).collect();
    names.sort();
    assert_eq!(names, ["a", "b", "c"]);
}

#[test]
fn generate_code_for_stored_secret() {
    let mut c = Collection::new();
    c.update("name0", "seed").unwrap();

    let at = DateTime::parse_from_rfc3339("2019-06-23T20:00:01-05:00")
        .unwrap()
        .to_utc();
    assert_eq!(c.generate_code("name0", at).unwrap(), "335072");
    assert!(matches!(
        c.generate_code("missing", at),
        Err(TotpError::NotFound(_))
    ));
}

// ---------------------------------------------------------------------------
// File persistence
// ---------------------------------------------------------------------------

#[test]
fn save_and_reopen_round_trip() {
    let (_dir, path) = collection_path();

    let (mut c, err) = Collection::open(&path);
    assert!(matches!(err, Some(TotpError::Io(_))));
    assert!(c.is_empty());
    assert_eq!(c.filename(), Some(path.as_path()));

    c.update("github", "JBSWY3DPEHPK3PXP").unwrap();
    c.update("aws", "seed").unwrap();
    c.save().unwrap();

    let (reopened, err) = Collection::open(&path);
    assert!(err.is_none());
    assert_eq!(reopened, c);
}

#[cfg(unix)]
#[test]
fn saved_file_is_owner_only() {
    use std::os::unix::fs::PermissionsExt;

    let (_dir, path) = collection_path();
    fs::write(&path, "{}").unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

    let (mut c, _) = Collection::open(&path);
    c.update("name", "SEED").unwrap();
    c.save().unwrap();

    let mode = fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn malformed_file_opens_empty_with_decode_error() {
    let (_dir, path) = collection_path();
    fs::write(&path, "{ not json").unwrap();

    let (c, err) = Collection::open(&path);
    assert!(c.is_empty());
    assert!(matches!(err, Some(TotpError::Decode(_))));
}

#[test]
fn reads_files_written_with_seed_field() {
    let (_dir, path) = collection_path();
    fs::write(
        &path,
        r#"{"name0": {"DateAdded": "2019-06-23T20:00:01-05:00",
            "DateModified": "2019-06-23T20:00:01-05:00",
            "Name": "name0", "Seed": "seed"}}"#,
    )
    .unwrap();

    let (c, err) = Collection::open(&path);
    assert!(err.is_none());
    assert_eq!(c.get("name0").unwrap().value, "seed");
}

// ---------------------------------------------------------------------------
// Stream persistence
// ---------------------------------------------------------------------------

#[test]
fn writer_wins_over_filename() {
    let (_dir, path) = collection_path();
    let sink = SharedBuf::default();

    let mut c = Collection::new();
    c.set_filename(&path);
    c.set_writer(Box::new(sink.clone()));
    c.update("name", "SEED").unwrap();
    c.save().unwrap();

    assert!(!path.exists());

    let (from_stream, err) = Collection::from_reader(sink.bytes().as_slice());
    assert!(err.is_none());
    assert_eq!(from_stream, c);
}

#[test]
fn from_reader_reports_decode_errors() {
    let (c, err) = Collection::from_reader("[]".as_bytes());
    assert!(c.is_empty());
    assert!(matches!(err, Some(TotpError::Decode(_))));
}

#[test]
fn serialized_bytes_decode_to_an_equal_collection() {
    let mut c = Collection::new();
    c.update("a", "AAAA").unwrap();
    c.update("b", "BBBB").unwrap();
    c.rename("b", "c").unwrap();

    let (decoded, err) = Collection::from_slice(&c.to_bytes().unwrap());
    assert!(err.is_none());
    assert_eq!(decoded, c);
}
