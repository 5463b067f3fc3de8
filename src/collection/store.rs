//! In-memory secret collection and its persistence adapters.
//!
//! `Collection` is a plain map of name -> `Secret`.  Mutations stay in
//! memory until `save()` is called.  A collection can be loaded from a
//! file (the default) or from any reader such as stdin, and saved to a
//! file or to any writer such as stdout.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, TimeDelta, Utc};

use super::format;
use super::secret::Secret;
use crate::errors::{Result, TotpError};
use crate::otp;

/// Named shared secrets plus an optional save target.
#[derive(Default)]
pub struct Collection {
    /// In-memory map of secret name -> Secret.
    secrets: HashMap<String, Secret>,

    /// File written by `save()` when no writer is bound.
    filename: Option<PathBuf>,

    /// Output sink written by `save()`; takes precedence over `filename`.
    writer: Option<Box<dyn Write>>,
}

impl Collection {
    // ------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------

    /// Create an empty collection with no save target.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a collection from `path`.
    ///
    /// Always returns a usable collection bound to `path`.  If the file
    /// cannot be read (including when it does not exist yet) or cannot
    /// be decoded, the collection is empty and the error is returned
    /// alongside it so callers can decide whether it matters.
    pub fn open(path: impl AsRef<Path>) -> (Self, Option<TotpError>) {
        let path = path.as_ref();

        let (mut collection, err) = match fs::read(path) {
            Ok(data) => Self::from_slice(&data),
            Err(e) => (Self::new(), Some(TotpError::Io(e))),
        };

        collection.filename = Some(path.to_path_buf());
        (collection, err)
    }

    /// Load a collection from every byte of `reader`.
    ///
    /// Same contract as [`Collection::open`]: an empty collection plus
    /// the error when reading or decoding fails.  No save target is
    /// bound; use [`Collection::set_writer`] or
    /// [`Collection::set_filename`].
    pub fn from_reader<R: Read>(mut reader: R) -> (Self, Option<TotpError>) {
        let mut data = Vec::new();
        match reader.read_to_end(&mut data) {
            Ok(_) => Self::from_slice(&data),
            Err(e) => (Self::new(), Some(TotpError::Io(e))),
        }
    }

    /// Decode a collection from serialized bytes.
    pub fn from_slice(data: &[u8]) -> (Self, Option<TotpError>) {
        match format::deserialize(data) {
            Ok(secrets) => (
                Self {
                    secrets,
                    ..Self::default()
                },
                None,
            ),
            Err(e) => (Self::new(), Some(e)),
        }
    }

    // ------------------------------------------------------------------
    // Secret operations
    // ------------------------------------------------------------------

    /// Add a secret, or replace the value of an existing one.
    ///
    /// The value must be accepted by the code generator; if it is not,
    /// the generator's error is returned and nothing changes.  A new
    /// secret gets identical `date_added` and `date_modified`; an
    /// update keeps `date_added` and advances `date_modified`.
    pub fn update(&mut self, name: &str, value: &str) -> Result<Secret> {
        if name.is_empty() {
            return Err(TotpError::EmptyName);
        }
        if value.is_empty() {
            return Err(TotpError::EmptyValue);
        }

        otp::validate_secret(value)?;

        let secret = match self.secrets.get(name) {
            Some(existing) => Secret {
                value: value.to_string(),
                date_modified: advanced_now(existing.date_modified),
                ..existing.clone()
            },
            None => Secret::new(name, value, Utc::now()),
        };

        self.secrets.insert(name.to_string(), secret.clone());
        Ok(secret)
    }

    /// Move the secret at `old` to `new`, touching `date_modified`.
    ///
    /// Last write wins: a secret already stored under `new` is replaced
    /// without error.  Renaming a secret to its own name only touches
    /// its modification time.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<Secret> {
        if new.is_empty() {
            return Err(TotpError::EmptyName);
        }

        let existing = self
            .secrets
            .remove(old)
            .ok_or_else(|| TotpError::NotFound(old.to_string()))?;

        let renamed = Secret {
            name: new.to_string(),
            date_modified: advanced_now(existing.date_modified),
            ..existing
        };

        self.secrets.insert(new.to_string(), renamed.clone());
        Ok(renamed)
    }

    /// Remove a secret and return it.
    pub fn delete(&mut self, name: &str) -> Result<Secret> {
        self.secrets
            .remove(name)
            .ok_or_else(|| TotpError::NotFound(name.to_string()))
    }

    /// Return a copy of the named secret.
    pub fn get(&self, name: &str) -> Result<Secret> {
        self.secrets
            .get(name)
            .cloned()
            .ok_or_else(|| TotpError::NotFound(name.to_string()))
    }

    /// Return copies of every secret, in no particular order.
    pub fn list(&self) -> Vec<Secret> {
        self.secrets.values().cloned().collect()
    }

    /// Generate the passcode for the named secret at `at`.
    pub fn generate_code(&self, name: &str, at: DateTime<Utc>) -> Result<String> {
        let secret = self.get(name)?;
        otp::generate_code(&secret.value, at)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Serialize the collection and write it to the bound target.
    ///
    /// A bound writer wins over a filename.  Files are truncated and
    /// rewritten whole with owner-only permissions.
    pub fn save(&mut self) -> Result<()> {
        let data = format::serialize(&self.secrets)?;

        if let Some(writer) = self.writer.as_mut() {
            writer.write_all(&data)?;
            writer.flush()?;
            return Ok(());
        }

        match &self.filename {
            Some(path) => write_private(path, &data),
            None => Err(TotpError::NoSaveTarget),
        }
    }

    /// Serialize the collection without writing it anywhere.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        format::serialize(&self.secrets)
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Returns the file `save()` writes to, if any.
    pub fn filename(&self) -> Option<&Path> {
        self.filename.as_deref()
    }

    /// Bind (or rebind) the file used by `save()`.
    pub fn set_filename(&mut self, path: impl Into<PathBuf>) {
        self.filename = Some(path.into());
    }

    /// Bind an output sink used by `save()` instead of the file.
    pub fn set_writer(&mut self, writer: Box<dyn Write>) {
        self.writer = Some(writer);
    }

    /// Returns the number of secrets in the collection.
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Returns `true` if the collection holds no secrets.
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Returns `true` if a secret with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.secrets.contains_key(name)
    }
}

/// Two collections are equal when they hold the same secrets; save
/// targets are ignored.
impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        self.secrets == other.secrets
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collection")
            .field("secrets", &self.secrets)
            .field("filename", &self.filename)
            .field("writer", &self.writer.is_some())
            .finish()
    }
}

/// The narrow set of operations callers need from a secret store.
///
/// `Collection` is the production implementation; tests can swap in
/// a double without touching persistence.
pub trait SecretStore {
    fn update(&mut self, name: &str, value: &str) -> Result<Secret>;
    fn rename(&mut self, old: &str, new: &str) -> Result<Secret>;
    fn delete(&mut self, name: &str) -> Result<Secret>;
    fn get(&self, name: &str) -> Result<Secret>;
    fn list(&self) -> Vec<Secret>;
    fn generate_code(&self, name: &str, at: DateTime<Utc>) -> Result<String>;
    fn save(&mut self) -> Result<()>;
}

impl SecretStore for Collection {
    fn update(&mut self, name: &str, value: &str) -> Result<Secret> {
        Collection::update(self, name, value)
    }

    fn rename(&mut self, old: &str, new: &str) -> Result<Secret> {
        Collection::rename(self, old, new)
    }

    fn delete(&mut self, name: &str) -> Result<Secret> {
        Collection::delete(self, name)
    }

    fn get(&self, name: &str) -> Result<Secret> {
        Collection::get(self, name)
    }

    fn list(&self) -> Vec<Secret> {
        Collection::list(self)
    }

    fn generate_code(&self, name: &str, at: DateTime<Utc>) -> Result<String> {
        Collection::generate_code(self, name, at)
    }

    fn save(&mut self) -> Result<()> {
        Collection::save(self)
    }
}

/// Current time, nudged past `previous` if the clock has not moved.
fn advanced_now(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + TimeDelta::nanoseconds(1)
    }
}

/// Create-or-truncate `path` with mode 0600 and write `data` to it.
fn write_private(path: &Path, data: &[u8]) -> Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    file.write_all(data)?;

    // `mode` only applies to new files; tighten pre-existing ones too.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }

    Ok(())
}
