//! The `Secret` entry stored in a collection.
//!
//! Field names are PascalCase on disk (`DateAdded`, `DateModified`,
//! `Name`, `Value`) so collection files stay compatible with earlier
//! releases.  Very old files used `Seed` for the value; it is accepted
//! when reading and rewritten as `Value` on the next save.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named shared secret with its creation and modification times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Secret {
    /// When this secret was first added.
    pub date_added: DateTime<Utc>,

    /// When the value or name last changed.
    pub date_modified: DateTime<Utc>,

    /// The name of the secret (e.g. "github").
    pub name: String,

    /// The shared secret, conventionally base32.
    #[serde(alias = "Seed")]
    pub value: String,
}

impl Secret {
    /// Create a secret whose two timestamps are the same instant.
    pub fn new(name: &str, value: &str, now: DateTime<Utc>) -> Self {
        Self {
            date_added: now,
            date_modified: now,
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    /// `true` if the secret has not been modified since it was added.
    pub fn is_new(&self) -> bool {
        self.date_added == self.date_modified
    }
}
