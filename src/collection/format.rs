//! Collection file format.
//!
//! A collection is stored as a pretty-printed JSON object keyed by
//! secret name:
//!
//! ```text
//! {
//!   "github": {
//!     "DateAdded": "2019-06-23T20:00:01-05:00",
//!     "DateModified": "2019-06-23T20:00:01-05:00",
//!     "Name": "github",
//!     "Value": "JBSWY3DPEHPK3PXP"
//!   }
//! }
//! ```
//!
//! Keys are written in sorted order so saves are deterministic.

use std::collections::{BTreeMap, HashMap};

use super::secret::Secret;
use crate::errors::{Result, TotpError};

/// Serialize the name -> secret map to JSON bytes.
pub fn serialize(secrets: &HashMap<String, Secret>) -> Result<Vec<u8>> {
    let sorted: BTreeMap<&String, &Secret> = secrets.iter().collect();
    let mut data = serde_json::to_vec_pretty(&sorted)
        .map_err(|e| TotpError::Serialization(format!("collection: {e}")))?;
    data.push(b'\n');
    Ok(data)
}

/// Deserialize JSON bytes into a name -> secret map.
///
/// A literal `null` document is treated as an empty collection.  Each
/// entry's `Name` is taken from its map key so the two cannot disagree.
pub fn deserialize(data: &[u8]) -> Result<HashMap<String, Secret>> {
    let parsed: Option<HashMap<String, Secret>> =
        serde_json::from_slice(data).map_err(|e| TotpError::Decode(e.to_string()))?;

    Ok(parsed
        .unwrap_or_default()
        .into_iter()
        .map(|(key, mut secret)| {
            secret.name.clone_from(&key);
            (key, secret)
        })
        .collect())
}
