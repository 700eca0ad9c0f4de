//! Durable storage for the ledger record.
//!
//! The record is one JSON object per ledger key. Backends only move raw
//! strings; parsing and defaulting happen in [`LedgerRecord`].

mod file;
mod memory;

pub use file::*;
pub use memory::*;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

use crate::error::StorageError;
use crate::progress::{AllegianceOutcome, PromptRef};

/// Current version of the storage record layout.
pub const RECORD_VERSION: u32 = 1;

/// A place the serialized ledger record can live.
pub trait LedgerStore {
    /// Read the raw record, `None` if nothing has been written yet.
    fn load(&self) -> Result<Option<String>, StorageError>;

    /// Replace the raw record in full.
    fn save(&mut self, raw: &str) -> Result<(), StorageError>;

    /// Remove the record entirely.
    fn clear(&mut self) -> Result<(), StorageError>;
}

/// The serialized shape of the ledger.
///
/// Every field defaults so older records missing newer fields still load.
/// Fields are also read independently: an unreadable value is dropped on
/// its own and never costs the rest of the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerRecord {
    #[serde(default = "default_version")]
    pub version: u32,

    /// Raw fragment ids; out-of-range values are dropped on load.
    #[serde(default, deserialize_with = "lenient_fragments")]
    pub unlocked_fragments: Vec<u8>,

    #[serde(default, deserialize_with = "lenient")]
    pub allegiance_result: Option<AllegianceOutcome>,

    /// Flag name -> value. Unknown names are kept so newer records survive a
    /// round trip through older code.
    #[serde(default, deserialize_with = "lenient_flags")]
    pub flags: BTreeMap<String, bool>,

    #[serde(default, deserialize_with = "lenient")]
    pub active_prompt: Option<PromptRef>,
}

/// Read an optional field, treating an unreadable value as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(err) => {
            warn!(error = %err, "dropping unreadable ledger field");
            Ok(None)
        }
    }
}

fn lenient_fragments<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(items) = value.as_array() else {
        warn!(%value, "stored fragments are not a list");
        return Ok(Vec::new());
    };

    Ok(items
        .iter()
        .filter_map(|item| {
            let id = item.as_u64().and_then(|n| u8::try_from(n).ok());
            if id.is_none() {
                warn!(%item, "skipping stored fragment");
            }
            id
        })
        .collect())
}

fn lenient_flags<'de, D>(deserializer: D) -> Result<BTreeMap<String, bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(entries) = value.as_object() else {
        warn!(%value, "stored flags are not an object");
        return Ok(BTreeMap::new());
    };

    Ok(entries
        .iter()
        .filter_map(|(name, value)| match value.as_bool() {
            Some(set) => Some((name.clone(), set)),
            None => {
                warn!(flag = %name, %value, "skipping stored flag");
                None
            }
        })
        .collect())
}

fn default_version() -> u32 {
    RECORD_VERSION
}

impl Default for LedgerRecord {
    fn default() -> Self {
        Self {
            version: RECORD_VERSION,
            unlocked_fragments: Vec::new(),
            allegiance_result: None,
            flags: BTreeMap::new(),
            active_prompt: None,
        }
    }
}

impl LedgerRecord {
    /// Parse a record from its JSON form.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, StorageError> {
        Ok(serde_json::to_string(self)?)
    }
}
