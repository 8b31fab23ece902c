//! Settings records and the merge rules that reconcile them
//!
//! A record is a flat bag of string settings keyed by name. A value of `None`
//! is the erase sentinel (JSON `null`); a key that is missing altogether means
//! "no opinion".

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Errors decoding a record from JSON
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    #[error("invalid settings json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings json must be an object, found {0}")]
    NotAnObject(&'static str),
}

/// How an explicit `null` treats a key that already has a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErasePolicy {
    /// `null` is falsy, so the old value is kept
    Ignore,
    /// `null` overwrites the old value with the erase sentinel
    #[default]
    Honor,
}

impl ErasePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErasePolicy::Ignore => "ignore",
            ErasePolicy::Honor => "honor",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "ignore" | "keep" => Some(ErasePolicy::Ignore),
            "honor" | "erase" => Some(ErasePolicy::Honor),
            _ => None,
        }
    }
}

/// A value counts as set only when it is a non-empty string.
#[inline]
pub fn is_truthy(value: &Option<String>) -> bool {
    matches!(value, Some(s) if !s.is_empty())
}

/// Flat string settings, possibly carrying erase sentinels
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct SettingsRecord {
    entries: BTreeMap<String, Option<String>>,
}

impl SettingsRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`SettingsRecord::set`]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder form of [`SettingsRecord::erase`]
    pub fn with_erased(mut self, key: impl Into<String>) -> Self {
        self.erase(key);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), Some(value.into()));
    }

    /// Store the erase sentinel under `key`
    pub fn erase(&mut self, key: impl Into<String>) {
        self.entries.insert(key.into(), None);
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<String>) {
        self.entries.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Option<String>> {
        self.entries.remove(key)
    }

    /// Raw slot for `key`: `None` when absent, `Some(None)` when erased
    pub fn get(&self, key: &str) -> Option<&Option<String>> {
        self.entries.get(key)
    }

    /// String value for `key`, if one is stored (erased keys yield `None`)
    pub fn value(&self, key: &str) -> Option<&str> {
        self.entries.get(key).and_then(|v| v.as_deref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Option<String>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Merge `changes` over this record using the guarded rules of [`merge`]
    pub fn merged(&self, changes: &SettingsRecord) -> SettingsRecord {
        merge(self, changes)
    }

    /// Replace every erase sentinel with an empty string
    pub fn erasures_as_empty(&self) -> SettingsRecord {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), Some(v.clone().unwrap_or_default())))
            .collect()
    }

    /// Decode a record from a JSON object.
    ///
    /// String and `null` members are kept; members of any other type are
    /// dropped.
    pub fn from_value(value: Value) -> Result<Self, RecordError> {
        let object = match value {
            Value::Object(object) => object,
            Value::Null => return Err(RecordError::NotAnObject("null")),
            Value::Bool(_) => return Err(RecordError::NotAnObject("a boolean")),
            Value::Number(_) => return Err(RecordError::NotAnObject("a number")),
            Value::String(_) => return Err(RecordError::NotAnObject("a string")),
            Value::Array(_) => return Err(RecordError::NotAnObject("an array")),
        };

        let mut record = Self::new();
        for (key, member) in object {
            match member {
                Value::String(s) => record.set(key, s),
                Value::Null => record.erase(key),
                other => log::debug!("Dropping non-string setting {key}: {other}"),
            }
        }
        Ok(record)
    }

    pub fn from_json(json: &str) -> Result<Self, RecordError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn to_value(&self) -> Value {
        let object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, v)| {
                let member = v.as_ref().map_or(Value::Null, |s| Value::String(s.clone()));
                (k.clone(), member)
            })
            .collect();
        Value::Object(object)
    }

    pub fn to_json(&self) -> String {
        self.to_value().to_string()
    }
}

impl<K: Into<String>> FromIterator<(K, Option<String>)> for SettingsRecord {
    fn from_iter<I: IntoIterator<Item = (K, Option<String>)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<'de> Deserialize<'de> for SettingsRecord {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

/// Merge `new` over `old` without touching either.
///
/// Keys missing from `old` are added as-is, erase sentinels included. Keys
/// already in `old` are only overwritten by a non-empty string.
pub fn merge(old: &SettingsRecord, new: &SettingsRecord) -> SettingsRecord {
    merge_with(old, new, ErasePolicy::Ignore)
}

/// [`merge`], except that under [`ErasePolicy::Honor`] an explicit `null`
/// also overwrites an existing key.
pub fn merge_with(old: &SettingsRecord, new: &SettingsRecord, policy: ErasePolicy) -> SettingsRecord {
    if new.is_empty() {
        return old.clone();
    }
    if old.is_empty() {
        return new.clone();
    }

    let mut merged = old.clone();
    for (key, value) in &new.entries {
        match merged.entries.entry(key.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(value.clone());
            }
            Entry::Occupied(mut slot) => {
                let erase = value.is_none() && policy == ErasePolicy::Honor;
                if is_truthy(value) || erase {
                    slot.insert(value.clone());
                }
            }
        }
    }
    merged
}

/// Merge `new` into the record serialized in `json`, returning new JSON.
///
/// Blank input yields `new` serialized; an empty update or input that does
/// not decode to an object returns `json` untouched.
pub fn update_json(json: &str, new: &SettingsRecord) -> String {
    if json.trim().is_empty() {
        return new.to_json();
    }
    if new.is_empty() {
        return json.to_string();
    }
    match SettingsRecord::from_json(json) {
        Ok(old) => merge(&old, new).to_json(),
        Err(e) => {
            log::debug!("Leaving settings json unchanged: {e}");
            json.to_string()
        }
    }
}
