//! Core data shapes shared by the aggregator and the reconciler

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// One flat configuration row: `parent_key / child_key -> values`
///
/// Several rows may share a parent key, and several may share the same
/// `(parent_key, child_key)` pair. The latter is resolved by last write wins
/// during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FlatOption {
    /// Key grouping rows into one nested entity (e.g. a segment)
    pub parent_key: String,
    /// Key within the parent's children map (e.g. a zone)
    pub child_key: String,
    /// Ordered values attached to the child (e.g. group names)
    pub values: Vec<String>,
}

impl FlatOption {
    /// Create a new row
    pub fn new(
        parent_key: impl Into<String>,
        child_key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            parent_key: parent_key.into(),
            child_key: child_key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }
}

/// One nested group: a parent with its map of children
///
/// Child keys are unique within a group and carry no order; a `BTreeMap`
/// keeps iteration deterministic.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AggregatedGroup {
    /// Parent key after resolution
    pub parent_key: String,
    /// Child key -> values
    pub children: BTreeMap<String, Vec<String>>,
}

impl AggregatedGroup {
    /// Create an empty group for a parent
    pub fn new(parent_key: impl Into<String>) -> Self {
        Self {
            parent_key: parent_key.into(),
            children: BTreeMap::new(),
        }
    }

    /// Builder-style child insertion
    pub fn with_child(
        mut self,
        child_key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.children.insert(
            child_key.into(),
            values.into_iter().map(Into::into).collect(),
        );
        self
    }
}

/// A list element tracked across two snapshots by its natural key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item<K, P> {
    /// Identity that survives across snapshots
    pub key: K,
    /// Opaque attribute bag
    pub payload: P,
}

impl<K, P> Item<K, P> {
    /// Create a new item
    pub fn new(key: K, payload: P) -> Self {
        Self { key, payload }
    }
}

/// A validated, non-empty string key identifying a list item
///
/// Building a key from an empty or whitespace-only string fails, so a key
/// extractor that would collapse distinct items onto "" is rejected before
/// it reaches the reconciler.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NaturalKey(String);

impl NaturalKey {
    /// Validate and wrap a key
    pub fn new(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(Error::malformed("natural key must not be empty"));
        }
        Ok(Self(key))
    }

    /// Borrow the key as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NaturalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for NaturalKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<NaturalKey> for String {
    fn from(key: NaturalKey) -> Self {
        key.0
    }
}

impl AsRef<str> for NaturalKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
