//! Foreign-key resolution between human-readable names and remote ids
//!
//! The core only consumes this contract. Implementations own transport,
//! timeouts and any caching; from the core's side every call is a fresh,
//! blocking round trip.

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Name <-> id lookup against the remote system's current state
///
/// Both directions may fail with [`Error::NotFound`] when the entity does
/// not exist, or [`Error::Transport`] when the lookup itself could not
/// complete.
pub trait Resolver: Send + Sync {
    /// Translate a remote id into its human-readable name
    fn resolve_id_to_name(&self, id: &str) -> Result<String>;

    /// Translate a human-readable name into its remote id
    fn resolve_name_to_id(&self, name: &str) -> Result<String>;
}

impl<R: Resolver + ?Sized> Resolver for &R {
    fn resolve_id_to_name(&self, id: &str) -> Result<String> {
        (**self).resolve_id_to_name(id)
    }

    fn resolve_name_to_id(&self, name: &str) -> Result<String> {
        (**self).resolve_name_to_id(name)
    }
}

impl<R: Resolver + ?Sized> Resolver for Box<R> {
    fn resolve_id_to_name(&self, id: &str) -> Result<String> {
        (**self).resolve_id_to_name(id)
    }

    fn resolve_name_to_id(&self, name: &str) -> Result<String> {
        (**self).resolve_name_to_id(name)
    }
}

/// In-memory bijection between names and ids
///
/// Useful for static configuration tables and tests.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    kind: String,
    by_name: HashMap<String, String>,
    by_id: HashMap<String, String>,
}

impl MapResolver {
    /// Build a resolver from `(name, id)` pairs
    ///
    /// `kind` names the entity in error messages (e.g. "segment").
    /// Fails if a name or an id appears twice, since the mapping must be
    /// a bijection for [`crate::flatten`] to invert [`crate::aggregate`].
    pub fn from_pairs<I, N, D>(kind: impl Into<String>, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (N, D)>,
        N: Into<String>,
        D: Into<String>,
    {
        let mut resolver = Self {
            kind: kind.into(),
            ..Self::default()
        };

        for (name, id) in pairs {
            let (name, id) = (name.into(), id.into());
            if resolver.by_name.contains_key(&name) {
                return Err(Error::malformed(format!(
                    "duplicate {} name '{}'",
                    resolver.kind, name
                )));
            }
            if resolver.by_id.contains_key(&id) {
                return Err(Error::malformed(format!(
                    "duplicate {} id '{}'",
                    resolver.kind, id
                )));
            }
            resolver.by_name.insert(name.clone(), id.clone());
            resolver.by_id.insert(id, name);
        }

        Ok(resolver)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl Resolver for MapResolver {
    fn resolve_id_to_name(&self, id: &str) -> Result<String> {
        self.by_id
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} id", self.kind), id))
    }

    fn resolve_name_to_id(&self, name: &str) -> Result<String> {
        self.by_name
            .get(name)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("{} name", self.kind), name))
    }
}
