//! Alias Resolver Module
//!
//! Discovers the storage aliases visible to a repository's scope.
//!
//! Aliases live in `_storages.yaml` files. Discovery walks from the
//! repository's nearest enclosing scope up to the storage root; the first
//! file found wins, and no file at any scope is an empty (valid) set.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ResolveError, Result};
use crate::repo::StorageLocation;
use crate::storage::{Key, Storage, StorageError};

/// File name holding alias definitions for a scope.
pub const ALIASES_FILE: &str = "_storages.yaml";

// == Alias Set ==
/// Immutable snapshot of alias name to storage location, scoped to a
/// repository and resolved once per cache entry lifetime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasSet {
    aliases: HashMap<String, StorageLocation>,
}

/// Serde shape of a `_storages.yaml` document.
#[derive(Debug, Deserialize)]
struct AliasesDoc {
    storages: HashMap<String, StorageLocation>,
}

impl AliasSet {
    /// Parses alias definitions from `_storages.yaml` text.
    pub fn from_yaml(text: &str) -> Result<Self> {
        let doc: AliasesDoc = serde_yaml::from_str(text)
            .map_err(|err| ResolveError::parse(format!("invalid aliases file: {err}")))?;
        Ok(Self {
            aliases: doc.storages,
        })
    }

    /// Looks up the storage location registered under `alias`.
    pub fn get(&self, alias: &str) -> Option<&StorageLocation> {
        self.aliases.get(alias)
    }

    /// Returns the number of defined aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true when no aliases are defined.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

impl FromIterator<(String, StorageLocation)> for AliasSet {
    fn from_iter<I: IntoIterator<Item = (String, StorageLocation)>>(iter: I) -> Self {
        Self {
            aliases: iter.into_iter().collect(),
        }
    }
}

// == Find ==
/// Resolves the alias set visible to the scope of `config_key`.
///
/// Walks candidate `_storages.yaml` keys from the key's parent scope to the
/// root. Backend failures propagate; a missing file just moves the walk up.
pub async fn find(storage: &dyn Storage, config_key: &Key) -> Result<AliasSet> {
    let mut scope = config_key.parent();
    loop {
        let candidate = match &scope {
            Some(prefix) => prefix.join(ALIASES_FILE),
            None => Key::from(ALIASES_FILE),
        };
        match storage.get(&candidate).await {
            Ok(bytes) => {
                debug!(key = %candidate, "aliases file found");
                let text = String::from_utf8(bytes.to_vec()).map_err(|_| {
                    ResolveError::parse(format!("aliases file `{candidate}` is not valid UTF-8"))
                })?;
                return AliasSet::from_yaml(&text);
            }
            Err(StorageError::NotFound(_)) => match scope.take() {
                Some(prefix) => scope = prefix.parent(),
                None => {
                    debug!(key = %config_key, "no aliases file in scope");
                    return Ok(AliasSet::default());
                }
            },
            Err(err @ StorageError::Backend(_)) => return Err(err.into()),
        }
    }
}
