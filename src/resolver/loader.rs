//! Config Loader Module
//!
//! Reads the raw configuration resource for a repository from storage and
//! decodes it as text.

use tracing::debug;

use crate::cache::RepositoryName;
use crate::error::{ResolveError, Result};
use crate::storage::{Key, Storage, StorageError};

/// Extensions tried when the repository name carries none, in order.
const EXTENSIONS: [&str; 2] = [".yaml", ".yml"];

// == Config Key Candidates ==
/// Storage keys that may hold the configuration for `name`.
///
/// A name already ending in a known extension is used verbatim; otherwise
/// both extensions are tried in order.
pub fn config_key_candidates(name: &RepositoryName) -> Vec<Key> {
    let raw = name.as_str();
    if EXTENSIONS.iter().any(|ext| raw.ends_with(ext)) {
        vec![Key::from(raw)]
    } else {
        EXTENSIONS
            .iter()
            .map(|ext| Key::from(format!("{raw}{ext}")))
            .collect()
    }
}

// == Load Config Text ==
/// Fetches the configuration blob for `name` and decodes it as UTF-8 text.
///
/// Fails with [`ResolveError::NotFound`] when no candidate key holds a
/// resource, [`ResolveError::Storage`] on I/O failure, and
/// [`ResolveError::Parse`] when the stored bytes are not valid UTF-8.
pub async fn load_config_text(storage: &dyn Storage, name: &RepositoryName) -> Result<String> {
    for key in config_key_candidates(name) {
        // One read per candidate; an absent key means try the next one
        match storage.get(&key).await {
            Ok(bytes) => {
                debug!(repo = %name, key = %key, "configuration blob loaded");
                return String::from_utf8(bytes.to_vec()).map_err(|_| {
                    ResolveError::parse(format!("configuration `{key}` is not valid UTF-8"))
                });
            }
            Err(StorageError::NotFound(_)) => continue,
            Err(err) => return Err(err.into()),
        }
    }
    Err(ResolveError::NotFound(name.to_string()))
}
