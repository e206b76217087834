//! Storage Key Module
//!
//! Path-like identifiers addressing resources in the backing storage.

use std::fmt;

// == Key ==
/// Structured path-like identifier for a storage resource.
///
/// Segments are joined by `/`. Leading, trailing and repeated separators
/// are normalized away at construction, so `"a//b/"` and `"a/b"` address
/// the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Creates a key from path segments.
    pub fn from_parts<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = parts
            .into_iter()
            .flat_map(|part| {
                part.as_ref()
                    .split('/')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>()
            .join("/");
        Key(joined)
    }

    /// Appends a segment, returning a new key.
    pub fn join(&self, segment: &str) -> Key {
        Key::from_parts([self.0.as_str(), segment])
    }

    /// Returns the enclosing scope, or None for a top-level key.
    pub fn parent(&self) -> Option<Key> {
        self.0.rsplit_once('/').map(|(head, _)| Key(head.to_string()))
    }

    /// The key as a `/`-joined string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Key {
    fn from(path: &str) -> Self {
        Key::from_parts([path])
    }
}

impl From<String> for Key {
    fn from(path: String) -> Self {
        Key::from_parts([path])
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
