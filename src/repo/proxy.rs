//! Proxy Validation Module
//!
//! Consumer rule applied to an already-resolved configuration before any
//! network call to an upstream is attempted.

use crate::error::{ResolveError, Result};
use crate::repo::{Remote, RepoConfig};

// == Proxy Remote ==
/// Validates and returns the single proxy remote of `config`.
///
/// A proxying repository must declare exactly one remote, and that remote
/// must carry a cache storage location for proxied content.
pub fn proxy_remote(config: &RepoConfig) -> Result<&Remote> {
    match config.remotes() {
        [] => Err(ResolveError::validation("no remotes specified")),
        [remote] => {
            if remote.cache().is_none() {
                return Err(ResolveError::validation("proxy requires cache storage"));
            }
            Ok(remote)
        }
        _ => Err(ResolveError::validation("only one remote is allowed")),
    }
}
