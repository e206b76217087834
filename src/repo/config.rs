//! Repository Config Module
//!
//! Parses and validates the final repository configuration out of the
//! cached intermediates (raw YAML text plus alias set).

use serde::{Deserialize, Serialize};

use crate::cache::RepositoryName;
use crate::error::{ResolveError, Result};
use crate::resolver::AliasSet;

// == Storage Location ==
/// Concrete storage location descriptor.
///
/// In configuration files this appears either inline or as a string alias
/// that is substituted against the repository's [`AliasSet`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageLocation {
    /// Storage driver kind, e.g. `fs` or `s3`
    #[serde(rename = "type")]
    pub kind: String,
    /// Driver-specific location path
    pub path: String,
}

// == Remote Auth ==
/// Basic-auth credentials for an upstream remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAuth {
    pub username: String,
    pub password: String,
}

// == Remote ==
/// An upstream repository configured as a proxy source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    url: String,
    auth: Option<RemoteAuth>,
    cache: Option<StorageLocation>,
}

impl Remote {
    /// Upstream URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Credentials for the upstream, if configured.
    pub fn auth(&self) -> Option<&RemoteAuth> {
        self.auth.as_ref()
    }

    /// Storage location for proxied content, if configured.
    pub fn cache(&self) -> Option<&StorageLocation> {
        self.cache.as_ref()
    }
}

// == Raw Serde Shapes ==

#[derive(Debug, Deserialize)]
struct RawDoc {
    repo: RawRepo,
}

#[derive(Debug, Deserialize)]
struct RawRepo {
    #[serde(rename = "type")]
    kind: String,
    storage: Option<RawStorage>,
    port: Option<u16>,
    #[serde(default)]
    remotes: Vec<RawRemote>,
}

/// Storage reference: either an alias string or an inline definition.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStorage {
    Alias(String),
    Inline(StorageLocation),
}

#[derive(Debug, Deserialize)]
struct RawRemote {
    url: String,
    username: Option<String>,
    password: Option<String>,
    cache: Option<RawCache>,
}

#[derive(Debug, Deserialize)]
struct RawCache {
    storage: RawStorage,
}

// == Repo Config ==
/// Validated repository configuration.
///
/// Every alias reference has been substituted with its concrete storage
/// location; downstream protocol components consume this type directly.
/// Not cached itself: it is re-parsed from the cached intermediates on
/// every resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoConfig {
    name: RepositoryName,
    repo_type: String,
    storage: Option<StorageLocation>,
    port: Option<u16>,
    remotes: Vec<Remote>,
}

impl RepoConfig {
    // == Parse ==
    /// Parses configuration `text` for repository `name`, substituting alias
    /// references against `aliases`.
    ///
    /// Fails with [`ResolveError::Parse`] on malformed YAML, a missing or
    /// empty repository type, incomplete remote credentials, or an alias
    /// that does not resolve.
    pub fn parse(name: &RepositoryName, aliases: &AliasSet, text: &str) -> Result<RepoConfig> {
        let doc: RawDoc = serde_yaml::from_str(text)
            .map_err(|err| ResolveError::parse(format!("invalid configuration: {err}")))?;
        let raw = doc.repo;

        if raw.kind.trim().is_empty() {
            return Err(ResolveError::parse("repository type is empty"));
        }

        let storage = raw
            .storage
            .map(|reference| resolve_location(reference, aliases))
            .transpose()?;

        let remotes = raw
            .remotes
            .into_iter()
            .map(|remote| build_remote(remote, aliases))
            .collect::<Result<Vec<_>>>()?;

        Ok(RepoConfig {
            name: name.clone(),
            repo_type: raw.kind,
            storage,
            port: raw.port,
            remotes,
        })
    }

    // == Accessors ==
    /// Repository name.
    pub fn name(&self) -> &RepositoryName {
        &self.name
    }

    /// Package format served by this repository, e.g. `maven` or `npm`.
    pub fn repo_type(&self) -> &str {
        &self.repo_type
    }

    /// Primary storage location, if configured.
    pub fn storage(&self) -> Option<&StorageLocation> {
        self.storage.as_ref()
    }

    /// Repository-specific listening port, if configured.
    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Configured upstream remotes.
    pub fn remotes(&self) -> &[Remote] {
        &self.remotes
    }
}

/// Substitutes an alias reference or accepts an inline location.
fn resolve_location(reference: RawStorage, aliases: &AliasSet) -> Result<StorageLocation> {
    match reference {
        RawStorage::Inline(location) => Ok(location),
        RawStorage::Alias(alias) => aliases.get(&alias).cloned().ok_or_else(|| {
            ResolveError::parse(format!("unknown storage alias `{alias}`"))
        }),
    }
}

fn build_remote(raw: RawRemote, aliases: &AliasSet) -> Result<Remote> {
    if raw.url.trim().is_empty() {
        return Err(ResolveError::parse("remote url is empty"));
    }
    let auth = match (raw.username, raw.password) {
        (Some(username), Some(password)) => Some(RemoteAuth { username, password }),
        (None, None) => None,
        _ => {
            return Err(ResolveError::parse(
                "remote auth requires both username and password",
            ))
        }
    };
    let cache = raw
        .cache
        .map(|cache| resolve_location(cache.storage, aliases))
        .transpose()?;
    Ok(Remote {
        url: raw.url,
        auth,
        cache,
    })
}
