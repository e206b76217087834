//! Repo Module
//!
//! The validated repository configuration consumed by protocol components,
//! plus the proxy-remote consumer rule.

mod config;
pub mod proxy;

pub use config::{Remote, RemoteAuth, RepoConfig, StorageLocation};
pub use proxy::proxy_remote;
