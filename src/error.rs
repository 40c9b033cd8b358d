//!
//! Defines error types for the principal manager and permission stores.
//!
//! A failed permission check is deliberately absent here: denials are turned
//! into a fallback call or a 401 on the request scope and never reach
//! application code as an error value.

/// Errors raised by a [`DataStore`](crate::store::DataStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The store does not support this operation. The default store returns
    /// this for every mutation; treat it as a configuration gap.
    #[error("[Security-Principal] Not Implemented")]
    NotImplemented,
    /// No permission is stored under the given key.
    #[error("Permission not found: {0}")]
    NotFound(String),
    /// A permission table could not be parsed.
    #[error("Malformed permission data: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

/// Represents errors that can occur while configuring or consulting the manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrincipalError {
    /// No manager has been bound into the request scope yet.
    #[error("No principal manager bound to this request")]
    ManagerNotBound,
    /// An authorization wrapper was built with an empty permission list.
    #[error("Authorization wrapper requires at least one permission")]
    NoPermissions,
    /// The permission store reported an error.
    #[error("Permission store error: {0}")]
    Store(#[from] StoreError),
    /// A configuration option was rejected.
    #[error("Configuration error: {0}")]
    Config(String),
}
