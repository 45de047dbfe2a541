//! Public error surface of the catalog client.

use thiserror::Error;

/// Errors surfaced to callers of [`crate::catalog::CatalogClient`].
///
/// Load-time and per-entry failures are deliberately absorbed: a broken
/// source behaves as an empty catalog and unreachable artifacts shrink the
/// result set. Requesting the download URL of an identity the catalog does
/// not contain is the one hard failure, since it means the caller resolved
/// URLs without listing plugins first.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("plugin {plugin_id}:{version} is not in the catalog")]
    UnknownIdentity { plugin_id: String, version: String },
}

impl CatalogError {
    pub(crate) fn unknown_identity(identity: &crate::identity::PluginIdentity) -> Self {
        CatalogError::UnknownIdentity {
            plugin_id: identity.plugin_id().to_string(),
            version: identity.version().to_string(),
        }
    }
}
