//! Memoizing client for one catalog source.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::artifact::{ArtifactCache, ArtifactInspector, BundleInspector, DiskArtifactCache};
use crate::catalog::document::{DocumentParser, XmlListParser};
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::fetch::{DocumentFetcher, HttpFetcher};
use crate::identity::PluginIdentity;
use crate::sources::CatalogSource;
use crate::version::PlatformVersion;

/// Client for a single plugin list URL.
///
/// The catalog is fetched and parsed on first use, then memoized for the
/// lifetime of the client; it is never refreshed or evicted. A source that
/// cannot be fetched or parsed degrades to an empty catalog (with a logged
/// diagnostic) instead of failing the caller.
///
/// First-use population goes through [`OnceCell::get_or_init`], so even a
/// client shared between threads loads the catalog at most once. The bundled
/// collaborators are thread-compatible, but the client itself holds no lock
/// around query I/O; concurrent queries simply issue their own downloads.
pub struct CatalogClient {
    source_url: String,
    fetcher: Box<dyn DocumentFetcher>,
    parser: Box<dyn DocumentParser>,
    artifacts: Box<dyn ArtifactCache>,
    inspector: Box<dyn ArtifactInspector>,
    catalog: OnceCell<Catalog>,
}

impl CatalogClient {
    /// Client with the default collaborators: HTTP fetch, XML list parsing,
    /// on-disk artifact cache, tar.gz bundle inspection.
    pub fn new(source_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_collaborators(
            source_url,
            Box::new(HttpFetcher::new().context("Failed to create plugin list fetcher")?),
            Box::new(XmlListParser),
            Box::new(DiskArtifactCache::new().context("Failed to create artifact cache")?),
            Box::new(BundleInspector),
        ))
    }

    /// Client for a configured catalog source.
    pub fn for_source(source: &CatalogSource) -> Result<Self> {
        Self::new(source.url.clone())
    }

    /// Client with explicit collaborators.
    pub fn with_collaborators(
        source_url: impl Into<String>,
        fetcher: Box<dyn DocumentFetcher>,
        parser: Box<dyn DocumentParser>,
        artifacts: Box<dyn ArtifactCache>,
        inspector: Box<dyn ArtifactInspector>,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            fetcher,
            parser,
            artifacts,
            inspector,
            catalog: OnceCell::new(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }

    /// The catalog for this source, fetching and parsing it on first use.
    ///
    /// A fetch or parse failure is logged and cached as an empty catalog:
    /// a broken source means "no plugins available", not a hard error.
    pub fn catalog(&self) -> &Catalog {
        self.catalog.get_or_init(|| match self.load_catalog() {
            Ok(catalog) => catalog,
            Err(err) => {
                tracing::warn!(
                    "failed to load plugin list from {}: {:#}",
                    self.source_url,
                    err
                );
                Catalog::default()
            }
        })
    }

    fn load_catalog(&self) -> Result<Catalog> {
        let text = self
            .fetcher
            .fetch(&self.source_url)
            .with_context(|| format!("failed to fetch plugin list from {}", self.source_url))?;

        let entries = self
            .parser
            .parse(&text)
            .with_context(|| format!("failed to parse plugin list from {}", self.source_url))?;

        let mut catalog = Catalog::default();
        for entry in entries {
            let Some(identity) = PluginIdentity::new(entry.id, entry.version) else {
                tracing::debug!("dropping plugin list entry without an id or version");
                continue;
            };
            let Some(raw_url) = entry.url else {
                tracing::debug!("dropping plugin list entry {identity} without a download url");
                continue;
            };

            let url = resolve_download_url(&self.source_url, &raw_url);
            catalog.insert(identity, url);
        }

        tracing::debug!(
            "loaded {} plugin releases from {}",
            catalog.len(),
            self.source_url
        );
        Ok(catalog)
    }

    /// All catalog releases compatible with `platform_version`, in catalog
    /// order.
    pub fn all_compatible(&self, platform_version: &str) -> Vec<PluginIdentity> {
        self.list_compatible(platform_version, |_| true)
    }

    /// Compatible releases of the named plugins only. Matching is by plugin
    /// id, so several listed versions of an allowed plugin may all be
    /// returned.
    pub fn compatible_among(
        &self,
        platform_version: &str,
        plugin_ids: &HashSet<String>,
    ) -> Vec<PluginIdentity> {
        self.list_compatible(platform_version, |identity| {
            plugin_ids.contains(identity.plugin_id())
        })
    }

    /// Single-plugin lookup is not supported for list-backed catalog
    /// sources; this always returns `None`.
    pub fn find_plugin(&self, _platform_version: &str, _plugin_id: &str) -> Option<PluginIdentity> {
        None
    }

    /// Resolved download URL for a catalog entry.
    ///
    /// This accessor assumes the identity came out of a prior listing call;
    /// an identity the catalog does not contain is caller misuse and yields
    /// [`CatalogError::UnknownIdentity`].
    pub fn download_url(&self, identity: &PluginIdentity) -> Result<&str, CatalogError> {
        self.catalog()
            .get(identity)
            .ok_or_else(|| CatalogError::unknown_identity(identity))
    }

    fn list_compatible<F>(&self, platform_version: &str, mut predicate: F) -> Vec<PluginIdentity>
    where
        F: FnMut(&PluginIdentity) -> bool,
    {
        // An unparseable platform version means "no compatible plugins",
        // short-circuiting before the catalog is even loaded.
        let platform: PlatformVersion = match platform_version.parse() {
            Ok(version) => version,
            Err(err) => {
                tracing::debug!(
                    "no compatible plugins for unparseable platform version {platform_version:?}: {err}"
                );
                return Vec::new();
            }
        };

        let mut compatible = Vec::new();
        for (identity, url) in self.catalog().iter() {
            if !predicate(identity) {
                continue;
            }

            let artifact = match self.artifacts.get_or_download(identity, url) {
                Ok(path) => path,
                Err(err) => {
                    tracing::debug!("skipping {identity}: artifact unavailable: {err:#}");
                    continue;
                }
            };

            if self.inspector.is_compatible(&artifact, &platform) {
                compatible.push(identity.clone());
            }
        }

        compatible
    }
}

/// Resolve a plugin list entry's `url` attribute against the list's own URL.
///
/// A value already carrying a scheme separator is returned unchanged.
/// Otherwise the base URL up to and including its last `/` is prepended,
/// resolving the value relative to the list document's directory. A base
/// with no `/` at all cannot anchor anything and the raw value is returned
/// as-is. Deliberately string-level: no `..`, query, or fragment handling.
pub fn resolve_download_url(base_url: &str, raw_url: &str) -> String {
    if raw_url.contains("://") {
        return raw_url.to_string();
    }

    match base_url.rfind('/') {
        Some(idx) => format!("{}{}", &base_url[..=idx], raw_url),
        None => raw_url.to_string(),
    }
}

#[cfg(test)]
mod resolve_tests {
    use super::resolve_download_url;

    #[test]
    fn test_absolute_url_is_unchanged() {
        assert_eq!(
            resolve_download_url("http://host/path/list.xml", "https://cdn.example.com/foo.zip"),
            "https://cdn.example.com/foo.zip"
        );
    }

    #[test]
    fn test_relative_url_resolves_against_list_directory() {
        assert_eq!(
            resolve_download_url("http://host/path/list.xml", "foo.zip"),
            "http://host/path/foo.zip"
        );
        assert_eq!(
            resolve_download_url("http://host/list.xml", "sub/foo.zip"),
            "http://host/sub/foo.zip"
        );
    }

    #[test]
    fn test_base_without_separator_degrades_to_raw_value() {
        assert_eq!(resolve_download_url("no-separator", "foo.zip"), "foo.zip");
    }

    #[test]
    fn test_resolution_is_string_level_only() {
        // No dot-segment normalization; reproduce the literal concatenation.
        assert_eq!(
            resolve_download_url("http://host/a/b/list.xml", "../foo.zip"),
            "http://host/a/b/../foo.zip"
        );
    }
}
