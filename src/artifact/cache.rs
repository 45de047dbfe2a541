//! On-disk plugin artifact cache.
//!
//! Downloads each plugin bundle at most once and reuses the copy across
//! queries. There is no eviction; the cache directory can be deleted
//! wholesale to reclaim space.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::identity::PluginIdentity;

/// Materializes plugin artifacts for local inspection, downloading or
/// reusing a previously downloaded copy. Keyed by plugin identity; caching
/// policy is owned entirely by the implementation.
pub trait ArtifactCache {
    fn get_or_download(&self, identity: &PluginIdentity, url: &str) -> Result<PathBuf>;
}

/// Artifact cache backed by a directory of downloaded bundles.
pub struct DiskArtifactCache {
    client: reqwest::blocking::Client,
    cache_dir: PathBuf,
}

impl DiskArtifactCache {
    /// Create a cache in the user's cache directory.
    pub fn new() -> Result<Self> {
        Self::with_cache_dir(default_cache_dir()?)
    }

    /// Create a cache rooted at a specific directory.
    pub fn with_cache_dir(cache_dir: PathBuf) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("plugin-catalog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(120))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, cache_dir })
    }

    /// Cache file path for one plugin release.
    fn artifact_path(&self, identity: &PluginIdentity) -> PathBuf {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        identity.hash(&mut hasher);
        let hash = hasher.finish();

        self.cache_dir
            .join(format!("{}_{hash:016x}.tar.gz", sanitize(identity.plugin_id())))
    }

    fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to download plugin artifact from {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("Download failed: HTTP {} for {}", response.status(), url);
        }

        let bytes = response
            .bytes()
            .context("Failed to read download response")?;

        fs::create_dir_all(&self.cache_dir).with_context(|| {
            format!(
                "Failed to create cache directory: {}",
                self.cache_dir.display()
            )
        })?;

        // A partial download must never be visible under the final name.
        let scratch = dest.with_extension("part");
        fs::write(&scratch, &bytes)
            .with_context(|| format!("Failed to write artifact: {}", scratch.display()))?;
        fs::rename(&scratch, dest)
            .with_context(|| format!("Failed to finalize artifact: {}", dest.display()))?;

        Ok(())
    }
}

impl ArtifactCache for DiskArtifactCache {
    fn get_or_download(&self, identity: &PluginIdentity, url: &str) -> Result<PathBuf> {
        let path = self.artifact_path(identity);

        if path.exists() {
            tracing::debug!("reusing cached artifact for {identity}");
            return Ok(path);
        }

        tracing::info!("downloading {identity} from {url}");
        self.download(url, &path)?;
        Ok(path)
    }
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn default_cache_dir() -> Result<PathBuf> {
    let cache_dir = directories::ProjectDirs::from("dev", "plugin-catalog", "plugin-catalog")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .or_else(|| dirs::cache_dir().map(|d| d.join("plugin-catalog")))
        .context("Could not determine cache directory")?;

    Ok(cache_dir.join("artifacts"))
}
