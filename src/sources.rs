//! Catalog source configuration.
//!
//! Named catalog sources live in a `sources.yaml` config file so tooling can
//! point at the official list plus any number of company-internal mirrors.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default official source name
pub const DEFAULT_SOURCE_NAME: &str = "official";

/// Default official plugin list URL
pub const DEFAULT_SOURCE_URL: &str = "https://catalog.plugin-catalog.dev/plugins.xml";

/// A configured catalog source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSource {
    /// Source name (e.g., "official", "mycompany")
    pub name: String,

    /// URL of the plugin list document
    pub url: String,

    /// Whether this is the default source
    #[serde(default)]
    pub is_default: bool,
}

/// Source configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// List of configured sources
    pub sources: Vec<CatalogSource>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            sources: vec![CatalogSource {
                name: DEFAULT_SOURCE_NAME.to_string(),
                url: DEFAULT_SOURCE_URL.to_string(),
                is_default: true,
            }],
        }
    }
}

/// Manages configured catalog sources
pub struct SourceManager {
    config: SourceConfig,
    config_path: PathBuf,
}

impl SourceManager {
    /// Load source configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        Self::load_from_path(config_path)
    }

    /// Load source configuration from a specific path
    pub fn load_from_path(config_path: PathBuf) -> Result<Self> {
        let config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path).with_context(|| {
                format!("Failed to read source config: {}", config_path.display())
            })?;
            serde_yaml_ng::from_str(&content).with_context(|| {
                format!("Failed to parse source config: {}", config_path.display())
            })?
        } else {
            SourceConfig::default()
        };

        Ok(Self {
            config,
            config_path,
        })
    }

    /// Get the default config file path
    fn default_config_path() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        Ok(config_dir.join("sources.yaml"))
    }

    /// Get the config directory
    fn config_dir() -> Result<PathBuf> {
        let config_dir = directories::ProjectDirs::from("dev", "plugin-catalog", "plugin-catalog")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("plugin-catalog")))
            .context("Could not determine config directory")?;

        std::fs::create_dir_all(&config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        Ok(config_dir)
    }

    /// Save the current configuration
    pub fn save(&self) -> Result<()> {
        let content =
            serde_yaml_ng::to_string(&self.config).context("Failed to serialize source config")?;

        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(&self.config_path, content).with_context(|| {
            format!(
                "Failed to write source config: {}",
                self.config_path.display()
            )
        })?;

        Ok(())
    }

    /// Get all configured sources
    pub fn sources(&self) -> &[CatalogSource] {
        &self.config.sources
    }

    /// Get a source by name
    pub fn get_source(&self, name: &str) -> Option<&CatalogSource> {
        self.config.sources.iter().find(|s| s.name == name)
    }

    /// Get the default source
    pub fn default_source(&self) -> Option<&CatalogSource> {
        self.config
            .sources
            .iter()
            .find(|s| s.is_default)
            .or_else(|| self.config.sources.first())
    }

    /// Add a new source
    pub fn add_source(&mut self, name: &str, url: &str) -> Result<()> {
        if self.config.sources.iter().any(|s| s.name == name) {
            anyhow::bail!("Source '{}' already exists", name);
        }

        if !url.starts_with("http://") && !url.starts_with("https://") {
            anyhow::bail!("Source URL must start with http:// or https://");
        }

        self.config.sources.push(CatalogSource {
            name: name.to_string(),
            url: url.to_string(),
            is_default: false,
        });

        Ok(())
    }

    /// Remove a source by name
    pub fn remove_source(&mut self, name: &str) -> Result<()> {
        if name == DEFAULT_SOURCE_NAME {
            anyhow::bail!("Cannot remove the default '{}' source", DEFAULT_SOURCE_NAME);
        }

        let initial_len = self.config.sources.len();
        self.config.sources.retain(|s| s.name != name);

        if self.config.sources.len() == initial_len {
            anyhow::bail!("Source '{}' not found", name);
        }

        Ok(())
    }
}

#[cfg(test)]
mod sources_tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = SourceConfig::default();
        assert_eq!(config.sources.len(), 1);
        assert_eq!(config.sources[0].name, DEFAULT_SOURCE_NAME);
        assert!(config.sources[0].is_default);
    }

    #[test]
    fn test_add_source() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        let mut manager = SourceManager::load_from_path(config_path).unwrap();

        manager
            .add_source("mycompany", "https://plugins.mycompany.com/plugins.xml")
            .unwrap();

        assert_eq!(manager.sources().len(), 2);
        assert!(manager.get_source("mycompany").is_some());
    }

    #[test]
    fn test_add_duplicate_source() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        let mut manager = SourceManager::load_from_path(config_path).unwrap();

        let result = manager.add_source(DEFAULT_SOURCE_NAME, "https://other.com/plugins.xml");
        assert!(result.is_err());
    }

    #[test]
    fn test_add_source_rejects_non_http_url() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        let mut manager = SourceManager::load_from_path(config_path).unwrap();

        let result = manager.add_source("local", "file:///tmp/plugins.xml");
        assert!(result.is_err());
    }

    #[test]
    fn test_remove_source() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        let mut manager = SourceManager::load_from_path(config_path).unwrap();

        manager
            .add_source("mycompany", "https://plugins.mycompany.com/plugins.xml")
            .unwrap();
        assert_eq!(manager.sources().len(), 2);

        manager.remove_source("mycompany").unwrap();
        assert_eq!(manager.sources().len(), 1);
    }

    #[test]
    fn test_cannot_remove_default() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        let mut manager = SourceManager::load_from_path(config_path).unwrap();

        let result = manager.remove_source(DEFAULT_SOURCE_NAME);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Cannot remove"));
    }

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("sources.yaml");

        {
            let mut manager = SourceManager::load_from_path(config_path.clone()).unwrap();
            manager
                .add_source("mycompany", "https://plugins.mycompany.com/plugins.xml")
                .unwrap();
            manager.save().unwrap();
        }

        {
            let manager = SourceManager::load_from_path(config_path).unwrap();
            assert_eq!(manager.sources().len(), 2);
            assert!(manager.get_source("mycompany").is_some());
            assert_eq!(
                manager.default_source().unwrap().name,
                DEFAULT_SOURCE_NAME
            );
        }
    }
}
