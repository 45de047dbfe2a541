//! Plugin list document fetching.

use anyhow::{Context, Result};
use std::time::Duration;

/// Fetches the raw plugin list document for a catalog source.
///
/// Implementations own transport concerns (timeouts, TLS); the client treats
/// any failure as "source unavailable" and degrades to an empty catalog.
pub trait DocumentFetcher {
    fn fetch(&self, url: &str) -> Result<String>;
}

/// HTTP fetcher backed by a blocking reqwest client.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("plugin-catalog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl DocumentFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch plugin list from {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Failed to fetch plugin list: HTTP {} from {}",
                response.status(),
                url
            );
        }

        response.text().context("Failed to read response body")
    }
}
