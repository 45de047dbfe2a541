//! Remote plugin catalog client.
//!
//! # Overview
//!
//! A catalog source is a URL serving an XML plugin list. The client fetches
//! and parses that list exactly once per instance, memoizes the result as an
//! insertion-ordered mapping from plugin identity to resolved download URL,
//! and answers platform-compatibility queries by materializing candidate
//! artifacts and inspecting their descriptors.
//!
//! # Architecture
//!
//! ```text
//! Source URL (HTTP)
//!     │
//!     ├── plugins.xml          ← lists plugin releases (id, version, url)
//!     │      │ fetch + parse, once per client
//!     │      ▼
//!     │  Catalog               ← ordered identity → download URL mapping
//!     │      │ compatibility queries
//!     │      ▼
//!     └── releases/*.tar.gz    ← downloaded on demand, kept on disk,
//!                                descriptor checked against the platform
//! ```
//!
//! Load-time failures degrade to an empty catalog; per-entry failures shrink
//! the result set. See [`crate::error::CatalogError`] for the one condition
//! surfaced to callers.

mod client;
mod document;
mod index;

pub use client::{resolve_download_url, CatalogClient};
pub use document::{DocumentParser, PluginEntry, XmlListParser};
pub use index::Catalog;
