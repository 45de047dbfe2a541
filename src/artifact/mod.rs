//! Plugin artifact handling: on-disk materialization and bundle inspection.

mod cache;
mod inspector;

pub use cache::{ArtifactCache, DiskArtifactCache};
pub use inspector::{ArtifactInspector, ArtifactMetadata, BundleInspector};
