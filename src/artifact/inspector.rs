//! Plugin bundle inspection.
//!
//! A plugin artifact is a gzipped tarball carrying a `descriptor.xml` at the
//! bundle root (or inside its single top-level directory):
//!
//! ```xml
//! <plugin id="com.example.format" version="1.4.0">
//!   <platform since="211.0" until="213.*"/>
//! </plugin>
//! ```
//!
//! The `<platform>` element declares the inclusive range of platform builds
//! the plugin supports; either bound may be omitted.

use anyhow::{anyhow, Context, Result};
use flate2::read::GzDecoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::cmp::Ordering;
use std::fs::File;
use std::io::Read as _;
use std::path::Path;

use crate::version::PlatformVersion;

/// Name of the descriptor file inside a plugin bundle.
const DESCRIPTOR_FILE: &str = "descriptor.xml";

/// Metadata a plugin bundle declares about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactMetadata {
    pub id: String,
    pub version: String,
    /// Earliest supported platform build, inclusive. `None` means unbounded.
    pub since: Option<PlatformVersion>,
    /// Latest supported platform build, inclusive. `None` means unbounded.
    pub until: Option<PlatformVersion>,
}

impl ArtifactMetadata {
    /// Whether the declared compatibility range contains `platform`.
    pub fn supports(&self, platform: &PlatformVersion) -> bool {
        if let Some(since) = &self.since {
            if since.cmp_build(platform) == Ordering::Greater {
                return false;
            }
        }
        if let Some(until) = &self.until {
            if platform.cmp_build(until) == Ordering::Greater {
                return false;
            }
        }
        true
    }
}

/// Loads metadata out of downloaded plugin artifacts.
pub trait ArtifactInspector {
    /// Read the bundle's metadata, or `None` when the artifact cannot be
    /// read or carries no usable descriptor.
    fn load(&self, artifact: &Path) -> Option<ArtifactMetadata>;

    /// Whether the artifact declares compatibility with `platform`.
    /// An unreadable artifact is never compatible.
    fn is_compatible(&self, artifact: &Path, platform: &PlatformVersion) -> bool {
        match self.load(artifact) {
            Some(metadata) => metadata.supports(platform),
            None => false,
        }
    }
}

/// Default inspector for tar.gz plugin bundles.
pub struct BundleInspector;

impl ArtifactInspector for BundleInspector {
    fn load(&self, artifact: &Path) -> Option<ArtifactMetadata> {
        match read_bundle_descriptor(artifact) {
            Ok(metadata) => Some(metadata),
            Err(err) => {
                tracing::debug!(
                    "cannot inspect plugin bundle {}: {:#}",
                    artifact.display(),
                    err
                );
                None
            }
        }
    }
}

fn read_bundle_descriptor(artifact: &Path) -> Result<ArtifactMetadata> {
    let file = File::open(artifact)
        .with_context(|| format!("Failed to open plugin bundle {}", artifact.display()))?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    for entry in archive.entries().context("Failed to read plugin bundle")? {
        let mut entry = entry.context("Failed to read plugin bundle entry")?;
        let path = entry.path().context("Invalid path in plugin bundle")?;

        let is_descriptor = path
            .file_name()
            .map(|name| name == DESCRIPTOR_FILE)
            .unwrap_or(false)
            && path.components().count() <= 2;
        if !is_descriptor {
            continue;
        }

        let mut text = String::new();
        entry
            .read_to_string(&mut text)
            .context("Failed to read plugin descriptor")?;
        return parse_descriptor(&text);
    }

    anyhow::bail!(
        "plugin bundle {} has no {DESCRIPTOR_FILE}",
        artifact.display()
    )
}

fn parse_descriptor(text: &str) -> Result<ArtifactMetadata> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut id = String::new();
    let mut version = String::new();
    let mut since = None;
    let mut until = None;
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    read_plugin_attrs(&e, &mut id, &mut version)?;
                    saw_root = true;
                } else if depth == 1 && e.name().as_ref() == b"platform" {
                    read_platform_attrs(&e, &mut since, &mut until)?;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) => {
                if depth == 0 {
                    read_plugin_attrs(&e, &mut id, &mut version)?;
                    saw_root = true;
                } else if depth == 1 && e.name().as_ref() == b"platform" {
                    read_platform_attrs(&e, &mut since, &mut until)?;
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("descriptor parse error: {e}")),
            _ => {}
        }
    }

    if !saw_root {
        anyhow::bail!("descriptor has no root element");
    }
    if id.is_empty() {
        anyhow::bail!("descriptor is missing a plugin id");
    }
    if version.is_empty() {
        anyhow::bail!("descriptor is missing a plugin version");
    }

    Ok(ArtifactMetadata {
        id,
        version,
        since,
        until,
    })
}

fn read_plugin_attrs(element: &BytesStart, id: &mut String, version: &mut String) -> Result<()> {
    if element.name().as_ref() != b"plugin" {
        anyhow::bail!("descriptor root element is not <plugin>");
    }

    for attr in element.attributes() {
        let attr = attr.map_err(|e| anyhow!("malformed attribute in descriptor: {e}"))?;
        let value = attr
            .unescape_value()
            .map_err(|e| anyhow!("XML unescape error: {e}"))?;

        match attr.key.as_ref() {
            b"id" => *id = value.into_owned(),
            b"version" => *version = value.into_owned(),
            _ => {}
        }
    }

    Ok(())
}

fn read_platform_attrs(
    element: &BytesStart,
    since: &mut Option<PlatformVersion>,
    until: &mut Option<PlatformVersion>,
) -> Result<()> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| anyhow!("malformed attribute in descriptor: {e}"))?;
        let value = attr
            .unescape_value()
            .map_err(|e| anyhow!("XML unescape error: {e}"))?;

        match attr.key.as_ref() {
            b"since" => {
                *since = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid since build {value:?}"))?,
                );
            }
            b"until" => {
                *until = Some(
                    value
                        .parse()
                        .with_context(|| format!("invalid until build {value:?}"))?,
                );
            }
            _ => {}
        }
    }

    Ok(())
}
