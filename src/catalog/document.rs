//! Plugin list document parsing.
//!
//! A catalog source is a single XML document listing plugin releases:
//!
//! ```xml
//! <plugins>
//!   <plugin id="com.example.format" version="1.4.0" url="format-1.4.0.tar.gz"/>
//!   <plugin id="com.example.lint" version="0.9.1" url="https://cdn.example.com/lint.tar.gz"/>
//! </plugins>
//! ```
//!
//! Only top-level `<plugin>` children of the root element are read, and only
//! their `id`, `version`, and `url` attributes; everything else in the
//! document is ignored.

use anyhow::{anyhow, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One raw `<plugin>` element from a plugin list document, before identity
/// validation or URL resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginEntry {
    /// `id` attribute; empty when absent.
    pub id: String,
    /// `version` attribute; empty when absent.
    pub version: String,
    /// `url` attribute, possibly relative to the list's own location.
    pub url: Option<String>,
}

/// Parses plugin list markup into raw entries, in document order.
pub trait DocumentParser {
    fn parse(&self, text: &str) -> Result<Vec<PluginEntry>>;
}

/// Default parser for the XML plugin list format.
pub struct XmlListParser;

impl DocumentParser for XmlListParser {
    fn parse(&self, text: &str) -> Result<Vec<PluginEntry>> {
        parse_plugin_list(text)
    }
}

fn parse_plugin_list(text: &str) -> Result<Vec<PluginEntry>> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut entries = Vec::new();
    let mut depth = 0usize;
    let mut saw_root = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                depth += 1;
                if depth == 1 {
                    saw_root = true;
                } else if depth == 2 && e.name().as_ref() == b"plugin" {
                    entries.push(read_entry(&e)?);
                }
            }
            Ok(Event::Empty(e)) => {
                if depth == 1 && e.name().as_ref() == b"plugin" {
                    entries.push(read_entry(&e)?);
                }
            }
            Ok(Event::End(_)) => depth = depth.saturating_sub(1),
            Ok(Event::Eof) => break,
            Err(e) => return Err(anyhow!("XML parse error: {e}")),
            _ => {}
        }
    }

    if !saw_root {
        anyhow::bail!("plugin list has no root element");
    }

    Ok(entries)
}

fn read_entry(element: &BytesStart) -> Result<PluginEntry> {
    let mut id = String::new();
    let mut version = String::new();
    let mut url = None;

    for attr in element.attributes() {
        let attr = attr.map_err(|e| anyhow!("malformed attribute in plugin list: {e}"))?;
        let value = attr
            .unescape_value()
            .map_err(|e| anyhow!("XML unescape error: {e}"))?;

        match attr.key.as_ref() {
            b"id" => id = value.into_owned(),
            b"version" => version = value.into_owned(),
            b"url" => url = Some(value.into_owned()),
            _ => {}
        }
    }

    Ok(PluginEntry { id, version, url })
}
