//! The resolved catalog: an insertion-ordered mapping from plugin identity to
//! absolute download URL.

use std::cmp::Ordering;

use crate::identity::PluginIdentity;

/// The parsed catalog for one source location.
///
/// Entries keep the order of the source document. Inserting an identity that
/// is already present replaces its URL in place (last write wins, position
/// unchanged), matching mapping semantics. Built once per client and never
/// mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<(PluginIdentity, String)>,
}

impl Catalog {
    pub(crate) fn insert(&mut self, identity: PluginIdentity, url: String) {
        if let Some(slot) = self
            .entries
            .iter_mut()
            .find(|(existing, _)| *existing == identity)
        {
            slot.1 = url;
        } else {
            self.entries.push((identity, url));
        }
    }

    /// Download URL for one plugin release, if listed.
    pub fn get(&self, identity: &PluginIdentity) -> Option<&str> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == identity)
            .map(|(_, url)| url.as_str())
    }

    /// Entries in source-document order.
    pub fn iter(&self) -> impl Iterator<Item = (&PluginIdentity, &str)> {
        self.entries
            .iter()
            .map(|(identity, url)| (identity, url.as_str()))
    }

    /// All listed releases of one plugin, in source-document order.
    pub fn versions_of(&self, plugin_id: &str) -> Vec<&PluginIdentity> {
        self.entries
            .iter()
            .filter(|(identity, _)| identity.plugin_id() == plugin_id)
            .map(|(identity, _)| identity)
            .collect()
    }

    /// Newest listed release of one plugin.
    ///
    /// Versions are compared as semver where both sides parse, falling back
    /// to plain string ordering otherwise.
    pub fn latest_of(&self, plugin_id: &str) -> Option<&PluginIdentity> {
        self.versions_of(plugin_id)
            .into_iter()
            .max_by(|a, b| compare_plugin_versions(a.version(), b.version()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn compare_plugin_versions(a: &str, b: &str) -> Ordering {
    match (semver::Version::parse(a), semver::Version::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

#[cfg(test)]
mod index_tests {
    use super::*;

    fn identity(id: &str, version: &str) -> PluginIdentity {
        PluginIdentity::new(id, version).unwrap()
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::default();
        catalog.insert(identity("b", "1.0.0"), "http://h/b-1.tar.gz".to_string());
        catalog.insert(identity("a", "2.0.0"), "http://h/a-2.tar.gz".to_string());
        catalog.insert(identity("a", "1.5.0"), "http://h/a-15.tar.gz".to_string());
        catalog
    }

    #[test]
    fn test_get_and_iteration_order() {
        let catalog = sample_catalog();

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get(&identity("a", "2.0.0")),
            Some("http://h/a-2.tar.gz")
        );
        assert_eq!(catalog.get(&identity("a", "9.9.9")), None);

        let order: Vec<String> = catalog.iter().map(|(i, _)| i.to_string()).collect();
        assert_eq!(order, vec!["b:1.0.0", "a:2.0.0", "a:1.5.0"]);
    }

    #[test]
    fn test_insert_is_last_write_wins_in_place() {
        let mut catalog = sample_catalog();
        catalog.insert(identity("b", "1.0.0"), "http://h/b-new.tar.gz".to_string());

        assert_eq!(catalog.len(), 3);
        assert_eq!(
            catalog.get(&identity("b", "1.0.0")),
            Some("http://h/b-new.tar.gz")
        );
        // Position of the overwritten entry is retained.
        let first = catalog.iter().next().unwrap().0.to_string();
        assert_eq!(first, "b:1.0.0");
    }

    #[test]
    fn test_versions_of() {
        let catalog = sample_catalog();

        let versions: Vec<String> = catalog
            .versions_of("a")
            .into_iter()
            .map(|i| i.version().to_string())
            .collect();
        assert_eq!(versions, vec!["2.0.0", "1.5.0"]);
        assert!(catalog.versions_of("missing").is_empty());
    }

    #[test]
    fn test_latest_of_prefers_semver_ordering() {
        let mut catalog = Catalog::default();
        catalog.insert(identity("a", "2.0.0"), "u1".to_string());
        catalog.insert(identity("a", "10.0.0"), "u2".to_string());

        // String ordering would pick "2.0.0"; semver picks "10.0.0".
        assert_eq!(catalog.latest_of("a").unwrap().version(), "10.0.0");
    }

    #[test]
    fn test_latest_of_falls_back_to_string_ordering() {
        let mut catalog = Catalog::default();
        catalog.insert(identity("a", "build-7"), "u1".to_string());
        catalog.insert(identity("a", "build-12"), "u2".to_string());

        assert_eq!(catalog.latest_of("a").unwrap().version(), "build-7");
        assert_eq!(catalog.latest_of("missing"), None);
    }
}
