//! Referenced profile table used to resolve nested structures

use serde_json::Value;

/// Ordered mapping of namespace identifiers to profile documents.
///
/// Iteration order is insertion order; [`ReferencedProfiles::resolve`]
/// depends on it.
#[derive(Debug, Clone, Default)]
pub struct ReferencedProfiles {
    entries: Vec<(String, Value)>,
}

impl ReferencedProfiles {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile document under a namespace.
    ///
    /// Re-registering a namespace replaces its document in place.
    pub fn insert(&mut self, namespace: impl Into<String>, document: Value) {
        let namespace = namespace.into();
        match self.entries.iter_mut().find(|(ns, _)| *ns == namespace) {
            Some(entry) => entry.1 = document,
            None => self.entries.push((namespace, document)),
        }
    }

    /// Get a profile document by exact namespace
    pub fn get(&self, namespace: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(ns, _)| ns == namespace)
            .map(|(_, document)| document)
    }

    /// Find the document a `cesmii:profileReference` points at.
    ///
    /// A namespace matches when either string contains the other; the first
    /// match in insertion order wins. The loose match tolerates references
    /// that differ from the registered namespace by a URI prefix or suffix,
    /// and can pick the wrong profile when namespaces nest.
    pub fn resolve(&self, profile_ref: &str) -> Option<(&str, &Value)> {
        self.entries
            .iter()
            .find(|(ns, _)| profile_ref.contains(ns.as_str()) || ns.contains(profile_ref))
            .map(|(ns, document)| (ns.as_str(), document))
    }

    /// Iterate over `(namespace, document)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(ns, document)| (ns.as_str(), document))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Value)> for ReferencedProfiles {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut profiles = Self::new();
        for (namespace, document) in iter {
            profiles.insert(namespace, document);
        }
        profiles
    }
}
