//! Prefix table mapping short aliases to namespace IRIs.

use std::collections::BTreeMap;

use ontograph_core::vocab;

/// Namespace prefixes known to a store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Namespaces {
    prefixes: BTreeMap<String, String>,
}

impl Namespaces {
    /// Table holding only the standard `rdf`, `rdfs`, `owl`, `xsd`, `ogl` prefixes.
    pub fn standard() -> Self {
        let mut ns = Self::default();
        for (prefix, uri) in vocab::STANDARD_PREFIXES {
            ns.set(prefix, uri);
        }
        ns
    }

    /// Bind `prefix` to `uri`, returning the previous binding.
    pub fn set(&mut self, prefix: &str, uri: &str) -> Option<String> {
        self.prefixes.insert(prefix.to_string(), uri.to_string())
    }

    pub fn remove(&mut self, prefix: &str) -> Option<String> {
        self.prefixes.remove(prefix)
    }

    pub fn get(&self, prefix: &str) -> Option<&str> {
        self.prefixes.get(prefix).map(String::as_str)
    }

    /// `prefix` + `local` → full IRI, if the prefix is bound.
    pub fn expand(&self, prefix: &str, local: &str) -> Option<String> {
        self.get(prefix).map(|ns| format!("{ns}{local}"))
    }

    /// Expand a compact `prefix:local` name. Returns `None` when the text has
    /// no colon or its prefix is unbound, so `http://…` passes through as a
    /// full IRI.
    pub fn expand_curie(&self, curie: &str) -> Option<String> {
        let (prefix, local) = curie.split_once(':')?;
        if local.starts_with("//") {
            return None;
        }
        self.expand(prefix, local)
    }

    /// Shorten `iri` with the longest matching namespace.
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len())
            .map(|(prefix, ns)| format!("{prefix}:{}", &iri[ns.len()..]))
    }

    /// The prefix bound to exactly this namespace, if any.
    pub fn prefix_for(&self, namespace: &str) -> Option<&str> {
        self.prefixes
            .iter()
            .find(|(_, ns)| ns.as_str() == namespace)
            .map(|(prefix, _)| prefix.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes
            .iter()
            .map(|(prefix, ns)| (prefix.as_str(), ns.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}
