//! Indexed in-memory triple store.
//!
//! Triples are held in two nested ordered indexes so that both
//! `(subject, predicate) → objects` and `(predicate, object) → subjects`
//! lookups are logarithmic. Ordered maps make iteration order lexical and
//! therefore deterministic across runs.

use std::collections::{BTreeMap, BTreeSet};

use ontograph_core::{Iri, Term, Triple};

use crate::namespaces::Namespaces;
use crate::store::GraphStore;

type Index<K1, K2> = BTreeMap<K1, BTreeMap<K2, BTreeSet<Term>>>;

/// The in-memory graph.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    /// subject → predicate → objects
    spo: Index<Term, Iri>,
    /// predicate → object → subjects
    pos: Index<Iri, Term>,
    len: usize,
    namespaces: Namespaces,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// An empty store with the standard prefixes bound.
    pub fn new() -> Self {
        Self {
            spo: BTreeMap::new(),
            pos: BTreeMap::new(),
            len: 0,
            namespaces: Namespaces::standard(),
        }
    }

    /// Build a store from parsed triples and a prefix table.
    pub fn from_triples(triples: impl IntoIterator<Item = Triple>, namespaces: Namespaces) -> Self {
        let mut store = Self {
            namespaces,
            ..Self::new()
        };
        for triple in triples {
            store.insert(triple);
        }
        store
    }

    /// Iterate every triple in subject/predicate/object order.
    pub fn iter(&self) -> impl Iterator<Item = Triple> + '_ {
        self.spo.iter().flat_map(|(s, by_p)| {
            by_p.iter().flat_map(move |(p, objects)| {
                objects
                    .iter()
                    .map(move |o| Triple::new(s.clone(), p.clone(), o.clone()))
            })
        })
    }

    /// Number of distinct subjects.
    pub fn subject_count(&self) -> usize {
        self.spo.len()
    }

    /// Number of distinct predicates.
    pub fn predicate_count(&self) -> usize {
        self.pos.len()
    }
}

/// Insert `leaf` under `k1 → k2`, returning whether it was new.
fn index_insert<K1: Ord, K2: Ord>(index: &mut Index<K1, K2>, k1: K1, k2: K2, leaf: Term) -> bool {
    index.entry(k1).or_default().entry(k2).or_default().insert(leaf)
}

/// Remove `leaf` under `k1 → k2`, pruning empty branches.
fn index_remove<K1: Ord, K2: Ord>(index: &mut Index<K1, K2>, k1: &K1, k2: &K2, leaf: &Term) -> bool {
    let Some(inner) = index.get_mut(k1) else {
        return false;
    };
    let Some(leaves) = inner.get_mut(k2) else {
        return false;
    };
    let removed = leaves.remove(leaf);
    if leaves.is_empty() {
        inner.remove(k2);
    }
    if inner.is_empty() {
        index.remove(k1);
    }
    removed
}

impl GraphStore for MemoryStore {
    fn insert(&mut self, triple: Triple) -> bool {
        let Triple {
            subject,
            predicate,
            object,
        } = triple;
        if !index_insert(&mut self.spo, subject.clone(), predicate.clone(), object.clone()) {
            return false;
        }
        index_insert(&mut self.pos, predicate, object, subject);
        self.len += 1;
        true
    }

    fn remove(&mut self, triple: &Triple) -> bool {
        if !index_remove(&mut self.spo, &triple.subject, &triple.predicate, &triple.object) {
            return false;
        }
        index_remove(&mut self.pos, &triple.predicate, &triple.object, &triple.subject);
        self.len -= 1;
        true
    }

    fn contains(&self, triple: &Triple) -> bool {
        self.spo
            .get(&triple.subject)
            .and_then(|by_p| by_p.get(&triple.predicate))
            .is_some_and(|objects| objects.contains(&triple.object))
    }

    fn objects(&self, subject: &Term, predicate: &Iri) -> Vec<Term> {
        self.spo
            .get(subject)
            .and_then(|by_p| by_p.get(predicate))
            .map(|objects| objects.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn subjects(&self, predicate: &Iri, object: &Term) -> Vec<Term> {
        self.pos
            .get(predicate)
            .and_then(|by_o| by_o.get(object))
            .map(|subjects| subjects.iter().cloned().collect())
            .unwrap_or_default()
    }

    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple> {
        let mut out = Vec::new();

        if let Some(s) = subject {
            let Some(by_p) = self.spo.get(s) else {
                return out;
            };
            for (p, objects) in by_p {
                if predicate.is_some_and(|want| want != p) {
                    continue;
                }
                for o in objects {
                    if object.is_some_and(|want| want != o) {
                        continue;
                    }
                    out.push(Triple::new(s.clone(), p.clone(), o.clone()));
                }
            }
            return out;
        }

        for (p, by_o) in &self.pos {
            if predicate.is_some_and(|want| want != p) {
                continue;
            }
            for (o, subjects) in by_o {
                if object.is_some_and(|want| want != o) {
                    continue;
                }
                for s in subjects {
                    out.push(Triple::new(s.clone(), p.clone(), o.clone()));
                }
            }
        }
        out
    }

    fn len(&self) -> usize {
        self.len
    }

    fn namespaces(&self) -> &Namespaces {
        &self.namespaces
    }

    fn set_prefix(&mut self, prefix: &str, uri: &str) -> Option<String> {
        self.namespaces.set(prefix, uri)
    }

    fn remove_prefix(&mut self, prefix: &str) -> Option<String> {
        self.namespaces.remove(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontograph_core::vocab;
    use ontograph_core::{Literal, NodeKind, PropertyKind};

    fn iri(text: &str) -> Iri {
        Iri::new(text).unwrap()
    }

    fn t(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(iri(s), iri(p), iri(o))
    }

    #[test]
    fn insert_is_idempotent() {
        let mut store = MemoryStore::new();
        assert!(store.insert(t("http://ex/a", "http://ex/p", "http://ex/b")));
        assert!(!store.insert(t("http://ex/a", "http://ex/p", "http://ex/b")));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn remove_prunes_indexes() {
        let mut store = MemoryStore::new();
        let triple = t("http://ex/a", "http://ex/p", "http://ex/b");
        store.insert(triple.clone());
        assert!(store.remove(&triple));
        assert!(!store.remove(&triple));
        assert!(store.is_empty());
        assert_eq!(store.subject_count(), 0);
        assert_eq!(store.predicate_count(), 0);
    }

    #[test]
    fn lookups_by_both_indexes() {
        let mut store = MemoryStore::new();
        store.insert(t("http://ex/a", "http://ex/p", "http://ex/b"));
        store.insert(t("http://ex/a", "http://ex/p", "http://ex/c"));
        store.insert(t("http://ex/d", "http://ex/p", "http://ex/c"));

        let objects = store.objects(&iri("http://ex/a").into(), &iri("http://ex/p"));
        assert_eq!(objects.len(), 2);

        let subjects = store.subjects(&iri("http://ex/p"), &iri("http://ex/c").into());
        assert_eq!(subjects.len(), 2);

        let all = store.triples_matching(None, Some(&iri("http://ex/p")), None);
        assert_eq!(all.len(), 3);
        let by_object = store.triples_matching(None, None, Some(&iri("http://ex/c").into()));
        assert_eq!(by_object.len(), 2);
        assert_eq!(store.iter().count(), 3);
    }

    #[test]
    fn remove_all_with_and_remove_node() {
        let mut store = MemoryStore::new();
        store.insert(t("http://ex/a", "http://ex/p", "http://ex/b"));
        store.insert(t("http://ex/a", "http://ex/p", "http://ex/c"));
        store.insert(t("http://ex/a", "http://ex/q", "http://ex/c"));
        store.insert(t("http://ex/z", "http://ex/q", "http://ex/a"));

        assert_eq!(
            store.remove_all_with(&iri("http://ex/a").into(), &iri("http://ex/p")),
            2
        );
        assert_eq!(store.len(), 2);
        assert_eq!(store.remove_node(&iri("http://ex/a").into()), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn find_or_create_is_idempotent() {
        let mut store = MemoryStore::new();
        let class = iri("http://ex/Animal");
        let first = store.find_or_create_class(&class);
        let second = store.find_or_create_class(&class);
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
        assert_eq!(store.kind_of(&class), NodeKind::Class);
    }

    #[test]
    fn classification_from_types() {
        let mut store = MemoryStore::new();
        let prop = iri("http://ex/age");
        store.find_or_create_property(&prop, PropertyKind::Data);
        assert_eq!(store.kind_of(&prop), NodeKind::Property(PropertyKind::Data));

        let rex = iri("http://ex/rex");
        store.insert(t("http://ex/rex", vocab::RDF_TYPE, "http://ex/Dog"));
        assert_eq!(store.kind_of(&rex), NodeKind::Individual);
        assert_eq!(store.kind_of(&iri("http://ex/nothing")), NodeKind::Unknown);
        assert!(store.classify(&Term::Literal(Literal::simple("x"))).is_none());
    }

    #[test]
    fn plain_property_upgrades_to_requested_kind() {
        let mut store = MemoryStore::new();
        let prop = iri("http://ex/p");
        store.find_or_create_property(&prop, PropertyKind::Plain);
        let node = store.find_or_create_property(&prop, PropertyKind::Object);
        assert_eq!(node.kind, NodeKind::Property(PropertyKind::Object));
        // Asking for a plain property again is satisfied by the object property.
        let again = store.find_or_create_property(&prop, PropertyKind::Plain);
        assert_eq!(again.kind, NodeKind::Property(PropertyKind::Object));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn labels_prefer_requested_language() {
        let mut store = MemoryStore::new();
        let a = iri("http://ex/a");
        let label = vocab::iri(vocab::RDFS_LABEL);
        store.add_triple(&a.clone().into(), &label, &Literal::lang("Hund", "de").into());
        store.add_triple(&a.clone().into(), &label, &Literal::simple("dog").into());

        assert_eq!(store.label(&a, None).as_deref(), Some("dog"));
        assert_eq!(store.label(&a, Some("de")).as_deref(), Some("Hund"));
        assert_eq!(store.label(&a, Some("fr")), None);
        assert_eq!(store.nodes_with_label("Hund"), vec![a.clone()]);
        assert!(store.nodes_with_label("cat").is_empty());
    }

    #[test]
    fn standard_prefixes_are_bound() {
        let store = MemoryStore::new();
        assert_eq!(
            store.expand_prefix("rdfs", "label").as_deref(),
            Some(vocab::RDFS_LABEL)
        );
    }
}
