//! List handles and the connector's list operations.

use std::fmt;

use ontograph_core::{AmbiguityPolicy, Iri, Node, OntologyError, Result, Term};
use ontograph_store::{GraphStore, MemoryStore};

use crate::connector::OntologyConnector;
use crate::list;
use crate::resolver::Resolver;

/// A view of one ordered list.
///
/// The handle holds no lock. Every operation re-enters the connector's guard,
/// so a handle stays valid across other threads' edits and observes them.
/// Iteration snapshots the members when it starts.
pub struct OrderedOntologyList<S: GraphStore = MemoryStore> {
    connector: OntologyConnector<S>,
    iri: Iri,
    label: String,
}

impl<S: GraphStore> Clone for OrderedOntologyList<S> {
    fn clone(&self) -> Self {
        Self {
            connector: self.connector.clone(),
            iri: self.iri.clone(),
            label: self.label.clone(),
        }
    }
}

impl<S: GraphStore> fmt::Debug for OrderedOntologyList<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedOntologyList")
            .field("iri", &self.iri)
            .field("label", &self.label)
            .finish()
    }
}

impl<S: GraphStore> OrderedOntologyList<S> {
    fn new(connector: OntologyConnector<S>, iri: Iri, label: String) -> Self {
        Self {
            connector,
            iri,
            label,
        }
    }

    pub fn iri(&self) -> &Iri {
        &self.iri
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The descriptor as a node.
    pub fn node(&self) -> Node {
        self.connector
            .with_read_access(|store| Node::new(self.iri.clone(), store.kind_of(&self.iri)))
    }

    // ── Reads ───────────────────────────────────────────────────

    pub fn members(&self) -> Vec<Node> {
        self.connector.with_read_access(|store| {
            list::members(store, &self.iri)
                .iter()
                .filter_map(|term| store.classify(term))
                .collect()
        })
    }

    /// Snapshot iterator over the members.
    pub fn iter(&self) -> std::vec::IntoIter<Node> {
        self.members().into_iter()
    }

    pub fn len(&self) -> usize {
        self.connector
            .with_read_access(|store| list::len(store, &self.iri))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Result<Node> {
        self.connector.with_read_access(|store| {
            list::ChainIter::new(store, &self.iri)
                .values()
                .nth(index)
                .and_then(|term| store.classify(&term))
                .ok_or_else(|| OntologyError::IndexOutOfBounds {
                    list: self.iri.to_string(),
                    index,
                    len: list::members(store, &self.iri).len(),
                })
        })
    }

    pub fn contains(&self, member: &Node) -> bool {
        self.index_of(member).is_some()
    }

    pub fn index_of(&self, member: &Node) -> Option<usize> {
        self.connector
            .with_read_access(|store| list::index_of(store, &self.iri, &member.term()))
    }

    // ── Writes ──────────────────────────────────────────────────

    fn ensure_list<G: GraphStore + ?Sized>(&self, store: &G) -> Result<()> {
        if list::is_list(store, &self.iri) {
            Ok(())
        } else {
            Err(OntologyError::not_found("list", self.iri.as_str()))
        }
    }

    pub fn append(&self, member: &Node) -> Result<()> {
        let namespace = &self.connector.config().base_namespace;
        self.connector.with_write_access(|scope| {
            self.ensure_list(scope)?;
            list::append(scope, &self.iri, namespace, &member.term())
        })?;
        tracing::debug!(list = %self.iri, member = %member.iri, "List member appended");
        Ok(())
    }

    /// Insert `member` before position `index`. `index == len` appends.
    pub fn insert(&self, index: usize, member: &Node) -> Result<()> {
        let namespace = &self.connector.config().base_namespace;
        self.connector.with_write_access(|scope| {
            self.ensure_list(scope)?;
            list::insert(scope, &self.iri, namespace, index, &member.term())
        })?;
        tracing::debug!(list = %self.iri, member = %member.iri, index, "List member inserted");
        Ok(())
    }

    /// Remove the first occurrence of `member`.
    pub fn remove(&self, member: &Node) -> Result<()> {
        self.connector.with_write_access(|scope| {
            self.ensure_list(scope)?;
            list::remove_member(scope, &self.iri, &member.term())
        })?;
        tracing::debug!(list = %self.iri, member = %member.iri, "List member removed");
        Ok(())
    }

    pub fn remove_at(&self, index: usize) -> Result<Node> {
        let removed = self.connector.with_write_access(|scope| {
            self.ensure_list(scope)?;
            let term = list::remove_at(scope, &self.iri, index)?;
            scope.classify(&term).ok_or_else(|| OntologyError::InvalidType {
                iri: term.to_string(),
                expected: "node",
            })
        })?;
        tracing::debug!(list = %self.iri, member = %removed.iri, index, "List member removed");
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        let links = self.connector.with_write_access(|scope| {
            self.ensure_list(scope)?;
            Ok(list::clear(scope, &self.iri))
        })?;
        tracing::debug!(list = %self.iri, links, "List cleared");
        Ok(())
    }
}

impl<S: GraphStore> IntoIterator for &OrderedOntologyList<S> {
    type Item = Node;
    type IntoIter = std::vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ── Connector list operations ───────────────────────────────────

impl<S: GraphStore> OntologyConnector<S> {
    fn handle(&self, iri: Iri, label: String) -> OrderedOntologyList<S> {
        OrderedOntologyList::new(self.clone(), iri, label)
    }

    /// Create an empty list. An existing list with the same label is cleared
    /// and reused.
    pub fn add_empty_list(&self, label: &str) -> Result<OrderedOntologyList<S>> {
        self.add_list(label, &[])
    }

    /// Create a list holding `members` in order. An existing list with the
    /// same label is cleared and reused.
    pub fn add_list(&self, label: &str, members: &[Node]) -> Result<OrderedOntologyList<S>> {
        let config = self.config();
        let terms: Vec<Term> = members.iter().map(Node::term).collect();

        let (iri, reused) = self.with_write_access(|scope| {
            let existing = list::find_by_label(scope, label);
            if existing.len() > 1 {
                tracing::warn!(
                    label,
                    lists = existing.len(),
                    "Several lists share a label, reusing the first"
                );
            }
            let (iri, reused) = match existing.into_iter().next() {
                Some(iri) => {
                    list::clear(scope, &iri);
                    (iri, true)
                }
                None => {
                    let iri = list::mint(&config.base_namespace, "list")?;
                    list::create_descriptor(scope, &iri, label, config.label_language.as_deref());
                    (iri, false)
                }
            };
            list::build_chain(scope, &iri, &config.base_namespace, &terms)?;
            Ok((iri, reused))
        })?;

        tracing::info!(list = %iri, label, members = terms.len(), reused, "List created");
        Ok(self.handle(iri, label.to_string()))
    }

    /// The list labelled `label`.
    pub fn get_list(&self, label: &str) -> Result<OrderedOntologyList<S>> {
        let iri = self.with_read_access(|store| {
            let mut found = list::find_by_label(store, label);
            match found.len() {
                0 => Err(OntologyError::not_found("list", label)),
                1 => Ok(found.remove(0)),
                _ => match self.config().ambiguity {
                    AmbiguityPolicy::FirstMatch => {
                        tracing::warn!(label, "Several lists share a label, using the first");
                        Ok(found.remove(0))
                    }
                    AmbiguityPolicy::Error => Err(OntologyError::Ambiguous {
                        name: label.to_string(),
                        candidates: found.iter().map(Iri::to_string).collect(),
                    }),
                },
            }
        })?;
        Ok(self.handle(iri, label.to_string()))
    }

    /// The list whose descriptor is `uri` (full or `prefix:local`).
    pub fn get_list_by_iri(&self, uri: &str) -> Result<OrderedOntologyList<S>> {
        let (iri, label) = self.with_read_access(|store| {
            let iri = Resolver::new(store, self.config()).expand(uri, "list")?;
            if !list::is_list(store, &iri) {
                if !store.mentions(&iri) {
                    return Err(OntologyError::not_found("list", uri));
                }
                return Err(OntologyError::InvalidType {
                    iri: iri.to_string(),
                    expected: "ordered list",
                });
            }
            let label = list::label_of(store, &iri);
            Ok((iri, label))
        })?;
        Ok(self.handle(iri, label))
    }

    /// View `node` as a list. Fails with `InvalidType` when the node is not
    /// a list descriptor or its chain is malformed.
    pub fn as_ordered_list(&self, node: &Node) -> Result<OrderedOntologyList<S>> {
        let label = self.with_read_access(|store| {
            let invalid = || OntologyError::InvalidType {
                iri: node.iri.to_string(),
                expected: "ordered list",
            };
            if !list::is_list(store, &node.iri) {
                return Err(invalid());
            }
            let conflicts = list::list_conflicts(store, &node.iri);
            if !conflicts.is_empty() {
                for conflict in &conflicts {
                    tracing::warn!(list = %node.iri, conflict = %conflict, "Malformed list");
                }
                return Err(invalid());
            }
            Ok(list::label_of(store, &node.iri))
        })?;
        Ok(self.handle(node.iri.clone(), label))
    }

    /// Every list in the store, in lexical IRI order.
    pub fn lists(&self) -> Vec<OrderedOntologyList<S>> {
        let found: Vec<(Iri, String)> = self.with_read_access(|store| {
            list::descriptors(store)
                .into_iter()
                .map(|iri| {
                    let label = list::label_of(store, &iri);
                    (iri, label)
                })
                .collect()
        });
        found
            .into_iter()
            .map(|(iri, label)| self.handle(iri, label))
            .collect()
    }

    /// Delete the list's descriptor and every link.
    pub fn remove_list(&self, list: OrderedOntologyList<S>) -> Result<()> {
        let links = self.with_write_access(|scope| {
            if !list::is_list(scope, &list.iri) {
                return Err(OntologyError::not_found("list", list.iri.as_str()));
            }
            Ok(list::delete(scope, &list.iri))
        })?;
        tracing::info!(list = %list.iri, label = %list.label, links, "List removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ontograph_core::{ConflictKind, ConnectorConfig};

    fn connector_with(names: &[&str]) -> (OntologyConnector, Vec<Node>) {
        let connector: OntologyConnector = OntologyConnector::default();
        let nodes = names
            .iter()
            .map(|n| connector.add_individual(n).unwrap())
            .collect();
        (connector, nodes)
    }

    fn names(list: &OrderedOntologyList) -> Vec<String> {
        list.iter().map(|n| n.iri.local_name().to_string()).collect()
    }

    #[test]
    fn test_handle_reads() {
        let (connector, nodes) = connector_with(&["a", "b", "c"]);
        let list = connector.add_list("letters", &nodes).unwrap();
        assert_eq!(list.label(), "letters");
        assert_eq!(list.len(), 3);
        assert_eq!(list.get(1).unwrap(), nodes[1]);
        assert!(matches!(
            list.get(3),
            Err(OntologyError::IndexOutOfBounds { index: 3, len: 3, .. })
        ));
        assert_eq!(list.index_of(&nodes[2]), Some(2));
        assert!(list.contains(&nodes[0]));
        assert_eq!((&list).into_iter().count(), 3);
    }

    #[test]
    fn test_handle_writes() {
        let (connector, nodes) = connector_with(&["a", "b", "c"]);
        let list = connector.add_empty_list("letters").unwrap();
        assert!(list.is_empty());

        list.append(&nodes[1]).unwrap();
        list.insert(0, &nodes[0]).unwrap();
        list.insert(2, &nodes[2]).unwrap();
        assert_eq!(names(&list), ["a", "b", "c"]);

        assert_eq!(list.remove_at(1).unwrap(), nodes[1]);
        list.remove(&nodes[0]).unwrap();
        assert_eq!(names(&list), ["c"]);

        list.clear().unwrap();
        assert!(list.is_empty());
        assert!(connector.validate().is_empty());
    }

    #[test]
    fn test_lookup_by_label_and_iri() {
        let (connector, nodes) = connector_with(&["a"]);
        let created = connector.add_list("queue", &nodes).unwrap();

        let by_label = connector.get_list("queue").unwrap();
        assert_eq!(by_label.iri(), created.iri());

        let by_iri = connector.get_list_by_iri(created.iri().as_str()).unwrap();
        assert_eq!(by_iri.label(), "queue");

        assert!(connector.get_list("missing").unwrap_err().is_not_found());
        assert!(connector.get_list_by_iri("https://ontograph.dev/ontology#missing").unwrap_err().is_not_found());
        assert!(matches!(
            connector.get_list_by_iri(nodes[0].iri.as_str()),
            Err(OntologyError::InvalidType { .. })
        ));
    }

    fn with_duplicate_labels(ambiguity: AmbiguityPolicy) -> (OntologyConnector, Vec<Iri>) {
        let config = ConnectorConfig {
            ambiguity,
            ..Default::default()
        };
        let connector = OntologyConnector::with_config(MemoryStore::new(), config);
        let iris = connector
            .with_write_access(|scope| {
                let ns = "https://ontograph.dev/ontology#";
                let iris = vec![list::mint(ns, "list")?, list::mint(ns, "list")?];
                for iri in &iris {
                    list::create_descriptor(scope, iri, "twins", None);
                }
                Ok(iris)
            })
            .unwrap();
        let mut sorted = iris;
        sorted.sort();
        (connector, sorted)
    }

    #[test]
    fn test_duplicate_list_labels_are_ambiguous() {
        let (connector, iris) = with_duplicate_labels(AmbiguityPolicy::Error);
        match connector.get_list("twins") {
            Err(OntologyError::Ambiguous { name, candidates }) => {
                assert_eq!(name, "twins");
                let expected: Vec<String> = iris.iter().map(Iri::to_string).collect();
                assert_eq!(candidates, expected);
            }
            other => panic!("expected ambiguity, got {other:?}"),
        }
        assert!(connector
            .validate()
            .iter()
            .any(|c| c.kind == ConflictKind::DuplicateListLabel));
    }

    #[test]
    fn test_duplicate_list_labels_first_match() {
        let (connector, iris) = with_duplicate_labels(AmbiguityPolicy::FirstMatch);
        let list = connector.get_list("twins").unwrap();
        assert_eq!(list.iri(), &iris[0]);
        assert_eq!(list.label(), "twins");
    }

    #[test]
    fn test_as_ordered_list() {
        let (connector, nodes) = connector_with(&["a"]);
        let created = connector.add_list("queue", &nodes).unwrap();

        let viewed = connector.as_ordered_list(&created.node()).unwrap();
        assert_eq!(viewed.len(), 1);
        assert!(matches!(
            connector.as_ordered_list(&nodes[0]),
            Err(OntologyError::InvalidType { .. })
        ));
    }

    #[test]
    fn test_removed_list_rejects_writes() {
        let (connector, nodes) = connector_with(&["a"]);
        let list = connector.add_list("queue", &nodes).unwrap();
        let stale = list.clone();
        connector.remove_list(list).unwrap();

        assert!(stale.is_empty());
        assert!(stale.append(&nodes[0]).unwrap_err().is_not_found());
        assert!(connector.lists().is_empty());
    }
}
