//! The graph store contract.
//!
//! Implementors supply the triple-level primitives; everything else
//! (typed node creation, classification, labels, prefix expansion) is provided
//! on top of them, so a journaling wrapper only has to intercept the
//! primitives to observe every change.

use ontograph_core::vocab;
use ontograph_core::{Conflict, Iri, Literal, Node, NodeKind, PropertyKind, Term, Triple};

use crate::namespaces::Namespaces;

pub trait GraphStore: Send + Sync {
    // ── Primitives ──────────────────────────────────────────────

    /// Insert a triple. Returns false if it was already present.
    fn insert(&mut self, triple: Triple) -> bool;

    /// Remove a triple. Returns false if it was absent.
    fn remove(&mut self, triple: &Triple) -> bool;

    fn contains(&self, triple: &Triple) -> bool;

    /// Objects of every `(subject, predicate, ?)` triple, in store order.
    fn objects(&self, subject: &Term, predicate: &Iri) -> Vec<Term>;

    /// Subjects of every `(?, predicate, object)` triple, in store order.
    fn subjects(&self, predicate: &Iri, object: &Term) -> Vec<Term>;

    /// All triples matching the pattern; `None` is a wildcard.
    fn triples_matching(
        &self,
        subject: Option<&Term>,
        predicate: Option<&Iri>,
        object: Option<&Term>,
    ) -> Vec<Triple>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn namespaces(&self) -> &Namespaces;

    /// Bind a prefix, returning the previous binding.
    fn set_prefix(&mut self, prefix: &str, uri: &str) -> Option<String>;

    fn remove_prefix(&mut self, prefix: &str) -> Option<String>;

    // ── Triple helpers ──────────────────────────────────────────

    fn add_triple(&mut self, subject: &Term, predicate: &Iri, object: &Term) -> bool {
        self.insert(Triple::new(subject.clone(), predicate.clone(), object.clone()))
    }

    fn remove_triple(&mut self, subject: &Term, predicate: &Iri, object: &Term) -> bool {
        self.remove(&Triple::new(
            subject.clone(),
            predicate.clone(),
            object.clone(),
        ))
    }

    /// Remove every `(subject, predicate, ?)` triple. Returns the count removed.
    fn remove_all_with(&mut self, subject: &Term, predicate: &Iri) -> usize {
        let doomed = self.triples_matching(Some(subject), Some(predicate), None);
        doomed.iter().filter(|t| self.remove(t)).count()
    }

    /// Remove every triple mentioning `node` as subject or object.
    fn remove_node(&mut self, node: &Term) -> usize {
        let mut doomed = self.triples_matching(Some(node), None, None);
        doomed.extend(self.triples_matching(None, None, Some(node)));
        doomed.iter().filter(|t| self.remove(t)).count()
    }

    fn first_object(&self, subject: &Term, predicate: &Iri) -> Option<Term> {
        self.objects(subject, predicate).into_iter().next()
    }

    fn first_subject(&self, predicate: &Iri, object: &Term) -> Option<Term> {
        self.subjects(predicate, object).into_iter().next()
    }

    fn expand_prefix(&self, prefix: &str, local: &str) -> Option<String> {
        self.namespaces().expand(prefix, local)
    }

    // ── Typing ──────────────────────────────────────────────────

    /// IRIs of every `rdf:type` of `iri`.
    fn types_of(&self, iri: &Iri) -> Vec<Iri> {
        self.objects(&Term::from(iri), &vocab::iri(vocab::RDF_TYPE))
            .into_iter()
            .filter_map(|t| t.as_iri().cloned())
            .collect()
    }

    fn has_type(&self, iri: &Iri, type_iri: &str) -> bool {
        self.contains(&Triple::new(
            iri.clone(),
            vocab::iri(vocab::RDF_TYPE),
            Iri::new_unchecked(type_iri),
        ))
    }

    /// Classify a resource from its `rdf:type` edges. Class declarations win
    /// over property declarations, which win over instance typing.
    fn kind_of(&self, iri: &Iri) -> NodeKind {
        let types = self.types_of(iri);
        if types
            .iter()
            .any(|t| matches!(t.as_str(), vocab::OWL_CLASS | vocab::RDFS_CLASS))
        {
            return NodeKind::Class;
        }

        let mut property = None;
        for t in &types {
            match PropertyKind::from_type_iri(t.as_str()) {
                Some(PropertyKind::Plain) => property = property.or(Some(PropertyKind::Plain)),
                Some(kind) => return NodeKind::Property(kind),
                None => {}
            }
        }
        if let Some(kind) = property {
            return NodeKind::Property(kind);
        }

        if types.is_empty() {
            NodeKind::Unknown
        } else {
            NodeKind::Individual
        }
    }

    /// Classify any term. Blank nodes and literals are not nodes.
    fn classify(&self, term: &Term) -> Option<Node> {
        let iri = term.as_iri()?;
        Some(Node::new(iri.clone(), self.kind_of(iri)))
    }

    /// Whether `iri` occurs anywhere in the store.
    fn mentions(&self, iri: &Iri) -> bool {
        let term = Term::from(iri);
        !self.triples_matching(Some(&term), None, None).is_empty()
            || !self.triples_matching(None, None, Some(&term)).is_empty()
    }

    /// Every IRI typed with `type_iri`.
    fn instances_of(&self, type_iri: &str) -> Vec<Iri> {
        self.subjects(
            &vocab::iri(vocab::RDF_TYPE),
            &Term::Iri(Iri::new_unchecked(type_iri)),
        )
        .into_iter()
        .filter_map(|t| t.as_iri().cloned())
        .collect()
    }

    fn find_or_create_class(&mut self, iri: &Iri) -> Node {
        if self.kind_of(iri) != NodeKind::Class {
            self.add_triple(
                &Term::from(iri),
                &vocab::iri(vocab::RDF_TYPE),
                &Term::Iri(vocab::iri(vocab::OWL_CLASS)),
            );
            tracing::debug!(class = %iri, "Class created");
        }
        Node::new(iri.clone(), NodeKind::Class)
    }

    fn find_or_create_individual(&mut self, iri: &Iri) -> Node {
        if !self.has_type(iri, vocab::OWL_NAMED_INDIVIDUAL) {
            self.add_triple(
                &Term::from(iri),
                &vocab::iri(vocab::RDF_TYPE),
                &Term::Iri(vocab::iri(vocab::OWL_NAMED_INDIVIDUAL)),
            );
            tracing::debug!(individual = %iri, "Individual created");
        }
        Node::new(iri.clone(), NodeKind::Individual)
    }

    /// Declare `iri` as a property of `kind` unless it already satisfies it.
    fn find_or_create_property(&mut self, iri: &Iri, kind: PropertyKind) -> Node {
        if let NodeKind::Property(existing) = self.kind_of(iri) {
            if existing.satisfies(kind) {
                return Node::new(iri.clone(), NodeKind::Property(existing));
            }
        }
        self.add_triple(
            &Term::from(iri),
            &vocab::iri(vocab::RDF_TYPE),
            &Term::Iri(Iri::new_unchecked(kind.type_iri())),
        );
        tracing::debug!(property = %iri, kind = ?kind, "Property created");
        Node::new(iri.clone(), self.kind_of(iri))
    }

    // ── Labels ──────────────────────────────────────────────────

    fn labels(&self, iri: &Iri) -> Vec<Literal> {
        self.objects(&Term::from(iri), &vocab::iri(vocab::RDFS_LABEL))
            .into_iter()
            .filter_map(|t| match t {
                Term::Literal(lit) => Some(lit),
                _ => None,
            })
            .collect()
    }

    /// A label of `iri`. With `language`, only labels in that language
    /// qualify; without, an untagged label is preferred over tagged ones.
    fn label(&self, iri: &Iri, language: Option<&str>) -> Option<String> {
        let labels = self.labels(iri);
        let chosen = match language {
            Some(lang) => labels
                .iter()
                .find(|l| l.language().is_some_and(|l| l.eq_ignore_ascii_case(lang))),
            None => labels
                .iter()
                .find(|l| l.language().is_none())
                .or_else(|| labels.first()),
        };
        chosen.map(|l| l.value().to_string())
    }

    /// Every IRI carrying an `rdfs:label` whose text equals `label`, in any
    /// language.
    fn nodes_with_label(&self, label: &str) -> Vec<Iri> {
        let mut found: Vec<Iri> = self
            .triples_matching(None, Some(&vocab::iri(vocab::RDFS_LABEL)), None)
            .into_iter()
            .filter(|t| t.object.as_literal().is_some_and(|l| l.value() == label))
            .filter_map(|t| t.subject.as_iri().cloned())
            .collect();
        found.sort();
        found.dedup();
        found
    }

    // ── Validation ──────────────────────────────────────────────

    /// Store-level structural conflicts. Never mutates.
    fn validate(&self) -> Vec<Conflict> {
        crate::validate::store_conflicts(self)
    }
}
