//! Name → node resolution.
//!
//! A name may be a full IRI, a compact `prefix:local` name, a local name, or
//! an `rdfs:label`. Tiers are tried in that order and the first tier with any
//! match decides the outcome.

use std::collections::BTreeSet;

use ontograph_core::vocab;
use ontograph_core::{
    AmbiguityPolicy, ConnectorConfig, Iri, Node, NodeKind, OntologyError, PropertyKind, Result,
};
use ontograph_store::GraphStore;

use crate::list;

/// Which node kinds a lookup accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Want {
    Class,
    Individual,
    Property(PropertyKind),
    Any,
}

impl Want {
    pub fn accepts(self, kind: NodeKind) -> bool {
        match (self, kind) {
            (Want::Any, NodeKind::Unknown) => false,
            (Want::Any, _) => true,
            (Want::Class, NodeKind::Class) => true,
            (Want::Individual, NodeKind::Individual) => true,
            (Want::Property(wanted), NodeKind::Property(have)) => have.satisfies(wanted),
            _ => false,
        }
    }

    /// Human-readable kind for error messages.
    pub fn name(self) -> &'static str {
        match self {
            Want::Class => "class",
            Want::Individual => "individual",
            Want::Property(PropertyKind::Data) => "data property",
            Want::Property(PropertyKind::Object) => "object property",
            Want::Property(PropertyKind::Annotation) => "annotation property",
            Want::Property(PropertyKind::Plain) => "property",
            Want::Any => "node",
        }
    }
}

/// Resolver over a borrowed store. Pure reads.
pub struct Resolver<'a, G: GraphStore + ?Sized> {
    store: &'a G,
    config: &'a ConnectorConfig,
}

impl<'a, G: GraphStore + ?Sized> Resolver<'a, G> {
    pub fn new(store: &'a G, config: &'a ConnectorConfig) -> Self {
        Self { store, config }
    }

    /// Classification as callers see it. List descriptors and links belong
    /// to the list operations and never resolve as ordinary nodes.
    fn kind_of(&self, iri: &Iri) -> NodeKind {
        if list::is_list_node(self.store, iri) {
            NodeKind::Unknown
        } else {
            self.store.kind_of(iri)
        }
    }

    /// Namespace bound to `prefix`, or `UnknownPrefix`.
    pub fn namespace(&self, prefix: &str) -> Result<String> {
        self.store
            .namespaces()
            .get(prefix)
            .map(str::to_string)
            .ok_or_else(|| OntologyError::UnknownPrefix(prefix.to_string()))
    }

    /// Interpret `name` as an IRI if it is written as one: a compact name
    /// with a bound prefix, or an absolute IRI.
    pub fn as_iri(&self, name: &str) -> Option<Iri> {
        if let Some(expanded) = self.store.namespaces().expand_curie(name) {
            return Iri::new(expanded).ok();
        }
        if looks_absolute(name) {
            return Iri::new(name).ok();
        }
        None
    }

    /// The IRI a new node called `name` gets: `name` itself when written as
    /// an IRI, otherwise `name` appended to the base (or `prefix`) namespace.
    pub fn mint(&self, name: &str, prefix: Option<&str>) -> Result<Iri> {
        if prefix.is_none() {
            if let Some(iri) = self.as_iri(name) {
                return Ok(iri);
            }
        }
        let namespace = match prefix {
            Some(p) => self.namespace(p)?,
            None => self.config.base_namespace.clone(),
        };
        Ok(Iri::new(format!("{namespace}{name}"))?)
    }

    /// Expand a full IRI or `prefix:local` name. Anything else is `NotFound`
    /// for `kind`.
    pub fn expand(&self, uri: &str, kind: &'static str) -> Result<Iri> {
        match self.store.namespaces().expand_curie(uri) {
            Some(expanded) => Ok(Iri::new(expanded)?),
            None if uri.contains(':') => Ok(Iri::new(uri)?),
            None => Err(OntologyError::not_found(kind, uri)),
        }
    }

    /// Resolve a full IRI or `prefix:local` name to a node of the wanted kind.
    pub fn resolve_by_uri(&self, uri: &str, want: Want) -> Result<Node> {
        let iri = self.expand(uri, want.name())?;
        let kind = self.kind_of(&iri);
        if want.accepts(kind) {
            return Ok(Node::new(iri, kind));
        }
        if kind == NodeKind::Unknown && !self.store.mentions(&iri) {
            return Err(OntologyError::not_found(want.name(), uri));
        }
        Err(OntologyError::InvalidType {
            iri: iri.to_string(),
            expected: want.name(),
        })
    }

    /// Resolve `name`, optionally restricted to the namespace of `prefix`.
    pub fn resolve(&self, name: &str, prefix: Option<&str>, want: Want) -> Result<Node> {
        let scope = prefix.map(|p| self.namespace(p)).transpose()?;
        let in_scope = |iri: &Iri| scope.as_deref().map_or(true, |ns| iri.as_str().starts_with(ns));

        // Exact IRI: absolute or compact, or `name` inside the scoped namespace.
        let exact = match &scope {
            Some(ns) => Iri::new(format!("{ns}{name}")).ok().or_else(|| self.as_iri(name)),
            None => self.as_iri(name),
        };
        if let Some(iri) = exact.filter(|iri| in_scope(iri)) {
            let kind = self.kind_of(&iri);
            if want.accepts(kind) {
                return Ok(Node::new(iri, kind));
            }
        }

        let candidates = self.candidates(want);

        let by_local: Vec<&Node> = candidates
            .iter()
            .filter(|n| in_scope(&n.iri) && n.iri.local_name() == name)
            .collect();
        if !by_local.is_empty() {
            return self.pick(name, by_local);
        }

        let labelled: BTreeSet<Iri> = self.store.nodes_with_label(name).into_iter().collect();
        let by_label: Vec<&Node> = candidates
            .iter()
            .filter(|n| in_scope(&n.iri) && labelled.contains(&n.iri))
            .collect();
        if !by_label.is_empty() {
            return self.pick(name, by_label);
        }

        Err(OntologyError::not_found(want.name(), name))
    }

    /// Whether `name` names at least one node. Never fails.
    pub fn exists(&self, name: &str, prefix: Option<&str>, want: Want) -> bool {
        matches!(
            self.resolve(name, prefix, want),
            Ok(_) | Err(OntologyError::Ambiguous { .. })
        )
    }

    /// Every typed node of the wanted kind, in lexical IRI order.
    pub fn candidates(&self, want: Want) -> Vec<Node> {
        let typed: BTreeSet<Iri> = self
            .store
            .triples_matching(None, Some(&vocab::iri(vocab::RDF_TYPE)), None)
            .into_iter()
            .filter_map(|t| t.subject.as_iri().cloned())
            .collect();
        typed
            .into_iter()
            .filter_map(|iri| {
                let kind = self.kind_of(&iri);
                want.accepts(kind).then(|| Node::new(iri, kind))
            })
            .collect()
    }

    fn pick(&self, name: &str, mut matches: Vec<&Node>) -> Result<Node> {
        if matches.len() == 1 {
            return Ok(matches.remove(0).clone());
        }
        let candidates: Vec<String> = matches.iter().map(|n| n.iri.to_string()).collect();
        match self.config.ambiguity {
            AmbiguityPolicy::Error => Err(OntologyError::Ambiguous {
                name: name.to_string(),
                candidates,
            }),
            AmbiguityPolicy::FirstMatch => {
                tracing::warn!(
                    name,
                    candidates = ?candidates,
                    "Ambiguous name, using first match"
                );
                Ok(matches.remove(0).clone())
            }
        }
    }
}

fn looks_absolute(name: &str) -> bool {
    name.contains("://") || name.starts_with("urn:")
}
