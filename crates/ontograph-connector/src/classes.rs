//! Class operations.
//!
//! Sub-class queries look at direct `rdfs:subClassOf` edges only; there is no
//! inference.

use ontograph_core::vocab;
use ontograph_core::{
    ConnectorConfig, Iri, IriError, Literal, Node, NodeKind, OntologyError, Result, Term, Triple,
};
use ontograph_store::GraphStore;

use crate::connector::OntologyConnector;
use crate::list;
use crate::resolver::{Resolver, Want};

fn sub_class_of() -> Iri {
    vocab::iri(vocab::RDFS_SUB_CLASS_OF)
}

pub(crate) fn expect_class(node: &Node) -> Result<()> {
    if node.is_class() {
        Ok(())
    } else {
        Err(OntologyError::InvalidType {
            iri: node.iri.to_string(),
            expected: "class",
        })
    }
}

/// Get-or-create a node of `want` named `name` inside an open write scope.
///
/// An existing match is returned as is. Otherwise the node is minted from
/// `name`, declared, and labelled with `name` unless `name` was written as an
/// IRI.
pub(crate) fn get_or_create<G: GraphStore + ?Sized>(
    store: &mut G,
    config: &ConnectorConfig,
    name: &str,
    want: Want,
    declare: impl FnOnce(&mut G, &Iri) -> Node,
) -> Result<Node> {
    let resolver = Resolver::new(&*store, config);
    match resolver.resolve(name, None, want) {
        Ok(node) => return Ok(node),
        Err(err) if err.is_not_found() => {}
        Err(err) => return Err(err),
    }
    let written_as_iri = resolver.as_iri(name).is_some();
    let iri = resolver.mint(name, None)?;

    let existing = store.kind_of(&iri);
    let taken = existing != NodeKind::Unknown && !want.accepts(existing);
    if taken || list::is_list_node(store, &iri) {
        return Err(OntologyError::InvalidType {
            iri: iri.to_string(),
            expected: want.name(),
        });
    }

    let node = declare(store, &iri);
    if !written_as_iri && store.labels(&iri).is_empty() {
        let label = match &config.label_language {
            Some(lang) => Literal::lang(name, lang),
            None => Literal::simple(name),
        };
        store.add_triple(&Term::from(&iri), &vocab::iri(vocab::RDFS_LABEL), &label.into());
    }
    Ok(node)
}

impl<S: GraphStore> OntologyConnector<S> {
    // ── Lookup ──────────────────────────────────────────────────

    /// Resolve a class by label, local name, compact name or IRI.
    pub fn get_class(&self, name: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve(name, None, Want::Class)
        })
    }

    /// Resolve a class inside the namespace bound to `prefix`.
    pub fn get_class_in(&self, name: &str, prefix: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve(name, Some(prefix), Want::Class)
        })
    }

    pub fn get_class_by_iri(&self, uri: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve_by_uri(uri, Want::Class)
        })
    }

    pub fn contains_class(&self, name: &str) -> bool {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).exists(name, None, Want::Class)
        })
    }

    pub fn contains_class_in(&self, name: &str, prefix: &str) -> bool {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).exists(name, Some(prefix), Want::Class)
        })
    }

    /// Every class, in lexical IRI order.
    pub fn classes(&self) -> Vec<Node> {
        self.with_read_access(|store| Resolver::new(store, self.config()).candidates(Want::Class))
    }

    // ── Creation ────────────────────────────────────────────────

    /// Get-or-create a class. New classes are minted in the base namespace
    /// unless `name` is written as an IRI.
    pub fn add_class(&self, name: &str) -> Result<Node> {
        let node = self.with_write_access(|scope| {
            get_or_create(scope, self.config(), name, Want::Class, |s, iri| {
                s.find_or_create_class(iri)
            })
        })?;
        tracing::debug!(class = %node.iri, "Class added");
        Ok(node)
    }

    pub fn add_class_by_iri(&self, uri: &str) -> Result<Node> {
        self.with_write_access(|scope| {
            let iri = Resolver::new(&*scope, self.config())
                .as_iri(uri)
                .ok_or_else(|| {
                    OntologyError::InvalidIri(IriError::Invalid {
                        value: uri.to_string(),
                    })
                })?;
            let kind = scope.kind_of(&iri);
            if kind != NodeKind::Unknown && kind != NodeKind::Class {
                return Err(OntologyError::InvalidType {
                    iri: iri.to_string(),
                    expected: "class",
                });
            }
            Ok(scope.find_or_create_class(&iri))
        })
    }

    /// Get-or-create `name` as a direct sub-class of `super_class`.
    pub fn add_sub_class(&self, name: &str, super_class: &Node) -> Result<Node> {
        expect_class(super_class)?;
        self.with_write_access(|scope| {
            let node = get_or_create(scope, self.config(), name, Want::Class, |s, iri| {
                s.find_or_create_class(iri)
            })?;
            scope.add_triple(&node.term(), &sub_class_of(), &super_class.term());
            Ok(node)
        })
    }

    // ── Hierarchy ───────────────────────────────────────────────

    pub fn add_super_class(&self, class: &Node, super_class: &Node) -> Result<()> {
        expect_class(class)?;
        expect_class(super_class)?;
        self.with_write_access(|scope| {
            scope.add_triple(&class.term(), &sub_class_of(), &super_class.term());
            Ok(())
        })?;
        tracing::debug!(class = %class.iri, super_class = %super_class.iri, "Super class added");
        Ok(())
    }

    /// Make `super_class` the only direct super class of `class`.
    pub fn add_super_class_exclusive(&self, class: &Node, super_class: &Node) -> Result<()> {
        expect_class(class)?;
        expect_class(super_class)?;
        self.with_write_access(|scope| {
            scope.remove_all_with(&class.term(), &sub_class_of());
            scope.add_triple(&class.term(), &sub_class_of(), &super_class.term());
            Ok(())
        })
    }

    /// Drop every direct super class of `class`. Returns how many were removed.
    pub fn remove_sub_classing(&self, class: &Node) -> Result<usize> {
        expect_class(class)?;
        self.with_write_access(|scope| Ok(scope.remove_all_with(&class.term(), &sub_class_of())))
    }

    /// Whether `class` has a direct `rdfs:subClassOf` edge to `super_class`.
    pub fn class_is_sub_class_of(&self, class: &Node, super_class: &Node) -> bool {
        self.with_read_access(|store| {
            store.contains(&Triple::new(
                class.term(),
                sub_class_of(),
                super_class.term(),
            ))
        })
    }

    pub fn super_classes(&self, class: &Node) -> Vec<Node> {
        self.with_read_access(|store| {
            store
                .objects(&class.term(), &sub_class_of())
                .iter()
                .filter_map(|t| store.classify(t))
                .collect()
        })
    }

    pub fn sub_classes(&self, class: &Node) -> Vec<Node> {
        self.with_read_access(|store| {
            store
                .subjects(&sub_class_of(), &class.term())
                .iter()
                .filter_map(|t| store.classify(t))
                .collect()
        })
    }

    // ── Membership ──────────────────────────────────────────────

    /// Whether `individual` is directly typed with the class at `uri`.
    pub fn has_class(&self, individual: &Node, uri: &str) -> bool {
        self.with_read_access(|store| {
            Resolver::new(store, self.config())
                .as_iri(uri)
                .is_some_and(|class| store.has_type(&individual.iri, class.as_str()))
        })
    }

    /// [`has_class`](Self::has_class) with the class given as prefix and
    /// local name.
    pub fn has_class_in(&self, individual: &Node, prefix: &str, local: &str) -> bool {
        self.with_read_access(|store| {
            store
                .expand_prefix(prefix, local)
                .is_some_and(|class| store.has_type(&individual.iri, &class))
        })
    }
}
