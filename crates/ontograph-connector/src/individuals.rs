//! Individual operations.

use ontograph_core::vocab;
use ontograph_core::{Iri, Node, NodeKind, OntologyError, Result, Term};
use ontograph_store::GraphStore;

use crate::classes::{expect_class, get_or_create};
use crate::connector::OntologyConnector;
use crate::list;
use crate::resolver::{Resolver, Want};

fn rdf_type() -> Iri {
    vocab::iri(vocab::RDF_TYPE)
}

/// `node` must be an individual that no list owns as its descriptor or link.
fn expect_individual<G: GraphStore + ?Sized>(store: &G, node: &Node) -> Result<()> {
    if node.is_individual() && !list::is_list_node(store, &node.iri) {
        Ok(())
    } else {
        Err(OntologyError::InvalidType {
            iri: node.iri.to_string(),
            expected: "individual",
        })
    }
}

/// Remove an individual, first unlinking it from every list it belongs to.
fn remove_from_store<G: GraphStore + ?Sized>(store: &mut G, node: &Node) -> Result<usize> {
    expect_individual(store, node)?;
    let term = node.term();
    let unlinked = list::purge_member(store, &term)?;
    let removed = store.remove_node(&term);
    tracing::debug!(individual = %node.iri, triples = removed, unlinked, "Individual removed");
    Ok(removed)
}

impl<S: GraphStore> OntologyConnector<S> {
    pub fn get_individual(&self, name: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve(name, None, Want::Individual)
        })
    }

    pub fn get_individual_by_iri(&self, uri: &str) -> Result<Node> {
        self.with_read_access(|store| {
            Resolver::new(store, self.config()).resolve_by_uri(uri, Want::Individual)
        })
    }

    /// Direct instances of `class`, in lexical IRI order. Nothing is inferred.
    pub fn individuals_of_class(&self, class: &Node) -> Vec<Node> {
        self.with_read_access(|store| {
            let mut found: Vec<Node> = store
                .subjects(&rdf_type(), &class.term())
                .iter()
                .filter_map(|t| store.classify(t))
                .filter(Node::is_individual)
                .collect();
            found.sort_by(|a, b| a.iri.cmp(&b.iri));
            found
        })
    }

    /// Classify any term. Literals and blank nodes are not nodes.
    pub fn classify(&self, term: &Term) -> Option<Node> {
        self.with_read_access(|store| store.classify(term))
    }

    /// Get-or-create an individual.
    pub fn add_individual(&self, name: &str) -> Result<Node> {
        let node = self.with_write_access(|scope| {
            get_or_create(scope, self.config(), name, Want::Individual, |s, iri| {
                s.find_or_create_individual(iri)
            })
        })?;
        tracing::debug!(individual = %node.iri, "Individual added");
        Ok(node)
    }

    /// Get-or-create an individual and type it with `class`.
    pub fn add_individual_to_class(&self, name: &str, class: &Node) -> Result<Node> {
        expect_class(class)?;
        self.with_write_access(|scope| {
            let node = get_or_create(scope, self.config(), name, Want::Individual, |s, iri| {
                s.find_or_create_individual(iri)
            })?;
            scope.add_triple(&node.term(), &rdf_type(), &class.term());
            Ok(node)
        })
    }

    /// Make `class` the only class of `individual`.
    pub fn set_individual_class(&self, individual: &Node, class: &Node) -> Result<()> {
        expect_class(class)?;
        self.with_write_access(|scope| {
            expect_individual(scope, individual)?;
            let subject = individual.term();
            for old in scope.objects(&subject, &rdf_type()) {
                if old.as_iri().map(Iri::as_str) != Some(vocab::OWL_NAMED_INDIVIDUAL) {
                    scope.remove_triple(&subject, &rdf_type(), &old);
                }
            }
            scope.add_triple(&subject, &rdf_type(), &class.term());
            if scope.kind_of(&individual.iri) != NodeKind::Individual {
                return Err(OntologyError::InvalidType {
                    iri: individual.iri.to_string(),
                    expected: "individual",
                });
            }
            Ok(())
        })
    }

    /// Delete an individual and every triple mentioning it.
    pub fn remove_individual(&self, name: &str) -> Result<()> {
        self.with_write_access(|scope| {
            let node = Resolver::new(&*scope, self.config()).resolve(name, None, Want::Individual)?;
            remove_from_store(scope, &node)?;
            Ok(())
        })
    }

    pub fn remove_individual_by_iri(&self, uri: &str) -> Result<()> {
        self.with_write_access(|scope| {
            let node = Resolver::new(&*scope, self.config()).resolve_by_uri(uri, Want::Individual)?;
            remove_from_store(scope, &node)?;
            Ok(())
        })
    }
}
