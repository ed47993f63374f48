//! Ontology-level operations: validation, prefixes, imports, persistence and
//! generic triple navigation.

use std::path::Path;

use serde::Serialize;

use ontograph_core::vocab;
use ontograph_core::{
    Conflict, ConnectorConfig, Iri, Literal, Node, OntologyError, PropertyKind, Result, Term,
};
use ontograph_store::{io, GraphStore, MemoryStore, RdfFormat, SaveReport};

use crate::connector::OntologyConnector;
use crate::list;
use crate::resolver::{Resolver, Want};

/// Counts reported by [`OntologyConnector::stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OntologyStats {
    pub triples: usize,
    pub classes: usize,
    pub individuals: usize,
    pub properties: usize,
    pub lists: usize,
    pub prefixes: usize,
}

/// IRI of the ontology header node: the base namespace without its trailing
/// separator.
fn ontology_iri(config: &ConnectorConfig) -> Result<Iri> {
    let base = config.base_namespace.trim_end_matches(['#', '/']);
    Ok(Iri::new(base)?)
}

impl<S: GraphStore> OntologyConnector<S> {
    // ── Validation ──────────────────────────────────────────────

    /// Every structural conflict in the store. Never repairs anything.
    pub fn validate(&self) -> Vec<Conflict> {
        self.with_read_access(|store| {
            let mut conflicts = store.validate();
            conflicts.extend(list::validate(store));
            conflicts
        })
    }

    /// Like [`validate`](Self::validate), but any conflict is an error.
    pub fn validate_strict(&self) -> Result<()> {
        let conflicts = self.validate();
        if conflicts.is_empty() {
            Ok(())
        } else {
            Err(OntologyError::StructuralConflict(conflicts))
        }
    }

    pub fn stats(&self) -> OntologyStats {
        self.with_read_access(|store| {
            let resolver = Resolver::new(store, self.config());
            OntologyStats {
                triples: store.len(),
                classes: resolver.candidates(Want::Class).len(),
                individuals: resolver.candidates(Want::Individual).len(),
                properties: resolver.candidates(Want::Property(PropertyKind::Plain)).len(),
                lists: list::descriptors(store).len(),
                prefixes: store.namespaces().len(),
            }
        })
    }

    // ── Prefixes ────────────────────────────────────────────────

    /// Bind `prefix` to the namespace `uri`.
    pub fn set_prefix(&self, prefix: &str, uri: &str) -> Result<()> {
        Iri::new(uri)?;
        self.with_write_access(|scope| {
            scope.set_prefix(prefix, uri);
            Ok(())
        })?;
        tracing::debug!(prefix, uri, "Prefix bound");
        Ok(())
    }

    pub fn prefix(&self, prefix: &str) -> Option<String> {
        self.with_read_access(|store| store.namespaces().get(prefix).map(str::to_string))
    }

    /// `prefix` + `suffix` as an IRI.
    pub fn create_uri(&self, prefix: &str, suffix: &str) -> Result<Iri> {
        self.with_read_access(|store| {
            let expanded = store
                .expand_prefix(prefix, suffix)
                .ok_or_else(|| OntologyError::UnknownPrefix(prefix.to_string()))?;
            Ok(Iri::new(expanded)?)
        })
    }

    /// A fresh random IRI in the namespace of `prefix`, or in the base
    /// namespace.
    pub fn generate_random_uri(&self, prefix: Option<&str>) -> Result<Iri> {
        let namespace = match prefix {
            Some(p) => self
                .prefix(p)
                .ok_or_else(|| OntologyError::UnknownPrefix(p.to_string()))?,
            None => self.config().base_namespace.clone(),
        };
        Ok(Iri::new(format!("{namespace}{}", uuid::Uuid::new_v4()))?)
    }

    // ── Imports ─────────────────────────────────────────────────

    /// Record an `owl:imports` of `uri` on the ontology header, creating the
    /// header if the store has none.
    pub fn add_import(&self, uri: &str) -> Result<()> {
        let import = Iri::new(uri)?;
        let header = self.with_write_access(|scope| {
            let header = match scope.instances_of(vocab::OWL_ONTOLOGY).into_iter().min() {
                Some(existing) => existing,
                None => {
                    let iri = ontology_iri(self.config())?;
                    scope.add_triple(
                        &Term::from(&iri),
                        &vocab::iri(vocab::RDF_TYPE),
                        &Term::Iri(vocab::iri(vocab::OWL_ONTOLOGY)),
                    );
                    iri
                }
            };
            scope.add_triple(&Term::from(&header), &vocab::iri(vocab::OWL_IMPORTS), &Term::Iri(import));
            Ok(header)
        })?;
        tracing::info!(ontology = %header, import = uri, "Import added");
        Ok(())
    }

    pub fn has_import(&self, uri: &str) -> bool {
        let Ok(import) = Iri::new(uri) else {
            return false;
        };
        self.with_read_access(|store| {
            !store
                .subjects(&vocab::iri(vocab::OWL_IMPORTS), &Term::Iri(import))
                .is_empty()
        })
    }

    // ── Navigation ──────────────────────────────────────────────

    pub fn first_subject_of(&self, property: &Node, object: &Term) -> Option<Node> {
        self.subjects_of(property, object).into_iter().next()
    }

    /// Nodes with a `property` edge to `object`.
    pub fn subjects_of(&self, property: &Node, object: &Term) -> Vec<Node> {
        self.with_read_access(|store| {
            store
                .subjects(&property.iri, object)
                .iter()
                .filter_map(|t| store.classify(t))
                .collect()
        })
    }

    pub fn first_object_of(&self, subject: &Node, property: &Node) -> Option<Term> {
        self.with_read_access(|store| store.first_object(&subject.term(), &property.iri))
    }

    pub fn objects_of(&self, subject: &Node, property: &Node) -> Vec<Term> {
        self.with_read_access(|store| store.objects(&subject.term(), &property.iri))
    }

    pub fn local_name(&self, node: &Node) -> String {
        node.iri.local_name().to_string()
    }

    /// A label of `node`. Without `language`, the configured label language
    /// is tried first, then any label.
    pub fn label(&self, node: &Node, language: Option<&str>) -> Option<String> {
        self.with_read_access(|store| match language {
            Some(lang) => store.label(&node.iri, Some(lang)),
            None => self
                .config()
                .label_language
                .as_deref()
                .and_then(|lang| store.label(&node.iri, Some(lang)))
                .or_else(|| store.label(&node.iri, None)),
        })
    }

    pub fn add_label(&self, node: &Node, text: &str, language: Option<&str>) -> Result<()> {
        let literal = match language {
            Some(lang) => Literal::lang(text, lang),
            None => Literal::simple(text),
        };
        self.with_write_access(|scope| {
            scope.add_triple(&node.term(), &vocab::iri(vocab::RDFS_LABEL), &literal.into());
            Ok(())
        })
    }

    // ── Persistence ─────────────────────────────────────────────

    /// Save to `path` in the format its extension names (RDF/XML otherwise).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<SaveReport> {
        let path = path.as_ref();
        self.save_as(path, RdfFormat::from_path(path))
    }

    /// Save under the exclusive lock, like a write.
    pub fn save_as(&self, path: impl AsRef<Path>, format: RdfFormat) -> Result<SaveReport> {
        self.with_write_access(|scope| Ok(io::save(&*scope, path, format)?))
    }
}

impl OntologyConnector<MemoryStore> {
    /// Open a connector over the graph in `path`.
    pub fn open(path: impl AsRef<Path>, config: ConnectorConfig) -> Result<Self> {
        let store = MemoryStore::load(path, None)?;
        Ok(Self::with_config(store, config))
    }

    /// Replace the graph with the contents of `path`. The file is parsed
    /// completely before the swap, so a failed load changes nothing.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<()> {
        self.load_as(path, None)
    }

    pub fn load_as(&self, path: impl AsRef<Path>, format: Option<RdfFormat>) -> Result<()> {
        let store = MemoryStore::load(path, format)?;
        let previous = self.replace_store(store);
        tracing::debug!(replaced = previous.len(), "Store replaced");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_strict() {
        let connector: OntologyConnector = OntologyConnector::default();
        connector.add_class("Animal").unwrap();
        connector.validate_strict().unwrap();

        connector
            .with_write_access(|scope| {
                scope.add_triple(
                    &Term::Literal(Literal::simple("bad")),
                    &vocab::iri(vocab::RDFS_LABEL),
                    &Literal::simple("x").into(),
                );
                Ok(())
            })
            .unwrap();
        match connector.validate_strict() {
            Err(OntologyError::StructuralConflict(conflicts)) => assert_eq!(conflicts.len(), 1),
            other => panic!("expected conflicts, got {other:?}"),
        }
    }

    #[test]
    fn test_prefixes_and_uris() {
        let connector: OntologyConnector = OntologyConnector::default();
        connector.set_prefix("zoo", "http://example.org/zoo#").unwrap();
        assert_eq!(connector.prefix("zoo").as_deref(), Some("http://example.org/zoo#"));
        assert_eq!(
            connector.create_uri("zoo", "Dog").unwrap().as_str(),
            "http://example.org/zoo#Dog"
        );
        assert!(matches!(
            connector.create_uri("nope", "Dog"),
            Err(OntologyError::UnknownPrefix(_))
        ));
        assert!(connector.set_prefix("bad", "not an iri").is_err());

        let random = connector.generate_random_uri(Some("zoo")).unwrap();
        assert!(random.as_str().starts_with("http://example.org/zoo#"));
        let other = connector.generate_random_uri(None).unwrap();
        assert!(other.as_str().starts_with("https://ontograph.dev/ontology#"));
        assert_ne!(random, other);
    }

    #[test]
    fn test_imports() {
        let connector: OntologyConnector = OntologyConnector::default();
        assert!(!connector.has_import("http://example.org/base"));
        connector.add_import("http://example.org/base").unwrap();
        connector.add_import("http://example.org/base").unwrap();
        assert!(connector.has_import("http://example.org/base"));
        assert!(!connector.has_import("not an iri"));

        let header = connector.with_read_access(|s| s.instances_of(vocab::OWL_ONTOLOGY));
        assert_eq!(header.len(), 1);
        assert_eq!(header[0].as_str(), "https://ontograph.dev/ontology");
    }

    #[test]
    fn test_navigation_and_labels() {
        let config = ConnectorConfig {
            label_language: Some("en".into()),
            ..Default::default()
        };
        let connector = OntologyConnector::with_config(MemoryStore::new(), config);
        let rex = connector.add_individual("rex").unwrap();
        let alice = connector.add_individual("alice").unwrap();
        let owner = connector.add_object_property("owner").unwrap();
        connector.add_property_value(&rex, &owner, &alice).unwrap();

        assert_eq!(connector.first_subject_of(&owner, &alice.term()), Some(rex.clone()));
        assert_eq!(connector.objects_of(&rex, &owner), vec![alice.term()]);
        assert_eq!(connector.first_object_of(&rex, &owner), Some(alice.term()));
        assert_eq!(connector.local_name(&rex), "rex");

        connector.add_label(&rex, "Rex der Hund", Some("de")).unwrap();
        assert_eq!(connector.label(&rex, None).as_deref(), Some("rex"));
        assert_eq!(connector.label(&rex, Some("de")).as_deref(), Some("Rex der Hund"));
    }

    #[test]
    fn test_stats() {
        let connector: OntologyConnector = OntologyConnector::default();
        let dog = connector.add_class("Dog").unwrap();
        let rex = connector.add_individual_to_class("rex", &dog).unwrap();
        connector.add_data_property("age").unwrap();
        connector.add_list("dogs", &[rex]).unwrap();

        let stats = connector.stats();
        assert_eq!(stats.classes, 1);
        // List descriptors are counted as lists only.
        assert_eq!(stats.individuals, 1);
        assert_eq!(stats.properties, 1);
        assert_eq!(stats.lists, 1);
    }
}
