//! ontograph-connector: guarded access to an ontology graph.
//!
//! [`OntologyConnector`] is the single access path to the store. Every
//! mutation runs inside one exclusive, journaled write scope; reads share the
//! store under a writer-preferring lock. On top of that the connector offers
//! class, individual and property operations and [`OrderedOntologyList`], a
//! mutable sequence encoded as a chain of link nodes inside the graph.

pub mod classes;
pub mod connector;
pub mod handle;
pub mod individuals;
pub mod list;
pub mod ontology;
pub mod properties;
pub mod resolver;
pub mod scope;

pub use connector::OntologyConnector;
pub use handle::OrderedOntologyList;
pub use list::ChainIter;
pub use ontology::OntologyStats;
pub use properties::Value;
pub use resolver::Want;
pub use scope::WriteScope;

pub use ontograph_core::{
    AmbiguityPolicy, Conflict, ConflictKind, ConnectorConfig, Iri, Literal, Node, NodeKind,
    OntologyError, PropertyKind, Result, Term, Triple,
};
pub use ontograph_store::{GraphStore, MemoryStore, RdfFormat, SaveReport};
